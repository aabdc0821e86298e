use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

mod common;
pub(crate) mod image;
pub(crate) mod text;

pub use common::{
    normalize_rotation, CHAR_WIDTH_FACTOR, DEFAULT_FONT_SIZE, LINE_HEIGHT_FACTOR,
    MIN_ELEMENT_SIZE, MIN_FONT_SIZE, MIN_TEXT_HEIGHT,
};
pub use image::{ImageData, Provenance};
pub use text::{format_hex_color, parse_hex_color, FontStyle, FontWeight, TextAlign, TextData};

use crate::id_generator::{generate_id, ElementId};
use common::{estimate_text_box, sanitize_coord, sanitize_dimension, sanitize_font_size};

/// Discriminant of an element payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Text,
    Image,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
        }
    }
}

/// Variant payload of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Text(TextData),
    Image(ImageData),
}

/// A positioned, rotatable rectangle placed on one product view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees, always within `[0, 360)`
    pub rotation: f32,
    #[serde(rename = "data")]
    pub payload: Payload,
}

impl Element {
    /// Create a text element with default styling and an estimated box
    pub fn text(x: f32, y: f32, text: impl Into<String>) -> Self {
        let data = TextData::new(text);
        let size = estimate_text_box(&data.text, data.font_size);
        Self {
            id: generate_id(),
            x: sanitize_coord(x),
            y: sanitize_coord(y),
            width: size.x,
            height: size.y,
            rotation: 0.0,
            payload: Payload::Text(data),
        }
    }

    /// Create an image element; the given size also becomes the original size
    pub fn image(x: f32, y: f32, src: impl Into<String>, width: f32, height: f32) -> Self {
        let width = sanitize_dimension(width, MIN_ELEMENT_SIZE);
        let height = sanitize_dimension(height, MIN_ELEMENT_SIZE);
        Self {
            id: generate_id(),
            x: sanitize_coord(x),
            y: sanitize_coord(y),
            width,
            height,
            rotation: 0.0,
            payload: Payload::Image(ImageData {
                src: src.into(),
                original_width: width,
                original_height: height,
                provenance: None,
            }),
        }
    }

    /// Attach provenance metadata to an image element; no-op for text
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        if let Payload::Image(data) = &mut self.payload {
            data.provenance = Some(provenance);
        }
        self
    }

    pub fn kind(&self) -> ElementKind {
        match self.payload {
            Payload::Text(_) => ElementKind::Text,
            Payload::Image(_) => ElementKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match &self.payload {
            Payload::Text(data) => Some(data),
            Payload::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match &self.payload {
            Payload::Image(data) => Some(data),
            Payload::Text(_) => None,
        }
    }

    pub fn position(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Unrotated bounding box in canvas space
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position(), self.size())
    }

    pub fn center(&self) -> Pos2 {
        self.rect().center()
    }

    /// Minimum box for this element type
    pub fn min_size(&self) -> Vec2 {
        match self.payload {
            Payload::Text(_) => Vec2::new(MIN_ELEMENT_SIZE, MIN_TEXT_HEIGHT),
            Payload::Image(_) => Vec2::splat(MIN_ELEMENT_SIZE),
        }
    }

    /// Point containment against the unrotated box, edges inclusive
    pub fn contains(&self, pos: Pos2) -> bool {
        pos.x >= self.x
            && pos.x <= self.x + self.width
            && pos.y >= self.y
            && pos.y <= self.y + self.height
    }

    /// Image source, if this is an image element
    pub fn src(&self) -> Option<&str> {
        self.as_image().map(|data| data.src.as_str())
    }

    /// Size the element would return to on "reset size"
    pub fn original_size(&self) -> Option<Vec2> {
        self.as_image()
            .map(|data| Vec2::new(data.original_width, data.original_height))
    }

    /// Current width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Restore an image to its original dimensions, keeping the top-left corner
    pub fn reset_size(&mut self) {
        if let Some(size) = self.original_size() {
            self.width = sanitize_dimension(size.x, MIN_ELEMENT_SIZE);
            self.height = sanitize_dimension(size.y, MIN_ELEMENT_SIZE);
        }
    }

    /// Copy of this element under a fresh id
    pub fn duplicate(&self, offset: Vec2) -> Self {
        let mut copy = self.clone();
        copy.id = generate_id();
        copy.x = self.x + offset.x;
        copy.y = self.y + offset.y;
        copy
    }

    /// Merge a partial update, re-clamping geometry and normalizing rotation
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        let min = self.min_size();
        if let Some(x) = patch.x {
            self.x = sanitize_coord(x);
        }
        if let Some(y) = patch.y {
            self.y = sanitize_coord(y);
        }
        if let Some(width) = patch.width {
            self.width = sanitize_dimension(width, min.x);
        }
        if let Some(height) = patch.height {
            self.height = sanitize_dimension(height, min.y);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = normalize_rotation(rotation);
        }

        match &mut self.payload {
            Payload::Text(data) => {
                if let Some(text) = &patch.text {
                    data.text = text.clone();
                }
                if let Some(size) = patch.font_size {
                    data.font_size = sanitize_font_size(size);
                }
                if let Some(family) = &patch.font_family {
                    data.font_family = family.clone();
                }
                if let Some(weight) = patch.font_weight {
                    data.font_weight = weight;
                }
                if let Some(style) = patch.font_style {
                    data.font_style = style;
                }
                if let Some(color) = &patch.color {
                    data.color = color.clone();
                }
                if let Some(align) = patch.text_align {
                    data.text_align = align;
                }
            }
            Payload::Image(data) => {
                if let Some(src) = &patch.src {
                    data.src = src.clone();
                }
            }
        }
    }
}

/// Partial element fields for property edits and live gestures.
///
/// Fields that do not apply to the element's payload are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub text: Option<String>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub src: Option<String>,
}

impl ElementPatch {
    pub fn position(pos: Pos2) -> Self {
        Self {
            x: Some(pos.x),
            y: Some(pos.y),
            ..Default::default()
        }
    }

    pub fn rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.min.x),
            y: Some(rect.min.y),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Default::default()
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotation: Some(degrees),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_defaults() {
        let element = Element::text(100.0, 100.0, "Hello");
        let data = element.as_text().unwrap();
        assert_eq!(data.font_size, 24.0);
        assert_eq!(data.color, "#000000");
        assert_eq!(data.text_align, TextAlign::Left);
        assert_eq!(element.rotation, 0.0);
        assert!(element.width >= MIN_ELEMENT_SIZE);
        assert!(element.height >= MIN_TEXT_HEIGHT);
        assert_eq!(element.kind(), ElementKind::Text);
    }

    #[test]
    fn image_captures_original_size() {
        let element = Element::image(0.0, 0.0, "art.png", 300.0, 150.0);
        let data = element.as_image().unwrap();
        assert_eq!(data.original_width, 300.0);
        assert_eq!(data.original_height, 150.0);
        assert_eq!(data.aspect_ratio(), 2.0);
        assert_eq!(element.original_size(), Some(Vec2::new(300.0, 150.0)));
    }

    #[test]
    fn reset_size_restores_original() {
        let mut element = Element::image(0.0, 0.0, "art.png", 300.0, 150.0);
        element.apply_patch(&ElementPatch::rect(Rect::from_min_size(
            Pos2::new(5.0, 5.0),
            Vec2::new(60.0, 30.0),
        )));
        assert_eq!(element.aspect_ratio(), 2.0);
        element.reset_size();
        assert_eq!(element.size(), Vec2::new(300.0, 150.0));
        assert_eq!(element.position(), Pos2::new(5.0, 5.0));
    }

    #[test]
    fn image_rejects_non_positive_dimensions() {
        let element = Element::image(f32::NAN, 5.0, "art.png", 0.0, -10.0);
        assert_eq!(element.x, 0.0);
        assert_eq!(element.width, MIN_ELEMENT_SIZE);
        assert_eq!(element.height, MIN_ELEMENT_SIZE);
    }

    #[test]
    fn ids_are_unique() {
        let a = Element::text(0.0, 0.0, "a");
        let b = Element::text(0.0, 0.0, "a");
        assert_ne!(a.id, b.id);
        assert_ne!(a.duplicate(Vec2::ZERO).id, a.id);
    }

    #[test]
    fn patch_clamps_and_normalizes() {
        let mut element = Element::image(10.0, 10.0, "art.png", 100.0, 100.0);
        element.apply_patch(&ElementPatch {
            width: Some(2.0),
            rotation: Some(-30.0),
            text: Some("ignored".into()),
            ..Default::default()
        });
        assert_eq!(element.width, MIN_ELEMENT_SIZE);
        assert_eq!(element.rotation, 330.0);
        assert!(element.as_text().is_none());
    }

    #[test]
    fn patch_updates_text_fields() {
        let mut element = Element::text(0.0, 0.0, "Hi");
        element.apply_patch(
            &ElementPatch::text("Hi\nthere").with_font_size(3.0),
        );
        let data = element.as_text().unwrap();
        assert_eq!(data.text, "Hi\nthere");
        assert_eq!(data.font_size, MIN_FONT_SIZE);
    }

    #[test]
    fn containment_uses_unrotated_box() {
        let mut element = Element::image(100.0, 100.0, "a.png", 100.0, 20.0);
        element.rotation = 90.0;
        assert!(element.contains(Pos2::new(190.0, 110.0)));
        assert!(!element.contains(Pos2::new(150.0, 60.0)));
        assert!(element.contains(Pos2::new(100.0, 100.0)));
    }

    #[test]
    fn serializes_with_type_tag() {
        let element = Element::text(1.0, 2.0, "Hello");
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["data"]["type"], "text");
        assert_eq!(json["data"]["fontSize"], 24.0);
        assert_eq!(json["data"]["textAlign"], "left");
    }
}

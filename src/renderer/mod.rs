//! Scene rasterization.
//!
//! A view is first projected into a [`DisplayList`], then painted onto a
//! tiny-skia surface. The interactive canvas and static export share both
//! steps, so an exported PNG matches what the editor shows.

mod raster;
mod text;

pub use raster::rasterize;
pub use text::{measure_line, FontBook};

use egui::Rect;
use image::RgbaImage;
use std::io::Cursor;
use tiny_skia::Pixmap;

use crate::config::{EditorConfig, ProductViews};
use crate::element::{FontStyle, FontWeight, Payload, TextAlign};
use crate::error::RenderError;
use crate::id_generator::ElementId;
use crate::image_cache::ImageCache;
use crate::state::{EditorStore, View};

/// One painted text element
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub id: ElementId,
    pub rect: Rect,
    pub rotation: f32,
    pub lines: Vec<String>,
    pub font_size: f32,
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    /// Unmultiplied RGBA
    pub color: [u8; 4],
    pub align: TextAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Product image stretched over the whole surface
    Background { src: String },
    Image {
        id: ElementId,
        src: String,
        rect: Rect,
        rotation: f32,
    },
    Text(TextRun),
}

/// Everything needed to paint one view, in paint order
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    /// Image sources the list paints, background first
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Background { src } | DrawCommand::Image { src, .. } => Some(src.as_str()),
            DrawCommand::Text(_) => None,
        })
    }
}

fn surface_dimension(value: f32) -> u32 {
    if value.is_finite() {
        value.round().max(1.0) as u32
    } else {
        1
    }
}

/// Project a view of the store into draw commands
pub fn build_display_list(store: &EditorStore, view: View, product: &ProductViews) -> DisplayList {
    let canvas = store.canvas_size();
    let mut commands = Vec::new();

    if let Some(src) = product.background_for(view) {
        commands.push(DrawCommand::Background { src: src.to_owned() });
    }

    for element in store.scene().view(view) {
        let rect = element.rect();
        let command = match &element.payload {
            Payload::Image(data) => DrawCommand::Image {
                id: element.id,
                src: data.src.clone(),
                rect,
                rotation: element.rotation,
            },
            Payload::Text(data) => DrawCommand::Text(TextRun {
                id: element.id,
                rect,
                rotation: element.rotation,
                lines: data.lines().map(str::to_owned).collect(),
                font_size: data.font_size,
                family: data.font_family.clone(),
                weight: data.font_weight,
                style: data.font_style,
                color: data.rgba(),
                align: data.text_align,
            }),
        };
        commands.push(command);
    }

    DisplayList {
        width: surface_dimension(canvas.x),
        height: surface_dimension(canvas.y),
        commands,
    }
}

/// Paints views of an [`EditorStore`] with the product backgrounds and fonts it was built with
#[derive(Debug, Default)]
pub struct Renderer {
    product: ProductViews,
    fonts: FontBook,
}

impl Renderer {
    pub fn new(product: ProductViews, fonts: FontBook) -> Self {
        Self { product, fonts }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.product.clone(), FontBook::from_config(&config.fonts))
    }

    pub fn product(&self) -> &ProductViews {
        &self.product
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn display_list(&self, store: &EditorStore, view: View) -> DisplayList {
        build_display_list(store, view, &self.product)
    }

    /// Start loading every image the view paints
    pub fn request_images(&self, store: &EditorStore, view: View, cache: &mut ImageCache) {
        for src in self.display_list(store, view).sources() {
            cache.ensure(src);
        }
    }

    /// Raster of one view. Images that have not loaded are left out.
    pub fn render(&self, store: &EditorStore, view: View, cache: &ImageCache) -> Result<Pixmap, RenderError> {
        rasterize(&self.display_list(store, view), cache, &self.fonts)
    }

    /// Same raster as [`Renderer::render`], as an unmultiplied image for export
    pub fn render_view_to_image(
        &self,
        store: &EditorStore,
        view: View,
        cache: &ImageCache,
    ) -> Result<RgbaImage, RenderError> {
        Ok(to_rgba_image(&self.render(store, view, cache)?))
    }
}

pub fn to_rgba_image(surface: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(surface.width(), surface.height());
    for (dst, px) in out.pixels_mut().zip(surface.pixels()) {
        let c = px.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementPatch;

    #[test]
    fn display_list_follows_paint_order() {
        let mut store = EditorStore::default();
        let text = store.add_text(10.0, 10.0, "one\ntwo");
        let image = store.add_image(50.0, 50.0, "logo.png", 80.0, 40.0);
        store.update_element(image, &ElementPatch::rotation(45.0));

        let product = ProductViews {
            fallback: Some("tee.png".into()),
            ..ProductViews::default()
        };
        let list = build_display_list(&store, View::Front, &product);
        assert_eq!((list.width, list.height), (400, 400));
        assert_eq!(list.commands.len(), 3);
        assert_eq!(list.commands[0], DrawCommand::Background { src: "tee.png".into() });
        match &list.commands[1] {
            DrawCommand::Text(run) => {
                assert_eq!(run.id, text);
                assert_eq!(run.lines, vec!["one".to_owned(), "two".to_owned()]);
                assert_eq!(run.color, [0, 0, 0, 255]);
            }
            other => panic!("expected text, got {:?}", other),
        }
        match &list.commands[2] {
            DrawCommand::Image { id, rotation, .. } => {
                assert_eq!(*id, image);
                assert_eq!(*rotation, 45.0);
            }
            other => panic!("expected image, got {:?}", other),
        }
        assert_eq!(list.sources().collect::<Vec<_>>(), vec!["tee.png", "logo.png"]);
    }

    #[test]
    fn other_views_are_not_painted() {
        let mut store = EditorStore::default();
        store.add_text(10.0, 10.0, "front");
        let list = build_display_list(&store, View::Back, &ProductViews::default());
        assert!(list.commands.is_empty());
    }

    #[test]
    fn png_encoding_produces_a_png() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}

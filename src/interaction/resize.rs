use egui::{Pos2, Rect, Vec2};

use crate::element::{normalize_rotation, Element, Payload, MIN_FONT_SIZE};
use crate::geometry::Handle;

/// Geometry captured when a resize gesture starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeStart {
    pub rect: Rect,
    pub min: Vec2,
    /// Text elements scale their font with height
    pub font_size: Option<f32>,
    /// Image elements keep `originalWidth / originalHeight`
    pub aspect: Option<f32>,
}

impl ResizeStart {
    pub fn of(element: &Element) -> Self {
        let (font_size, aspect) = match &element.payload {
            Payload::Text(data) => (Some(data.font_size), None),
            Payload::Image(data) => {
                let r = data.aspect_ratio();
                (None, (r.is_finite() && r > 0.0).then_some(r))
            }
        };
        Self {
            rect: element.rect(),
            min: element.min_size(),
            font_size,
            aspect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    pub rect: Rect,
    pub font_size: Option<f32>,
}

/// New geometry for dragging `handle` by `delta` from the start of the gesture.
///
/// Edges opposite the handle stay fixed.
pub fn resize(start: &ResizeStart, handle: Handle, delta: Vec2) -> ResizeOutcome {
    let r0 = start.rect;
    let (w0, h0) = (r0.width(), r0.height());

    let mut w = w0;
    let mut h = h0;
    if handle.moves_right() {
        w = w0 + delta.x;
    } else if handle.moves_left() {
        w = w0 - delta.x;
    }
    if handle.moves_bottom() {
        h = h0 + delta.y;
    } else if handle.moves_top() {
        h = h0 - delta.y;
    }
    w = w.max(start.min.x);
    h = h.max(start.min.y);

    if let Some(ratio) = start.aspect {
        let s = if handle.is_corner() {
            (w / w0).min(h / h0)
        } else if handle.moves_left() || handle.moves_right() {
            w / w0
        } else {
            h / h0
        };
        w = w0 * s;
        h = w / ratio;
        // scale both up together until neither is under the minimum
        let grow = (start.min.x / w).max(start.min.y / h);
        if grow > 1.0 {
            w *= grow;
            h *= grow;
        }
    }

    let x = if handle.moves_left() { r0.max.x - w } else { r0.min.x };
    let y = if handle.moves_top() { r0.max.y - h } else { r0.min.y };

    let font_size = start
        .font_size
        .map(|base| (base * h / h0).round().max(MIN_FONT_SIZE));

    ResizeOutcome {
        rect: Rect::from_min_size(Pos2::new(x, y), Vec2::new(w, h)),
        font_size,
    }
}

/// Absolute rotation that turns the element's top toward the pointer
pub fn rotation_toward(center: Pos2, pointer: Pos2) -> f32 {
    let d = pointer - center;
    normalize_rotation(d.y.atan2(d.x).to_degrees() + 90.0)
}

/// Clamp a top-left position so a box of `size` stays inside `canvas`
pub fn clamp_to_canvas(pos: Pos2, size: Vec2, canvas: Vec2) -> Pos2 {
    Pos2::new(
        pos.x.clamp(0.0, (canvas.x - size.x).max(0.0)),
        pos.y.clamp(0.0, (canvas.y - size.y).max(0.0)),
    )
}

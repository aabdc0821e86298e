use egui::{CursorIcon, Pos2, Rect, Vec2};

use crate::config::EditorConfig;
use crate::element::Element;
use crate::id_generator::ElementId;

/// One of the eight resize hotspots on a selected element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Right,
    Bottom,
    Left,
}

impl Handle {
    /// Detection order: corners win over edges where hotspots overlap
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
        Handle::Top,
        Handle::Right,
        Handle::Bottom,
        Handle::Left,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Handle::TopLeft => "top_left",
            Handle::TopRight => "top_right",
            Handle::BottomLeft => "bottom_left",
            Handle::BottomRight => "bottom_right",
            Handle::Top => "top",
            Handle::Right => "right",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Handle::TopLeft | Handle::BottomRight => CursorIcon::ResizeNwSe,
            Handle::TopRight | Handle::BottomLeft => CursorIcon::ResizeNeSw,
            Handle::Top | Handle::Bottom => CursorIcon::ResizeVertical,
            Handle::Left | Handle::Right => CursorIcon::ResizeHorizontal,
        }
    }

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            Handle::TopLeft | Handle::TopRight | Handle::BottomLeft | Handle::BottomRight
        )
    }

    pub fn moves_left(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft | Handle::Left)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, Handle::TopRight | Handle::BottomRight | Handle::Right)
    }

    pub fn moves_top(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight | Handle::Top)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomRight | Handle::Bottom)
    }

    /// Position of this handle on `rect`, as a fraction of its size
    pub fn anchor(&self) -> Vec2 {
        match self {
            Handle::TopLeft => Vec2::new(0.0, 0.0),
            Handle::Top => Vec2::new(0.5, 0.0),
            Handle::TopRight => Vec2::new(1.0, 0.0),
            Handle::Right => Vec2::new(1.0, 0.5),
            Handle::BottomRight => Vec2::new(1.0, 1.0),
            Handle::Bottom => Vec2::new(0.5, 1.0),
            Handle::BottomLeft => Vec2::new(0.0, 1.0),
            Handle::Left => Vec2::new(0.0, 0.5),
        }
    }
}

/// Sizes of the selection hotspots in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    pub radius: f32,
    pub offset: f32,
    pub rotate_offset: f32,
}

impl Default for HandleMetrics {
    fn default() -> Self {
        Self {
            radius: 12.0,
            offset: 6.0,
            rotate_offset: 30.0,
        }
    }
}

impl From<&EditorConfig> for HandleMetrics {
    fn from(config: &EditorConfig) -> Self {
        Self {
            radius: config.handle_radius,
            offset: config.handle_offset,
            rotate_offset: config.rotate_handle_offset,
        }
    }
}

/// Center of a resize hotspot: the handle's point on the box, shifted up-left by `offset`
pub fn handle_hotspot(rect: Rect, handle: Handle, metrics: &HandleMetrics) -> Pos2 {
    let a = handle.anchor();
    Pos2::new(
        rect.min.x + rect.width() * a.x - metrics.offset,
        rect.min.y + rect.height() * a.y - metrics.offset,
    )
}

/// The first resize handle of `element` within the hit radius of `pos`
pub fn hit_resize_handle(element: &Element, pos: Pos2, metrics: &HandleMetrics) -> Option<Handle> {
    let rect = element.rect();
    Handle::ALL
        .into_iter()
        .find(|handle| pos.distance(handle_hotspot(rect, *handle, metrics)) <= metrics.radius)
}

/// Center of the rotate handle, below the unrotated box
pub fn rotate_handle_pos(element: &Element, metrics: &HandleMetrics) -> Pos2 {
    Pos2::new(
        element.x + element.width / 2.0,
        element.y + element.height + metrics.rotate_offset,
    )
}

pub fn hit_rotate_handle(element: &Element, pos: Pos2, metrics: &HandleMetrics) -> bool {
    pos.distance(rotate_handle_pos(element, metrics)) <= metrics.radius
}

/// Topmost element whose unrotated box contains `pos`
pub fn hit_test(elements: &[Element], pos: Pos2) -> Option<ElementId> {
    elements.iter().rev().find(|e| e.contains(pos)).map(|e| e.id)
}

/// Rotate `point` by `degrees` clockwise (screen coordinates) around `center`
pub fn rotate_point(point: Pos2, center: Pos2, degrees: f32) -> Pos2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Corners of the element as painted, clockwise from top-left
pub fn rotated_corners(element: &Element) -> [Pos2; 4] {
    let rect = element.rect();
    let center = rect.center();
    [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ]
    .map(|p| rotate_point(p, center, element.rotation))
}

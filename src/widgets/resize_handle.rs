use egui::{Color32, Id, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};

use crate::geometry::Handle;
use crate::id_generator::ElementId;

pub const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 120, 255);
pub const HANDLE_HOVER_COLOR: Color32 = Color32::from_rgb(135, 206, 250);

/// A draggable resize handle for the selected element
pub struct ResizeHandle {
    element_id: ElementId,
    handle: Handle,
    position: Pos2,
    size: f32,
}

impl ResizeHandle {
    pub fn new(element_id: ElementId, handle: Handle, position: Pos2, size: f32) -> Self {
        Self {
            element_id,
            handle,
            position,
            size,
        }
    }

    /// Show the handle at its screen position and return the response
    pub fn show(&self, ui: &mut Ui) -> Response {
        let id = Id::new(("resize_handle", self.element_id, self.handle.as_str()));
        let rect = Rect::from_center_size(self.position, Vec2::splat(self.size));

        let response = ui
            .interact(rect, id, Sense::drag())
            .on_hover_cursor(self.handle.cursor_icon());

        let fill = if response.hovered() || response.dragged() {
            HANDLE_HOVER_COLOR
        } else {
            HANDLE_COLOR
        };
        ui.painter().rect_filled(rect, 2.0, fill);
        ui.painter().rect_stroke(rect, 2.0, Stroke::new(1.0, Color32::WHITE));

        response
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn element_id(&self) -> ElementId {
        self.element_id
    }
}

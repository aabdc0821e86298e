use egui::{Align2, Color32, CursorIcon, FontId, Id, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};

use super::resize_handle::{ResizeHandle, HANDLE_COLOR, HANDLE_HOVER_COLOR};
use crate::geometry::Handle;
use crate::interaction::Direction;
use crate::overlay::OverlayLayout;

const HANDLE_SIZE: f32 = 10.0;
const ROTATE_RADIUS: f32 = 6.0;
const BUTTON_SIZE: f32 = 20.0;
const DELETE_COLOR: Color32 = Color32::from_rgb(220, 60, 60);

/// What the user did with the overlay this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayAction {
    None,
    /// A resize handle started dragging at this screen position
    BeginResize(Handle, Pos2),
    BeginRotate,
    Nudge(Direction),
    Delete,
}

/// Result of drawing the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOutput {
    pub action: OverlayAction,
    /// The pointer is over an overlay control; the canvas must not treat presses as its own
    pub pointer_captured: bool,
}

/// Draw the selection overlay, mapping canvas positions with `to_screen`
pub fn show_overlay(
    ui: &mut Ui,
    layout: &OverlayLayout,
    to_screen: impl Fn(Pos2) -> Pos2,
) -> OverlayOutput {
    let painter = ui.painter().clone();
    let mut action = OverlayAction::None;
    let mut captured = false;

    let quad: Vec<Pos2> = layout.quad.iter().map(|p| to_screen(*p)).collect();
    painter.add(Shape::closed_line(quad, Stroke::new(1.0, HANDLE_COLOR)));

    // rotate handle on a stem above the element
    let stem = to_screen(layout.rotate_stem);
    let knob = to_screen(layout.rotate_handle);
    painter.line_segment([stem, knob], Stroke::new(1.0, HANDLE_COLOR));
    let rotate = ui
        .interact(
            Rect::from_center_size(knob, Vec2::splat(ROTATE_RADIUS * 2.5)),
            Id::new(("rotate_handle", layout.element)),
            Sense::drag(),
        )
        .on_hover_cursor(CursorIcon::Grab);
    let knob_color = if rotate.hovered() || rotate.dragged() {
        HANDLE_HOVER_COLOR
    } else {
        HANDLE_COLOR
    };
    painter.circle_filled(knob, ROTATE_RADIUS, knob_color);
    painter.circle_stroke(knob, ROTATE_RADIUS, Stroke::new(1.0, Color32::WHITE));
    captured |= rotate.contains_pointer();
    if rotate.drag_started() {
        action = OverlayAction::BeginRotate;
    }

    for (handle, pos) in layout.handles {
        let widget = ResizeHandle::new(layout.element, handle, to_screen(pos), HANDLE_SIZE);
        let response = widget.show(ui);
        captured |= response.contains_pointer();
        if response.drag_started() {
            let origin = ui
                .ctx()
                .input(|i| i.pointer.press_origin())
                .unwrap_or(response.rect.center());
            action = OverlayAction::BeginResize(widget.handle(), origin);
        }
    }

    for (direction, pos) in layout.nudge {
        let glyph = match direction {
            Direction::Up => "⬆",
            Direction::Down => "⬇",
            Direction::Left => "⬅",
            Direction::Right => "➡",
        };
        let id = ("nudge", layout.element, direction as u8);
        if overlay_button(ui, id, to_screen(pos), glyph, HANDLE_COLOR, &mut captured) {
            action = OverlayAction::Nudge(direction);
        }
    }

    let delete = to_screen(layout.delete);
    if overlay_button(ui, ("delete", layout.element), delete, "✖", DELETE_COLOR, &mut captured) {
        action = OverlayAction::Delete;
    }

    OverlayOutput {
        action,
        pointer_captured: captured,
    }
}

fn overlay_button(
    ui: &mut Ui,
    id: impl std::hash::Hash,
    center: Pos2,
    label: &str,
    color: Color32,
    captured: &mut bool,
) -> bool {
    let rect = Rect::from_center_size(center, Vec2::splat(BUTTON_SIZE));
    let response = ui
        .interact(rect, Id::new(id), Sense::click())
        .on_hover_cursor(CursorIcon::PointingHand);
    let fill = if response.hovered() { color } else { color.gamma_multiply(0.8) };
    ui.painter().circle_filled(center, BUTTON_SIZE / 2.0, fill);
    ui.painter().text(
        center,
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(BUTTON_SIZE * 0.6),
        Color32::WHITE,
    );
    *captured |= response.contains_pointer();
    response.clicked()
}

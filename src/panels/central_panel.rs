use egui::{pos2, Color32, Rect, Sense, Stroke};

use crate::app::MockupEditorApp;
use crate::input::InputEvent;
use crate::interaction::{Gesture, InteractionResponse};
use crate::overlay::OverlayLayout;
use crate::widgets::{show_overlay, OverlayAction};

/// Largest on-screen magnification of the canvas
const MAX_CANVAS_SCALE: f32 = 2.0;

pub fn central_panel(app: &mut MockupEditorApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let canvas = app.store.canvas_size();
        let available = ui.available_rect_before_wrap();
        let scale = (available.width() / canvas.x)
            .min(available.height() / canvas.y)
            .min(MAX_CANVAS_SCALE)
            .max(f32::EPSILON);
        let canvas_rect = Rect::from_center_size(available.center(), canvas * scale);
        ui.allocate_rect(canvas_rect, Sense::hover());
        app.input.set_canvas_transform(canvas_rect, scale);

        let painter = ui.painter().clone();
        painter.rect_filled(canvas_rect, 0.0, Color32::WHITE);
        match app.canvas_texture(ctx) {
            Ok(texture) => {
                painter.image(
                    texture,
                    canvas_rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            Err(e) => log::error!("failed to paint canvas: {}", e),
        }
        painter.rect_stroke(canvas_rect, 0.0, Stroke::new(1.0, Color32::GRAY));

        // the overlay goes first so its controls claim presses before the canvas sees them
        let overlay = OverlayLayout::for_selection(&app.store, app.controller.metrics()).map(|layout| {
            let input = &app.input;
            show_overlay(ui, &layout, |p| input.to_screen(p))
        });
        let captured = overlay.is_some_and(|o| o.pointer_captured);

        let mut response = InteractionResponse::default();
        if let Some(output) = overlay {
            let changed = match output.action {
                OverlayAction::None => false,
                OverlayAction::BeginResize(handle, screen) => {
                    let pointer = app.input.to_canvas(screen);
                    app.controller.begin_resize(&mut app.store, handle, pointer)
                }
                OverlayAction::BeginRotate => app.controller.begin_rotate(&mut app.store),
                OverlayAction::Nudge(direction) => {
                    let step = app.config.nudge_step;
                    app.controller.nudge(&mut app.store, direction, step)
                }
                OverlayAction::Delete => app.controller.delete_selected(&mut app.store),
            };
            response.changed |= changed;
        }

        for event in app.input.process_input(ctx) {
            let canvas_press = matches!(event, InputEvent::PointerDown(_) | InputEvent::DoubleClick(_));
            if captured && canvas_press {
                continue;
            }
            response = response.merge(app.controller.handle(&mut app.store, &event));
        }

        if !captured {
            let cursor = match app.controller.gesture() {
                Gesture::Idle => ctx
                    .pointer_hover_pos()
                    .filter(|pos| canvas_rect.contains(*pos))
                    .map(|pos| {
                        app.controller
                            .hover_cursor(&app.store, app.input.to_canvas(pos))
                    }),
                _ => Some(response.cursor),
            };
            if let Some(cursor) = cursor {
                ctx.set_cursor_icon(cursor);
            }
        }
        if response.changed {
            ctx.request_repaint();
        }
    });
}

use egui::{Color32, DragValue, Response};

use crate::app::MockupEditorApp;
use crate::command::Command;
use crate::components::ToolButton;
use crate::element::{
    format_hex_color, Element, ElementPatch, FontStyle, FontWeight, Payload, TextAlign,
};
use crate::id_generator::ElementId;
use crate::interaction::InteractionMode;
use crate::state::{EditorStore, View};

pub fn tools_panel(app: &mut MockupEditorApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Mockup Editor");
                ui.separator();

                view_tabs(app, ui);
                ui.separator();

                add_section(app, ui);
                ui.separator();

                history_row(app, ui);
                ui.separator();

                selection_section(app, ui);
                ui.separator();

                design_section(app, ui);

                if let Some(status) = &app.panel.status {
                    ui.separator();
                    ui.label(status.as_str());
                }
            });
        });

    // a field can lose focus without reporting it, e.g. when the selection
    // changes and the field is no longer drawn
    let idle = app.controller.mode() == InteractionMode::Idle;
    let released = ctx.memory(|m| m.focused().is_none()) && !ctx.input(|i| i.pointer.any_down());
    if app.panel.editing_field && idle && released {
        app.panel.editing_field = false;
        app.store.end_gesture();
    }
}

fn view_tabs(app: &mut MockupEditorApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        let current = app.store.current_view();
        for view in View::ALL {
            let count = app.store.scene().view(view).len();
            let label = format!("{} ({})", view.label(), count);
            if ui.selectable_label(current == view, label).clicked() && current != view {
                app.execute(&Command::SwitchView(view));
            }
        }
    });
}

fn add_section(app: &mut MockupEditorApp, ui: &mut egui::Ui) {
    ui.label("Text");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut app.panel.new_text);
        let text = app.panel.new_text.trim().to_owned();
        if ui.add_enabled(!text.is_empty(), egui::Button::new("Add")).clicked() {
            app.add_centered_text(&text);
            app.panel.new_text.clear();
        }
    });

    ui.label("Image path");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut app.panel.image_path);
        let path = app.panel.image_path.trim().to_owned();
        if ui.add_enabled(!path.is_empty(), egui::Button::new("Add")).clicked() {
            app.add_image_from_path(&path);
        }
    });
    ui.small("Or drop image files onto the window");
}

fn history_row(app: &mut MockupEditorApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        let undo = ToolButton::new("⟲", "Undo (Ctrl+Z)").enabled(app.store.can_undo());
        if undo.show(ui) {
            app.controller.undo(&mut app.store);
        }
        let redo = ToolButton::new("⟳", "Redo (Ctrl+Y)").enabled(app.store.can_redo());
        if redo.show(ui) {
            app.controller.redo(&mut app.store);
        }
        let has_elements = !app.store.current_elements().is_empty();
        let clear = ToolButton::new("🗑", "Clear this view").enabled(has_elements);
        if clear.show(ui) {
            app.execute(&Command::ClearView);
        }
    });

    let history = app.store.history();
    ui.label(format!(
        "Undo steps: {}  Redo steps: {}",
        history.undo_len(),
        history.redo_len()
    ));
}

fn selection_section(app: &mut MockupEditorApp, ui: &mut egui::Ui) {
    let Some(element) = app.store.selected_element().cloned() else {
        ui.weak("Nothing selected. Click an element, or double click the canvas to add text.");
        return;
    };
    let id = element.id;
    ui.strong(format!("Selected {}", element.kind().as_str()));

    ui.horizontal_wrapped(|ui| {
        if ui.button("Delete").clicked() {
            app.controller.delete_selected(&mut app.store);
        }
        if ui.button("Duplicate").clicked() {
            app.controller.duplicate_selected(&mut app.store);
        }
        if ui.button("To front").clicked() {
            app.execute(&Command::BringToFront(id));
        }
        if ui.button("To back").clicked() {
            app.execute(&Command::SendToBack(id));
        }
    });
    ui.horizontal(|ui| {
        let step = app.controller.rotate_step();
        if ui.button(format!("⟲ {}°", step)).clicked() {
            app.controller.rotate_selected_by(&mut app.store, -step);
        }
        if ui.button(format!("⟳ {}°", step)).clicked() {
            app.controller.rotate_selected_by(&mut app.store, step);
        }
    });

    geometry_grid(&mut app.store, &mut app.panel.editing_field, ui, &element);

    match &element.payload {
        Payload::Text(_) => text_properties(app, ui, &element),
        Payload::Image(data) => {
            ui.label(format!("Source: {}", data.src));
            ui.label(format!(
                "Original size: {:.0} × {:.0}",
                data.original_width, data.original_height
            ));
            if ui.button("Reset size").clicked() {
                app.execute(&Command::ResetSize(id));
            }
        }
    }
}

/// Route a property widget's response into the store.
///
/// Drags and focused typing become one gesture with a single undo step;
/// one-shot changes commit immediately.
fn apply_edit(store: &mut EditorStore, editing: &mut bool, id: ElementId, response: &Response, patch: ElementPatch) {
    if response.drag_started() || response.gained_focus() {
        store.begin_gesture();
        *editing = true;
    }
    if response.changed() {
        if store.in_gesture() {
            store.update_live(id, &patch);
        } else {
            store.update_element(id, &patch);
        }
    }
    if *editing && (response.drag_stopped() || response.lost_focus()) {
        *editing = false;
        store.end_gesture();
    }
}

fn geometry_grid(store: &mut EditorStore, editing: &mut bool, ui: &mut egui::Ui, element: &Element) {
    let id = element.id;
    egui::Grid::new("geometry_grid")
        .num_columns(4)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            let (mut x, mut y) = (element.x, element.y);
            ui.label("X");
            let r = ui.add(DragValue::new(&mut x).speed(1.0));
            apply_edit(store, editing, id, &r, ElementPatch { x: Some(x), ..Default::default() });
            ui.label("Y");
            let r = ui.add(DragValue::new(&mut y).speed(1.0));
            apply_edit(store, editing, id, &r, ElementPatch { y: Some(y), ..Default::default() });
            ui.end_row();

            let (mut width, mut height) = (element.width, element.height);
            let min = element.min_size();
            ui.label("W");
            let r = ui.add(DragValue::new(&mut width).speed(1.0).range(min.x..=f32::MAX));
            apply_edit(store, editing, id, &r, ElementPatch { width: Some(width), ..Default::default() });
            ui.label("H");
            let r = ui.add(DragValue::new(&mut height).speed(1.0).range(min.y..=f32::MAX));
            apply_edit(store, editing, id, &r, ElementPatch { height: Some(height), ..Default::default() });
            ui.end_row();

            let mut rotation = element.rotation;
            ui.label("Angle");
            let r = ui.add(DragValue::new(&mut rotation).speed(1.0).suffix("°"));
            apply_edit(store, editing, id, &r, ElementPatch::rotation(rotation));
            ui.end_row();
        });
}

fn text_properties(app: &mut MockupEditorApp, ui: &mut egui::Ui, element: &Element) {
    let Some(data) = element.as_text() else {
        return;
    };
    let id = element.id;
    let store = &mut app.store;
    let editing = &mut app.panel.editing_field;

    let mut text = data.text.clone();
    let r = ui.add(egui::TextEdit::multiline(&mut text).desired_rows(3));
    apply_edit(store, editing, id, &r, ElementPatch::text(text));

    ui.horizontal(|ui| {
        ui.label("Font");
        let mut family = data.font_family.clone();
        let r = ui.add(egui::TextEdit::singleline(&mut family).desired_width(100.0));
        apply_edit(store, editing, id, &r, ElementPatch { font_family: Some(family), ..Default::default() });

        let mut size = data.font_size;
        let r = ui.add(DragValue::new(&mut size).speed(0.5).range(crate::element::MIN_FONT_SIZE..=400.0));
        apply_edit(store, editing, id, &r, ElementPatch::default().with_font_size(size));
    });

    ui.horizontal(|ui| {
        let mut bold = data.font_weight == FontWeight::Bold;
        if ui.checkbox(&mut bold, "Bold").changed() {
            let weight = if bold { FontWeight::Bold } else { FontWeight::Normal };
            store.update_element(id, &ElementPatch { font_weight: Some(weight), ..Default::default() });
        }
        let mut italic = data.font_style == FontStyle::Italic;
        if ui.checkbox(&mut italic, "Italic").changed() {
            let style = if italic { FontStyle::Italic } else { FontStyle::Normal };
            store.update_element(id, &ElementPatch { font_style: Some(style), ..Default::default() });
        }
    });

    ui.horizontal(|ui| {
        for align in [TextAlign::Left, TextAlign::Center, TextAlign::Right] {
            if ui.selectable_label(data.text_align == align, align.as_str()).clicked() {
                store.update_element(id, &ElementPatch { text_align: Some(align), ..Default::default() });
            }
        }
    });

    ui.horizontal(|ui| {
        ui.label("Color");
        let [r, g, b, a] = data.rgba();
        let mut color = Color32::from_rgba_unmultiplied(r, g, b, a);
        let response =
            egui::color_picker::color_edit_button_srgba(ui, &mut color, egui::color_picker::Alpha::OnlyBlend);
        if response.changed() {
            // picker drags stay one undo step until the pointer is released
            if !store.in_gesture() {
                store.begin_gesture();
                app.panel.editing_color = true;
            }
            let patch = ElementPatch {
                color: Some(format_hex_color(color.to_srgba_unmultiplied())),
                ..Default::default()
            };
            store.update_live(id, &patch);
        }
    });
    if app.panel.editing_color && !ui.ctx().input(|i| i.pointer.any_down()) {
        app.panel.editing_color = false;
        app.store.end_gesture();
    }
}

fn design_section(app: &mut MockupEditorApp, ui: &mut egui::Ui) {
    ui.label("Design name");
    ui.text_edit_singleline(&mut app.panel.design_name);
    let named = !app.panel.design_name.trim().is_empty();
    ui.horizontal(|ui| {
        if ui.add_enabled(named, egui::Button::new("Save")).clicked() {
            app.save_design();
        }
        if ui.add_enabled(named, egui::Button::new("Export PNGs")).clicked() {
            app.export_previews();
        }
    });

    egui::CollapsingHeader::new("Saved designs").show(ui, |ui| match app.designs.list() {
        Ok(names) if names.is_empty() => {
            ui.weak("None yet");
        }
        Ok(names) => {
            for name in names {
                ui.horizontal(|ui| {
                    ui.label(name.as_str());
                    if ui.small_button("Load").clicked() {
                        app.load_design(&name);
                    }
                    if ui.small_button("Delete").clicked() {
                        if let Err(e) = app.designs.delete(&name) {
                            app.panel.status = Some(format!("Delete failed: {}", e));
                        }
                    }
                });
            }
        }
        Err(e) => {
            ui.weak(format!("Cannot list {}: {}", app.designs.dir().display(), e));
        }
    });
}

#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use mockup_editor::{EditorConfig, MockupEditorApp};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = match EditorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}; falling back to defaults", e);
            EditorConfig::default()
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Mockup Editor",
        native_options,
        Box::new(|cc| Ok(Box::new(MockupEditorApp::new(cc, config)))),
    )
}

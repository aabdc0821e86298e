use eframe::egui;
use egui::{Pos2, Rect, Vec2};
use std::path::Path;

use crate::image_cache::MemoryFetcher;

/// Largest share of the canvas a dropped image may cover on arrival
const DROP_FIT: f32 = 0.6;

/// What became of one dropped file
#[derive(Debug, Clone, PartialEq)]
pub enum Dropped {
    /// Readable image, ready to be added under `src`
    Image { src: String, natural: Vec2 },
    Rejected { name: String, reason: String },
}

/// Turns files dropped on the window into image sources
#[derive(Debug, Default)]
pub struct FileHandler {
    processed_files: Vec<String>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every newly dropped file, classified.
    ///
    /// Files dropped as bytes (no path) are registered in `memory` under a
    /// `dropped://` source so the image cache can find them.
    pub fn process_dropped_files(&mut self, ctx: &egui::Context, memory: &MemoryFetcher) -> Vec<Dropped> {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            self.processed_files.clear();
            return Vec::new();
        }

        let mut out = Vec::new();
        for file in &dropped {
            let name = file_name(file);
            if self.processed_files.contains(&name) {
                continue;
            }
            self.processed_files.push(name);
            out.push(classify(file, memory));
        }

        if !out.is_empty() {
            ctx.request_repaint();
        }
        out
    }

    /// Dim the window and list the files being dragged over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let text = ctx.input(|i| {
            let mut text = "Dropping files:\n".to_owned();
            for file in &i.raw.hovered_files {
                match &file.path {
                    Some(path) => text += &format!("\n{}", path.display()),
                    None => text += "\n(Path not available)",
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    match &file.path {
        Some(path) => path.display().to_string(),
        None if !file.name.is_empty() => file.name.clone(),
        None => "unknown".to_owned(),
    }
}

/// Work out the source and natural size of one dropped file
pub fn classify(file: &egui::DroppedFile, memory: &MemoryFetcher) -> Dropped {
    let name = file_name(file);
    let reject = |reason: String| {
        log::warn!("cannot add dropped file {}: {}", name, reason);
        Dropped::Rejected {
            name: name.clone(),
            reason,
        }
    };
    if !is_image_file(file) {
        return reject("not a supported image type".to_owned());
    }

    if let Some(bytes) = &file.bytes {
        let natural = match image::load_from_memory(bytes) {
            Ok(img) => Vec2::new(img.width() as f32, img.height() as f32),
            Err(e) => return reject(e.to_string()),
        };
        let src = format!("dropped://{}", name);
        memory.insert(src.clone(), bytes.to_vec());
        Dropped::Image { src, natural }
    } else if let Some(path) = &file.path {
        match natural_size(path) {
            Ok(natural) => Dropped::Image {
                src: path.display().to_string(),
                natural,
            },
            Err(reason) => reject(reason),
        }
    } else {
        reject("no accessible data".to_owned())
    }
}

fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_deref()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.name.clone().into());
    has_image_extension(&name)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"))
}

fn natural_size(path: &Path) -> Result<Vec2, String> {
    image::image_dimensions(path)
        .map(|(w, h)| Vec2::new(w as f32, h as f32))
        .map_err(|e| e.to_string())
}

/// Center an image on the canvas, shrunk to fit while keeping its aspect ratio
pub fn fit_to_canvas(natural: Vec2, canvas: Vec2) -> Rect {
    let natural = natural.max(Vec2::splat(1.0));
    let bound = canvas * DROP_FIT;
    let scale = (bound.x / natural.x).min(bound.y / natural.y).min(1.0);
    let size = natural * scale;
    Rect::from_center_size(Pos2::ZERO + canvas / 2.0, size)
}

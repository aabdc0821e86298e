use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use super::text::{FontBook, TextBlock};
use super::{DisplayList, DrawCommand, TextRun};
use crate::error::RenderError;
use crate::image_cache::{Bitmap, ImageCache};

fn paint() -> PixmapPaint {
    PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    }
}

/// Transform stretching `bitmap` over `width × height` at `(x, y)`, turned about the box center
fn place(bitmap: &Bitmap, x: f32, y: f32, width: f32, height: f32, rotation: f32) -> Transform {
    let sx = width / bitmap.width() as f32;
    let sy = height / bitmap.height() as f32;
    let placed = Transform::from_scale(sx, sy).post_translate(x, y);
    if rotation == 0.0 {
        placed
    } else {
        placed.post_concat(Transform::from_rotate_at(rotation, x + width / 2.0, y + height / 2.0))
    }
}

/// Paint a display list onto a fresh surface of the list's size
pub fn rasterize(list: &DisplayList, cache: &ImageCache, fonts: &FontBook) -> Result<Pixmap, RenderError> {
    let mut surface = Pixmap::new(list.width, list.height).ok_or(RenderError::SurfaceAllocation {
        width: list.width,
        height: list.height,
    })?;
    surface.fill(Color::TRANSPARENT);

    for command in &list.commands {
        match command {
            DrawCommand::Background { src } => {
                let Some(bitmap) = cache.get(src) else {
                    continue;
                };
                let transform = place(bitmap, 0.0, 0.0, list.width as f32, list.height as f32, 0.0);
                surface.draw_pixmap(0, 0, bitmap.as_ref(), &paint(), transform, None);
            }
            DrawCommand::Image {
                src,
                rect,
                rotation,
                ..
            } => {
                // not loaded yet, or failed
                let Some(bitmap) = cache.get(src) else {
                    continue;
                };
                let transform = place(bitmap, rect.min.x, rect.min.y, rect.width(), rect.height(), *rotation);
                surface.draw_pixmap(0, 0, bitmap.as_ref(), &paint(), transform, None);
            }
            DrawCommand::Text(run) => draw_text(&mut surface, run, fonts),
        }
    }

    Ok(surface)
}

fn draw_text(surface: &mut Pixmap, run: &TextRun, fonts: &FontBook) {
    let Some(font) = fonts.resolve(&run.family, run.weight, run.style) else {
        log::warn!("no font available for {}, skipping text {}", run.family, run.id);
        return;
    };
    let block = TextBlock {
        lines: &run.lines,
        font,
        size: run.font_size,
        color: run.color,
        align: run.align,
        box_width: run.rect.width(),
    };

    if run.rotation == 0.0 {
        block.draw(surface, (run.rect.min.x, run.rect.min.y));
        return;
    }

    // rotated text goes through its own layer so the whole block turns about the box center
    let overflow = block.overflow();
    let width = (run.rect.width() + 2.0 * overflow).ceil().max(1.0) as u32;
    let height = run.rect.height().max(block.height()).ceil().max(1.0) as u32 + 1;
    let Some(mut layer) = Pixmap::new(width, height) else {
        log::warn!("cannot allocate a {}x{} text layer for {}", width, height, run.id);
        return;
    };
    block.draw(&mut layer, (overflow, 0.0));

    let center = run.rect.center();
    let transform = Transform::from_translate(run.rect.min.x - overflow, run.rect.min.y)
        .post_concat(Transform::from_rotate_at(run.rotation, center.x, center.y));
    surface.draw_pixmap(0, 0, layer.as_ref(), &paint(), transform, None);
}

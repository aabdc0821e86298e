use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use std::fs;
use tiny_skia::{Pixmap, PremultipliedColorU8};

use crate::config::FontFace;
use crate::element::{FontStyle, FontWeight, TextAlign, LINE_HEIGHT_FACTOR};
use crate::error::RenderError;

/// egui's bundled fonts, used when no configured face matches
const FALLBACK_PROPORTIONAL: &str = "Ubuntu-Light";
const FALLBACK_MONOSPACE: &str = "Hack";
const MONOSPACE_FAMILIES: [&str; 4] = ["monospace", "courier", "courier new", "hack"];

struct Face {
    family: String,
    weight: FontWeight,
    style: FontStyle,
    font: FontArc,
}

/// Fonts available to the raster surface, looked up by family name
pub struct FontBook {
    faces: Vec<Face>,
    proportional: Option<FontArc>,
    monospace: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.iter().map(|face| &face.family).collect::<Vec<_>>())
            .field("has_fallback", &self.proportional.is_some())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        let defs = egui::FontDefinitions::default();
        let builtin = |name: &str| {
            let data = defs.font_data.get(name)?;
            match FontArc::try_from_vec(data.font.to_vec()) {
                Ok(font) => Some(font),
                Err(e) => {
                    log::warn!("built-in font {} is unusable: {}", name, e);
                    None
                }
            }
        };
        Self {
            faces: Vec::new(),
            proportional: builtin(FALLBACK_PROPORTIONAL),
            monospace: builtin(FALLBACK_MONOSPACE),
        }
    }
}

impl FontBook {
    /// Built-in fonts plus every configured face that loads. Failures are logged and skipped.
    pub fn from_config(faces: &[FontFace]) -> Self {
        let mut book = Self::default();
        for face in faces {
            if let Err(e) = book.load_face(face) {
                log::warn!("{}", e);
            }
        }
        book
    }

    pub fn load_face(&mut self, face: &FontFace) -> Result<(), RenderError> {
        let bytes = fs::read(&face.path)?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| RenderError::Font {
            path: face.path.display().to_string(),
            reason: e.to_string(),
        })?;
        log::info!("loaded font {} from {}", face.family, face.path.display());
        self.add_font(&face.family, face.weight, face.style, font);
        Ok(())
    }

    pub fn add_font(&mut self, family: &str, weight: FontWeight, style: FontStyle, font: FontArc) {
        self.faces.push(Face {
            family: family.to_lowercase(),
            weight,
            style,
            font,
        });
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Best face for the request: exact match, then any face of the family, then built-ins
    pub fn resolve(&self, family: &str, weight: FontWeight, style: FontStyle) -> Option<&FontArc> {
        let family = family.to_lowercase();
        let mut same_family = self.faces.iter().filter(|f| f.family == family);
        let exact = same_family
            .clone()
            .find(|f| f.weight == weight && f.style == style);
        if let Some(face) = exact.or_else(|| same_family.next()) {
            return Some(&face.font);
        }
        if MONOSPACE_FAMILIES.contains(&family.as_str()) {
            self.monospace.as_ref().or(self.proportional.as_ref())
        } else {
            self.proportional.as_ref()
        }
    }
}

/// Glyph scale for a CSS-style font size, which sizes the em square
fn em_scale(font: &FontArc, size: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(size * font.height_unscaled() / upem),
        _ => PxScale::from(size),
    }
}

fn glyph_run<F: Font>(font: &F, scale: PxScale, line: &str) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0;
    let mut prev: Option<GlyphId> = None;
    let mut glyphs = Vec::with_capacity(line.len());
    for ch in line.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        glyphs.push((id, caret));
        caret += scaled.h_advance(id);
        prev = Some(id);
    }
    (glyphs, caret)
}

/// Advance width of one line of text
pub fn measure_line(font: &FontArc, size: f32, line: &str) -> f32 {
    glyph_run(font, em_scale(font, size), line).1
}

/// A laid out block of text ready to rasterize
pub(crate) struct TextBlock<'a> {
    pub lines: &'a [String],
    pub font: &'a FontArc,
    pub size: f32,
    pub color: [u8; 4],
    pub align: TextAlign,
    /// Width of the element's box; alignment happens inside it
    pub box_width: f32,
}

impl TextBlock<'_> {
    /// Horizontal room the block needs on each side of the box
    pub fn overflow(&self) -> f32 {
        self.lines
            .iter()
            .map(|line| measure_line(self.font, self.size, line) - self.box_width)
            .fold(0.0, f32::max)
    }

    pub fn height(&self) -> f32 {
        let scaled = self.font.as_scaled(em_scale(self.font, self.size));
        let last = self.lines.len().saturating_sub(1) as f32;
        last * self.size * LINE_HEIGHT_FACTOR + scaled.ascent() - scaled.descent()
    }

    /// Paint the block with its box's top-left at `origin` in `target` pixels
    pub fn draw(&self, target: &mut Pixmap, origin: (f32, f32)) {
        let scale = em_scale(self.font, self.size);
        let ascent = self.font.as_scaled(scale).ascent();
        let line_height = self.size * LINE_HEIGHT_FACTOR;
        let (width, height) = (target.width() as i64, target.height() as i64);
        let stride = target.width() as usize;
        let pixels = target.pixels_mut();

        for (row, line) in self.lines.iter().enumerate() {
            let (glyphs, line_width) = glyph_run(self.font, scale, line);
            let x = origin.0
                + match self.align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => (self.box_width - line_width) / 2.0,
                    TextAlign::Right => self.box_width - line_width,
                };
            let baseline = origin.1 + row as f32 * line_height + ascent;

            for (id, offset) in glyphs {
                let glyph = id.with_scale_and_position(scale, point(x + offset, baseline));
                let Some(outlined) = self.font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i64 + gx as i64;
                    let py = bounds.min.y as i64 + gy as i64;
                    if px < 0 || py < 0 || px >= width || py >= height {
                        return;
                    }
                    let idx = py as usize * stride + px as usize;
                    pixels[idx] = blend(pixels[idx], self.color, coverage);
                });
            }
        }
    }
}

/// Source-over of an unmultiplied color at `coverage` onto a premultiplied pixel
fn blend(dst: PremultipliedColorU8, color: [u8; 4], coverage: f32) -> PremultipliedColorU8 {
    let alpha = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return dst;
    }
    let keep = 1.0 - alpha;
    let channel = |src: u8, dst: u8| (src as f32 * alpha + dst as f32 * keep).round().min(255.0) as u8;
    let out_a = (alpha * 255.0 + dst.alpha() as f32 * keep).round().min(255.0) as u8;
    PremultipliedColorU8::from_rgba(
        channel(color[0], dst.red()).min(out_a),
        channel(color[1], dst.green()).min(out_a),
        channel(color[2], dst.blue()).min(out_a),
        out_a,
    )
    .unwrap_or(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_fonts_are_available() {
        let book = FontBook::default();
        assert_eq!(book.face_count(), 0);
        assert!(book.resolve("Arial", FontWeight::Normal, FontStyle::Normal).is_some());
        assert!(book.resolve("Courier New", FontWeight::Bold, FontStyle::Normal).is_some());
    }

    #[test]
    fn configured_family_wins_over_fallback() {
        let mut book = FontBook::default();
        let hack = book.monospace.clone().unwrap();
        book.add_font("Impact", FontWeight::Bold, FontStyle::Normal, hack);
        let resolved = book
            .resolve("impact", FontWeight::Normal, FontStyle::Italic)
            .unwrap();
        // any face of the family beats the built-in proportional font
        let sample = "WWW";
        assert_eq!(
            measure_line(resolved, 24.0, sample),
            measure_line(book.monospace.as_ref().unwrap(), 24.0, sample)
        );
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let mut book = FontBook::default();
        let face = FontFace {
            family: "Nope".into(),
            path: "/definitely/not/here.ttf".into(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
        };
        assert!(matches!(book.load_face(&face), Err(RenderError::Io(_))));
        assert_eq!(book.face_count(), 0);
    }

    #[test]
    fn measurement_grows_with_size_and_length() {
        let book = FontBook::default();
        let font = book.resolve("Arial", FontWeight::Normal, FontStyle::Normal).unwrap();
        let short = measure_line(font, 24.0, "Hi");
        assert!(short > 0.0);
        assert!(measure_line(font, 24.0, "Hello") > short);
        assert!(measure_line(font, 48.0, "Hi") > short);
        assert_eq!(measure_line(font, 24.0, ""), 0.0);
    }

    #[test]
    fn blend_is_opaque_at_full_coverage() {
        let clear = PremultipliedColorU8::TRANSPARENT;
        let out = blend(clear, [255, 0, 0, 255], 1.0);
        assert_eq!((out.red(), out.green(), out.blue(), out.alpha()), (255, 0, 0, 255));
        let half = blend(clear, [255, 0, 0, 255], 0.5);
        assert_eq!(half.alpha(), 128);
        assert_eq!(blend(clear, [255, 0, 0, 255], 0.0), clear);
    }
}

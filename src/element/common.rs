use egui::Vec2;

// Common constants for all element types
pub const MIN_ELEMENT_SIZE: f32 = 20.0;
pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MIN_TEXT_HEIGHT: f32 = MIN_FONT_SIZE;
pub const DEFAULT_FONT_SIZE: f32 = 24.0;
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;
/// Average glyph advance relative to the font size, used to estimate text boxes
pub const CHAR_WIDTH_FACTOR: f32 = 0.6;

/// Replace a non-finite or too-small dimension with the minimum
pub(crate) fn sanitize_dimension(value: f32, min: f32) -> f32 {
    if !value.is_finite() || value < min {
        log::debug!("clamping dimension {} to minimum {}", value, min);
        min
    } else {
        value
    }
}

/// Replace a non-finite coordinate with the origin
pub(crate) fn sanitize_coord(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        log::debug!("replacing non-finite coordinate {}", value);
        0.0
    }
}

/// Normalize an angle in degrees into `[0, 360)`
pub fn normalize_rotation(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 { 0.0 } else { r }
}

/// Font size clamped to the minimum and rounded to whole pixels
pub(crate) fn sanitize_font_size(size: f32) -> f32 {
    if !size.is_finite() {
        return DEFAULT_FONT_SIZE;
    }
    size.round().max(MIN_FONT_SIZE)
}

/// Estimated bounding box for a block of text at the given font size
pub(crate) fn estimate_text_box(text: &str, font_size: f32) -> Vec2 {
    let lines: Vec<&str> = text.split('\n').collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = longest as f32 * font_size * CHAR_WIDTH_FACTOR;
    let height = lines.len().max(1) as f32 * font_size * LINE_HEIGHT_FACTOR;
    Vec2::new(
        sanitize_dimension(width, MIN_ELEMENT_SIZE),
        sanitize_dimension(height, MIN_TEXT_HEIGHT),
    )
}

//! Pointer and keyboard handling for the canvas.
//!
//! Hit-testing uses each element's unrotated box while the renderer paints it
//! rotated, so a rotated element's clickable area differs from its pixels.

mod controller;
mod resize;

pub use controller::{
    Controller, Direction, Gesture, InteractionMode, InteractionResponse, NEW_TEXT_PLACEHOLDER,
};
pub use resize::{clamp_to_canvas, resize, rotation_toward, ResizeOutcome, ResizeStart};

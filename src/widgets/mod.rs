mod resize_handle;
mod selection_overlay;

pub use resize_handle::ResizeHandle;
pub use selection_overlay::{show_overlay, OverlayAction, OverlayOutput};

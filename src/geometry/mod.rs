mod hit_testing;

pub use hit_testing::{
    handle_hotspot, hit_resize_handle, hit_rotate_handle, hit_test, rotate_handle_pos,
    rotate_point, rotated_corners, Handle, HandleMetrics,
};

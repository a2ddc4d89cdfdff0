mod display_frame;
mod transform;

pub use display_frame::{fit_scale, DisplayFrame};
pub use transform::{compensate_padding, to_original, Viewport, DEFAULT_PADDING};

use thiserror::Error;

/// Integer pixel position, either in scaled (display) or original space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_f32(self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("frame has an empty dimension ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("display bounds must be non-zero, got {max_width}x{max_height}")]
    EmptyDisplay { max_width: u32, max_height: u32 },
}

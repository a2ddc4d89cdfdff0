//! Conversions between display-space pointer coordinates and pixel
//! coordinates of the original frame.

use super::Point;

/// Pixels the display surface adds around the image on every side
pub const DEFAULT_PADDING: i32 = 2;

/// Rescale a point on the downscaled image to the original image.
///
/// When the scaled and original dimensions coincide the point is returned
/// unchanged. Otherwise each coordinate is multiplied by the original/scaled
/// ratio and floored.
pub fn to_original(
    x: i32,
    y: i32,
    orig_w: u32,
    orig_h: u32,
    scaled_w: u32,
    scaled_h: u32,
) -> (i32, i32) {
    if (scaled_w == orig_w && scaled_h == orig_h) || scaled_w == 0 || scaled_h == 0 {
        return (x, y);
    }

    let x = (x as f64 * (orig_w as f64 / scaled_w as f64)).floor() as i32;
    let y = (y as f64 * (orig_h as f64 / scaled_h as f64)).floor() as i32;
    (x, y)
}

/// Remove the display padding and clamp into `[0, w-1] x [0, h-1]`
pub fn compensate_padding(x: i32, y: i32, w: u32, h: u32, padding: i32) -> (i32, i32) {
    let max_x = (w.max(1) - 1) as i32;
    let max_y = (h.max(1) - 1) as i32;

    let x = x.saturating_sub(padding).clamp(0, max_x);
    let y = y.saturating_sub(padding).clamp(0, max_y);
    (x, y)
}

/// Dimensions of one displayed frame in both spaces plus the padding of the
/// surface showing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub original: (u32, u32),
    pub scaled: (u32, u32),
    pub padding: i32,
}

impl Viewport {
    pub fn new(original: (u32, u32), scaled: (u32, u32), padding: i32) -> Self {
        Self {
            original,
            scaled,
            padding,
        }
    }

    pub fn is_scaled(&self) -> bool {
        self.original != self.scaled
    }

    /// Pointer position on the displayed image
    pub fn scaled_point(&self, x: i32, y: i32) -> Point {
        let (w, h) = self.scaled;
        let (x, y) = compensate_padding(x, y, w, h, self.padding);
        Point::new(x, y)
    }

    /// Pointer position on the original image.
    ///
    /// Rescales first, then removes the padding against the original
    /// dimensions. Annotations already on disk were produced in this order.
    pub fn original_point(&self, x: i32, y: i32) -> Point {
        let (ow, oh) = self.original;
        let (sw, sh) = self.scaled;
        let (x, y) = to_original(x, y, ow, oh, sw, sh);
        let (x, y) = compensate_padding(x, y, ow, oh, self.padding);
        Point::new(x, y)
    }
}

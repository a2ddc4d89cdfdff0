use image::{imageops, DynamicImage, RgbImage};

use super::{GeometryError, Viewport};

/// Scale factor that fits a `width` x `height` frame inside the display
/// bounds. Frames are never upscaled.
pub fn fit_scale(width: u32, height: u32, max_width: u32, max_height: u32) -> f64 {
    if width >= max_width || height >= max_height {
        let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
        scale.min(1.0)
    } else {
        1.0
    }
}

/// A loaded frame together with the copy shown on screen
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    original: RgbImage,
    scaled: RgbImage,
    scale: f64,
    viewport: Viewport,
}

impl DisplayFrame {
    /// Prepare `frame` for display within `max_width` x `max_height`.
    ///
    /// Single-channel frames are expanded to three identical channels.
    pub fn new(
        frame: &DynamicImage,
        max_width: u32,
        max_height: u32,
        padding: i32,
    ) -> Result<Self, GeometryError> {
        let _span = tracing::debug_span!("display_frame").entered();

        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyFrame { width, height });
        }
        if max_width == 0 || max_height == 0 {
            return Err(GeometryError::EmptyDisplay {
                max_width,
                max_height,
            });
        }

        let original = frame.to_rgb8();
        let scale = fit_scale(width, height, max_width, max_height);
        let scaled_width = ((width as f64 * scale).round() as u32).max(1);
        let scaled_height = ((height as f64 * scale).round() as u32).max(1);

        let scaled = if (scaled_width, scaled_height) != (width, height) {
            tracing::debug!(
                "Scaling {}x{} frame to {}x{} (s={:.4})",
                width,
                height,
                scaled_width,
                scaled_height,
                scale
            );
            imageops::resize(
                &original,
                scaled_width,
                scaled_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            original.clone()
        };

        Ok(Self {
            original,
            scaled,
            scale,
            viewport: Viewport::new((width, height), (scaled_width, scaled_height), padding),
        })
    }

    pub fn original(&self) -> &RgbImage {
        &self.original
    }

    pub fn scaled(&self) -> &RgbImage {
        &self.scaled
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn original_size(&self) -> (u32, u32) {
        self.viewport.original
    }

    pub fn scaled_size(&self) -> (u32, u32) {
        self.viewport.scaled
    }

    /// Bring an image at original resolution down to the displayed size
    pub fn fit_to_display(&self, image: &RgbImage) -> RgbImage {
        let (width, height) = self.scaled_size();
        if image.dimensions() == (width, height) {
            image.clone()
        } else {
            imageops::resize(image, width, height, imageops::FilterType::Lanczos3)
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, Luma, RgbImage};

    use super::{fit_scale, DisplayFrame};
    use crate::geometry::DEFAULT_PADDING;

    #[test]
    fn full_hd_fits_into_800_by_600() {
        let scale = fit_scale(1920, 1080, 800, 600);
        assert!((scale - 800.0 / 1920.0).abs() < 1e-12);
        assert!((scale - 0.4167).abs() < 1e-4);

        let frame = DynamicImage::ImageRgb8(RgbImage::new(1920, 1080));
        let display = DisplayFrame::new(&frame, 800, 600, DEFAULT_PADDING).expect("display frame");
        assert_eq!(display.scaled_size(), (800, 450));
        assert_eq!(display.scaled().dimensions(), (800, 450));
        assert_eq!(display.original_size(), (1920, 1080));
        assert!(display.viewport().is_scaled());
    }

    #[test]
    fn small_frames_are_not_upscaled() {
        assert_eq!(fit_scale(320, 240, 800, 600), 1.0);

        let frame = DynamicImage::ImageRgb8(RgbImage::new(320, 240));
        let display = DisplayFrame::new(&frame, 800, 600, DEFAULT_PADDING).expect("display frame");
        assert_eq!(display.scale(), 1.0);
        assert_eq!(display.scaled_size(), (320, 240));
        assert!(!display.viewport().is_scaled());
    }

    #[test]
    fn touching_the_bound_keeps_scale_one() {
        // width reaches the bound but the height ratio is larger than one
        assert_eq!(fit_scale(800, 300, 800, 600), 1.0);
    }

    #[test]
    fn gray_frames_become_rgb() {
        let frame = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 8, Luma([77])));
        let display = DisplayFrame::new(&frame, 800, 600, DEFAULT_PADDING).expect("display frame");
        assert_eq!(display.original().get_pixel(3, 3).0, [77, 77, 77]);
    }

    #[test]
    fn empty_frame_is_rejected() {
        let frame = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        assert!(DisplayFrame::new(&frame, 800, 600, DEFAULT_PADDING).is_err());
    }
}

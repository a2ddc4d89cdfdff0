use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

/// Colour of the in-progress guide line
pub const GUIDE_COLOR: Rgb<u8> = Rgb([128, 0, 0]);
/// Colour of a committed horizon on the display canvas
pub const HORIZON_COLOR: Rgb<u8> = Rgb([128, 0, 0]);
/// Colour of a stored annotation when shown on the frame
pub const ANNOTATION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

pub const GUIDE_WIDTH: u32 = 1;
pub const HORIZON_WIDTH: u32 = 3;

/// Draw a line `width` pixels thick by stacking parallel one-pixel segments
/// along the line normal.
pub fn stroke_line(
    canvas: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    color: Rgb<u8>,
) {
    let width = width.max(1);
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }

    let (nx, ny) = (-dy / length, dx / length);
    let half = (width - 1) as f32 / 2.0;
    for k in 0..width {
        let offset = k as f32 - half;
        let shift = (nx * offset, ny * offset);
        draw_line_segment_mut(
            canvas,
            (start.0 + shift.0, start.1 + shift.1),
            (end.0 + shift.0, end.1 + shift.1),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::stroke_line;
    use image::{Rgb, RgbImage};

    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    #[test]
    fn thin_line_touches_one_row() {
        let mut canvas = RgbImage::new(20, 10);
        stroke_line(&mut canvas, (0.0, 5.0), (19.0, 5.0), 1, RED);
        for x in 1..19 {
            assert_eq!(*canvas.get_pixel(x, 5), RED);
            assert_eq!(*canvas.get_pixel(x, 4), Rgb([0, 0, 0]));
        }
    }

    #[test]
    fn thick_line_covers_neighbouring_rows() {
        let mut canvas = RgbImage::new(20, 10);
        stroke_line(&mut canvas, (0.0, 5.0), (19.0, 5.0), 3, RED);
        for y in 4..=6 {
            assert_eq!(*canvas.get_pixel(10, y), RED);
        }
        assert_eq!(*canvas.get_pixel(10, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn point_draws_nothing() {
        let mut canvas = RgbImage::new(4, 4);
        stroke_line(&mut canvas, (1.0, 1.0), (1.0, 1.0), 5, RED);
        assert!(canvas.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}

//! Extrapolation of a drawn stroke into a full-width horizon line and the
//! canonical `(Y, alpha)` parameters derived from it.

use std::f64::consts::PI;

use thiserror::Error;

use crate::geometry::Point;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    #[error("segment has zero horizontal run (x = {x}), slope is undefined")]
    DegenerateSegment { x: i32 },
}

/// Start and end of a stroke in one coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Endpoints {
    pub start: Point,
    pub end: Point,
}

impl Endpoints {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }
}

/// A drawn stroke, tracked in scaled and original space side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Segment {
    pub scaled: Endpoints,
    pub original: Endpoints,
}

impl Segment {
    /// Stroke that starts and ends at the pointer-down position
    pub fn begin(scaled: Point, original: Point) -> Self {
        Self {
            scaled: Endpoints::new(scaled, scaled),
            original: Endpoints::new(original, original),
        }
    }

    pub fn extend_to(&mut self, scaled: Point, original: Point) {
        self.scaled.end = scaled;
        self.original.end = original;
    }

    pub fn is_zero_length(&self) -> bool {
        self.scaled.is_point() && self.original.is_point()
    }
}

/// Straight line `y = slope * x + intercept` spanning `x` in `[0, width - 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl LineFit {
    pub fn through(endpoints: &Endpoints, width: u32) -> Result<Self, FitError> {
        let Endpoints { start, end } = *endpoints;
        if start.x == end.x {
            return Err(FitError::DegenerateSegment { x: start.x });
        }

        let slope = (end.y - start.y) as f64 / (end.x - start.x) as f64;
        let intercept = start.y as f64 - slope * start.x as f64;

        let x_end = width.saturating_sub(1) as f64;
        Ok(Self {
            slope,
            intercept,
            start: (0.0, intercept),
            end: (x_end, slope * x_end + intercept),
        })
    }

    pub fn y_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Full-width horizon fitted from the last committed stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonLine {
    /// Line on the displayed image, used for the on-screen overlay
    pub scaled: LineFit,
    /// Line on the original frame, the source of the ground truth
    pub original: LineFit,
    /// Column at which `y` is measured, `floor((W - 1) / 2)`
    pub x_center: u32,
    /// Vertical position of the horizon at `x_center`, in original pixels
    pub y: f64,
    /// Tilt in degrees; positive when the right side is higher than the left
    pub alpha: f64,
}

impl HorizonLine {
    /// Full-width endpoints in original space, truncated toward zero
    pub fn original_endpoints(&self) -> [i32; 4] {
        let (xs, ys) = self.original.start;
        let (xe, ye) = self.original.end;
        [xs as i32, ys as i32, xe as i32, ye as i32]
    }
}

/// Fit the horizon through `segment`.
///
/// `scaled_width` and `original_width` are the widths of the displayed and
/// original image; the fitted lines span the whole of each.
pub fn fit_horizon(
    segment: &Segment,
    scaled_width: u32,
    original_width: u32,
) -> Result<HorizonLine, FitError> {
    let _span = tracing::debug_span!("fit_horizon").entered();

    let scaled = LineFit::through(&segment.scaled, scaled_width)?;
    let original = LineFit::through(&segment.original, original_width)?;

    let x_center = original_width.saturating_sub(1) / 2;
    let y = original.y_at(x_center as f64);
    let alpha = (-original.slope.atan()) * (180.0 / PI);

    tracing::debug!(
        "Fitted horizon: slope={:.5}, intercept={:.3}, Y={:.3}, alpha={:.4}",
        original.slope,
        original.intercept,
        y,
        alpha
    );

    Ok(HorizonLine {
        scaled,
        original,
        x_center,
        y,
        alpha,
    })
}

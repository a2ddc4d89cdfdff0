mod canvas;
mod events;

pub use canvas::{
    stroke_line, ANNOTATION_COLOR, GUIDE_COLOR, GUIDE_WIDTH, HORIZON_COLOR, HORIZON_WIDTH,
};
pub use events::{DrawingOutcome, PointerButton, PointerEvent};

use anyhow::Result;
use image::RgbImage;

use crate::display::DisplaySink;
use crate::geometry::{DisplayFrame, Point};
use crate::horizon::{fit_horizon, HorizonLine, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingState {
    Idle,
    Drawing,
}

/// Turns pointer events into strokes and committed horizon lines.
///
/// Two canvases are kept at display resolution: `baseline` holds the frame
/// with at most one committed horizon baked in, `preview` is rebuilt from
/// `baseline` on every pointer move while a stroke is in progress. Only a
/// successful commit ever replaces `baseline`.
#[derive(Debug)]
pub struct DrawingMachine {
    frame: Option<DisplayFrame>,
    baseline: RgbImage,
    preview: RgbImage,
    state: DrawingState,
    stroke: Option<Segment>,
    committed: Option<(Segment, HorizonLine)>,
    cursor: Option<Point>,
}

impl Default for DrawingMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingMachine {
    pub fn new() -> Self {
        Self {
            frame: None,
            baseline: RgbImage::new(0, 0),
            preview: RgbImage::new(0, 0),
            state: DrawingState::Idle,
            stroke: None,
            committed: None,
            cursor: None,
        }
    }

    /// Replace the working frame, dropping any stroke or committed line
    pub fn load_frame<D>(&mut self, frame: DisplayFrame, display: &mut D) -> Result<()>
    where
        D: DisplaySink + ?Sized,
    {
        tracing::debug!(
            "Loading {:?} frame shown at {:?}",
            frame.original_size(),
            frame.scaled_size()
        );
        self.frame = Some(frame);
        self.reset_canvas(display)
    }

    /// Restore the baseline to the clean frame and forget the committed line
    pub fn reset_canvas<D>(&mut self, display: &mut D) -> Result<()>
    where
        D: DisplaySink + ?Sized,
    {
        self.state = DrawingState::Idle;
        self.stroke = None;
        self.committed = None;

        let Some(frame) = self.frame.as_ref() else {
            return Ok(());
        };
        self.baseline = frame.scaled().clone();
        display.render(&self.baseline)
    }

    pub fn handle<D>(&mut self, event: PointerEvent, display: &mut D) -> Result<DrawingOutcome>
    where
        D: DisplaySink + ?Sized,
    {
        let Some(viewport) = self.frame.as_ref().map(DisplayFrame::viewport) else {
            tracing::debug!("No frame loaded, ignoring {:?}", event);
            return Ok(DrawingOutcome::Ignored);
        };

        match event {
            PointerEvent::Down {
                button: PointerButton::Primary,
                x,
                y,
            } => {
                let scaled = viewport.scaled_point(x, y);
                let original = viewport.original_point(x, y);
                self.cursor = Some(original);
                self.stroke = Some(Segment::begin(scaled, original));
                self.state = DrawingState::Drawing;
                tracing::debug!("Stroke started at {:?} (original {:?})", scaled, original);
                Ok(DrawingOutcome::Started)
            }
            PointerEvent::Down {
                button: PointerButton::Secondary,
                ..
            }
            | PointerEvent::Cancel => self.cancel(display),
            PointerEvent::Move { x, y } => {
                let original = viewport.original_point(x, y);
                self.cursor = Some(original);
                if self.state != DrawingState::Drawing {
                    return Ok(DrawingOutcome::Ignored);
                }
                let Some(stroke) = self.stroke.as_mut() else {
                    return Ok(DrawingOutcome::Ignored);
                };
                stroke.extend_to(viewport.scaled_point(x, y), original);
                let guide = stroke.scaled;

                self.preview.clone_from(&self.baseline);
                if !guide.is_point() {
                    stroke_line(
                        &mut self.preview,
                        guide.start.as_f32(),
                        guide.end.as_f32(),
                        GUIDE_WIDTH,
                        GUIDE_COLOR,
                    );
                }
                display.render(&self.preview)?;
                Ok(DrawingOutcome::Previewed)
            }
            PointerEvent::Up { x, y } => {
                if self.state != DrawingState::Drawing {
                    return Ok(DrawingOutcome::Ignored);
                }
                self.state = DrawingState::Idle;
                let Some(mut stroke) = self.stroke.take() else {
                    return Ok(DrawingOutcome::Ignored);
                };
                let original = viewport.original_point(x, y);
                self.cursor = Some(original);
                stroke.extend_to(viewport.scaled_point(x, y), original);
                self.commit(stroke, display)
            }
        }
    }

    fn cancel<D>(&mut self, display: &mut D) -> Result<DrawingOutcome>
    where
        D: DisplaySink + ?Sized,
    {
        if self.state != DrawingState::Drawing {
            return Ok(DrawingOutcome::Ignored);
        }
        self.state = DrawingState::Idle;
        self.stroke = None;
        tracing::debug!("Stroke canceled");
        display.render(&self.baseline)?;
        Ok(DrawingOutcome::Canceled)
    }

    fn commit<D>(&mut self, stroke: Segment, display: &mut D) -> Result<DrawingOutcome>
    where
        D: DisplaySink + ?Sized,
    {
        let Some(frame) = self.frame.as_ref() else {
            return Ok(DrawingOutcome::Ignored);
        };

        if stroke.is_zero_length() {
            tracing::debug!("Stroke released on its start point, nothing to fit");
            display.render(&self.baseline)?;
            return Ok(DrawingOutcome::Unchanged);
        }

        let (scaled_width, _) = frame.scaled_size();
        let (original_width, _) = frame.original_size();
        let horizon = match fit_horizon(&stroke, scaled_width, original_width) {
            Ok(horizon) => horizon,
            Err(err) => {
                tracing::warn!("Stroke rejected: {}", err);
                display.render(&self.baseline)?;
                return Ok(DrawingOutcome::Rejected(err));
            }
        };

        let mut baseline = frame.scaled().clone();
        stroke_line(
            &mut baseline,
            stroke.scaled.start.as_f32(),
            stroke.scaled.end.as_f32(),
            GUIDE_WIDTH,
            GUIDE_COLOR,
        );
        stroke_line(
            &mut baseline,
            (horizon.scaled.start.0 as f32, horizon.scaled.start.1 as f32),
            (horizon.scaled.end.0 as f32, horizon.scaled.end.1 as f32),
            HORIZON_WIDTH,
            HORIZON_COLOR,
        );
        self.baseline = baseline;
        display.render(&self.baseline)?;

        tracing::info!(
            "Line committed: Y={:.2} alpha={:.2} from {:?}",
            horizon.y,
            horizon.alpha,
            stroke.original
        );
        self.committed = Some((stroke, horizon));
        Ok(DrawingOutcome::Committed(horizon))
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn frame(&self) -> Option<&DisplayFrame> {
        self.frame.as_ref()
    }

    pub fn baseline(&self) -> &RgbImage {
        &self.baseline
    }

    pub fn preview(&self) -> &RgbImage {
        &self.preview
    }

    /// Stroke currently being drawn
    pub fn stroke(&self) -> Option<&Segment> {
        self.stroke.as_ref()
    }

    pub fn committed_segment(&self) -> Option<&Segment> {
        self.committed.as_ref().map(|(segment, _)| segment)
    }

    pub fn horizon(&self) -> Option<&HorizonLine> {
        self.committed.as_ref().map(|(_, horizon)| horizon)
    }

    /// Last pointer position in original-space pixels
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }
}

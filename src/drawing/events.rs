use crate::horizon::{FitError, HorizonLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Starts a stroke
    Primary,
    /// Cancels the stroke in progress
    Secondary,
}

/// Pointer input in display-space coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down { button: PointerButton, x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Up { x: i32, y: i32 },
    Cancel,
}

/// Result of feeding one pointer event to the drawing machine
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingOutcome {
    /// Event had no effect in the current state
    Ignored,
    /// A stroke was started
    Started,
    /// The guide line was redrawn on the preview canvas
    Previewed,
    /// The stroke in progress was dropped, baseline shown again
    Canceled,
    /// Pointer released on the start point, nothing to fit
    Unchanged,
    /// The stroke could not be fitted; baseline left untouched
    Rejected(FitError),
    /// A new horizon was fitted and baked into the baseline
    Committed(HorizonLine),
}

impl DrawingOutcome {
    pub fn committed(&self) -> Option<&HorizonLine> {
        match self {
            Self::Committed(horizon) => Some(horizon),
            _ => None,
        }
    }
}

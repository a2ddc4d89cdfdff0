mod snapshot;

pub use snapshot::PngSnapshotSink;

use anyhow::Result;
use image::RgbImage;

/// Trait for the surface that shows frames to the user
pub trait DisplaySink {
    /// Replace the on-screen image. The sink receives a borrowed snapshot and
    /// must copy whatever it keeps.
    fn render(&mut self, frame: &RgbImage) -> Result<()>;

    /// Push any buffered output to its destination
    fn flush(&mut self) -> Result<()> {
        // Default implementation: nothing buffered
        Ok(())
    }
}

/// Display that discards every frame
#[derive(Debug, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn render(&mut self, _frame: &RgbImage) -> Result<()> {
        Ok(())
    }
}

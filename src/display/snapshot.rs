use super::DisplaySink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Keeps the most recent render and writes it as a PNG on flush
pub struct PngSnapshotSink {
    path: PathBuf,
    last: Option<RgbImage>,
    renders: u64,
}

impl PngSnapshotSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        tracing::info!("Display snapshots go to {}", path.display());
        Self {
            path,
            last: None,
            renders: 0,
        }
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }
}

impl DisplaySink for PngSnapshotSink {
    fn render(&mut self, frame: &RgbImage) -> Result<()> {
        match self.last.as_mut() {
            Some(last) => last.clone_from(frame),
            None => self.last = Some(frame.clone()),
        }
        self.renders += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let Some(frame) = self.last.as_ref() else {
            tracing::debug!("Nothing rendered, no snapshot written");
            return Ok(());
        };

        frame
            .save(&self.path)
            .with_context(|| format!("Failed to write snapshot to {}", self.path.display()))?;

        tracing::info!(
            "Wrote {}x{} snapshot after {} renders",
            frame.width(),
            frame.height(),
            self.renders
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PngSnapshotSink;
    use crate::display::DisplaySink;
    use image::{Rgb, RgbImage};

    #[test]
    fn flush_writes_last_render() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shown.png");
        let mut sink = PngSnapshotSink::new(&path);

        sink.render(&RgbImage::from_pixel(4, 3, Rgb([1, 2, 3])))
            .expect("render");
        sink.render(&RgbImage::from_pixel(4, 3, Rgb([9, 8, 7])))
            .expect("render");
        sink.flush().expect("flush");

        let written = image::open(&path).expect("snapshot exists").to_rgb8();
        assert_eq!(written.get_pixel(0, 0).0, [9, 8, 7]);
        assert_eq!(sink.renders(), 2);
    }

    #[test]
    fn flush_without_render_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("never.png");
        let mut sink = PngSnapshotSink::new(&path);
        sink.flush().expect("flush");
        assert!(!path.exists());
    }
}

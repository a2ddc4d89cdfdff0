mod image_sequence;

pub use image_sequence::ImageSequence;

use anyhow::Result;
use image::DynamicImage;

/// Trait for anything that can hand out frames of a video by index
pub trait FrameSource {
    /// Decode frame `index`, or `None` once past the end of the stream
    fn frame(&mut self, index: usize) -> Result<Option<DynamicImage>>;

    /// Number of frames in the stream
    fn frame_count(&self) -> usize;

    /// Short name of the video, used to name the ground-truth file
    fn name(&self) -> &str;
}

/// Frames held in memory
pub struct InMemorySource {
    name: String,
    frames: Vec<DynamicImage>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, frames: Vec<DynamicImage>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }
}

impl FrameSource for InMemorySource {
    fn frame(&mut self, index: usize) -> Result<Option<DynamicImage>> {
        Ok(self.frames.get(index).cloned())
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

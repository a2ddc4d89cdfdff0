use super::FrameSource;
use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// A video stored as one image file per frame, ordered by file name
pub struct ImageSequence {
    name: String,
    frames: Vec<PathBuf>,
}

impl ImageSequence {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::info!("Opening image sequence in {}", dir.display());

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read frame directory {}", dir.display()))?;

        let mut frames = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list {}", dir.display()))?
                .path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_image {
                frames.push(path);
            }
        }
        frames.sort();

        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();

        tracing::info!("Found {} frames for '{}'", frames.len(), name);
        Ok(Self { name, frames })
    }
}

impl FrameSource for ImageSequence {
    fn frame(&mut self, index: usize) -> Result<Option<DynamicImage>> {
        let Some(path) = self.frames.get(index) else {
            return Ok(None);
        };

        let image = image::open(path)
            .with_context(|| format!("Failed to decode frame {}", path.display()))?;
        Ok(Some(image))
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::ImageSequence;
    use crate::source::FrameSource;
    use image::{GrayImage, Luma};

    #[test]
    fn frames_are_ordered_by_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let frames = dir.path().join("harbour");
        std::fs::create_dir(&frames).expect("mkdir");
        for (name, value) in [("f002.png", 2u8), ("f000.png", 0), ("f001.png", 1)] {
            GrayImage::from_pixel(4, 4, Luma([value]))
                .save(frames.join(name))
                .expect("write frame");
        }
        std::fs::write(frames.join("notes.txt"), "not a frame").expect("write");

        let mut source = ImageSequence::open(&frames).expect("open");
        assert_eq!(source.frame_count(), 3);
        assert_eq!(source.name(), "harbour");

        for i in 0..3 {
            let frame = source.frame(i).expect("decode").expect("frame exists");
            assert_eq!(frame.to_luma8().get_pixel(0, 0).0, [i as u8]);
        }
        assert!(source.frame(3).expect("decode").is_none());
    }
}

//! Application-level state of one annotation session: the current frame,
//! browsing, key commands and the last fitted horizon.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{BrowsingOffset, ConfigError, LineThickness, SessionConfig};
use crate::display::DisplaySink;
use crate::drawing::{stroke_line, DrawingMachine, DrawingOutcome, PointerEvent, ANNOTATION_COLOR};
use crate::geometry::{DisplayFrame, GeometryError};
use crate::horizon::HorizonLine;
use crate::source::FrameSource;
use crate::store::{GroundTruthStore, SavePolicy, StoreError};

/// Suffix of ground-truth files, appended to the video name
pub const GT_SUFFIX: &str = "_LineGT.npy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Validate,
    Delete,
    Show,
    Hide,
    PropagateBackward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Validated,
    Deleted,
    Shown,
    Hidden,
    Propagated(usize),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the video has no frames")]
    EmptyVideo,

    #[error("frame {index} could not be read")]
    EndOfStream { index: usize },

    #[error("no line has been drawn on this frame yet")]
    NoCommittedLine,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub struct Session<S, D> {
    config: SessionConfig,
    source: S,
    display: D,
    machine: DrawingMachine,
    store: GroundTruthStore,
    frame_index: usize,
    last_horizon: Option<HorizonLine>,
}

impl<S, D> Session<S, D>
where
    S: FrameSource,
    D: DisplaySink,
{
    /// Start annotating `source`, with every frame unannotated and the first
    /// frame on screen
    pub fn open(source: S, display: D, config: SessionConfig) -> Result<Self, SessionError> {
        let frame_count = source.frame_count();
        if frame_count == 0 {
            return Err(SessionError::EmptyVideo);
        }
        tracing::info!("Annotating '{}' ({} frames)", source.name(), frame_count);

        let mut session = Self {
            config,
            source,
            display,
            machine: DrawingMachine::new(),
            store: GroundTruthStore::new(frame_count),
            frame_index: 0,
            last_horizon: None,
        };
        session.go_to(0)?;
        Ok(session)
    }

    fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        let image = self
            .source
            .frame(index)?
            .ok_or(SessionError::EndOfStream { index })?;
        let frame = DisplayFrame::new(
            &image,
            self.config.max_width,
            self.config.max_height,
            self.config.padding,
        )?;

        self.frame_index = index;
        self.last_horizon = None;
        self.machine.load_frame(frame, &mut self.display)?;
        tracing::debug!("Showing frame {}/{}", index + 1, self.frame_count());
        self.show_annotation()
    }

    /// Move forward by the browsing offset, stopping at the last frame
    pub fn next(&mut self) -> Result<usize, SessionError> {
        let last = self.frame_count() - 1;
        let index = (self.frame_index + self.config.browsing_offset.get()).min(last);
        self.go_to(index)?;
        Ok(index)
    }

    /// Move back by the browsing offset, stopping at the first frame
    pub fn back(&mut self) -> Result<usize, SessionError> {
        let index = self
            .frame_index
            .saturating_sub(self.config.browsing_offset.get());
        self.go_to(index)?;
        Ok(index)
    }

    pub fn pointer(&mut self, event: PointerEvent) -> Result<DrawingOutcome, SessionError> {
        let outcome = self.machine.handle(event, &mut self.display)?;
        if let Some(horizon) = outcome.committed() {
            self.last_horizon = Some(*horizon);
        }
        Ok(outcome)
    }

    pub fn command(&mut self, command: KeyCommand) -> Result<CommandOutcome, SessionError> {
        let index = self.frame_index;
        match command {
            KeyCommand::Validate => {
                let horizon = self.last_horizon.ok_or(SessionError::NoCommittedLine)?;
                self.store.validate(index, &horizon)?;
                self.show_annotation()?;
                Ok(CommandOutcome::Validated)
            }
            KeyCommand::Delete => {
                self.store.delete(index)?;
                self.show_annotation()?;
                Ok(CommandOutcome::Deleted)
            }
            KeyCommand::Show => {
                self.show_annotation()?;
                Ok(CommandOutcome::Shown)
            }
            KeyCommand::Hide => {
                self.hide_annotation()?;
                Ok(CommandOutcome::Hidden)
            }
            KeyCommand::PropagateBackward => {
                let filled = self.store.propagate_backward(index)?;
                Ok(CommandOutcome::Propagated(filled))
            }
        }
    }

    /// Draw the stored annotation of the current frame, or reset the canvas
    /// to the clean frame when there is none
    fn show_annotation(&mut self) -> Result<(), SessionError> {
        let record = self
            .store
            .record(self.frame_index)
            .copied()
            .unwrap_or_default();

        if !record.is_annotated() {
            self.machine.reset_canvas(&mut self.display)?;
            return Ok(());
        }

        let Some(frame) = self.machine.frame() else {
            return Ok(());
        };

        let mut annotated = frame.original().clone();
        stroke_line(
            &mut annotated,
            (record.x_start as f32, record.y_start as f32),
            (record.x_end as f32, record.y_end as f32),
            self.config.line_thickness.get(),
            ANNOTATION_COLOR,
        );
        self.display.render(&frame.fit_to_display(&annotated))?;
        Ok(())
    }

    fn hide_annotation(&mut self) -> Result<(), SessionError> {
        if let Some(frame) = self.machine.frame() {
            self.display.render(frame.scaled())?;
        }
        Ok(())
    }

    pub fn set_line_thickness(&mut self, input: &str) -> LineThickness {
        self.config.line_thickness = LineThickness::parse(input);
        self.config.line_thickness
    }

    /// Invalid input leaves the current offset in place
    pub fn set_browsing_offset(&mut self, input: &str) -> Result<BrowsingOffset, SessionError> {
        self.config.browsing_offset = BrowsingOffset::parse(input)?;
        Ok(self.config.browsing_offset)
    }

    /// Ground-truth path for this video inside `dir`
    pub fn ground_truth_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}{}", self.source.name(), GT_SUFFIX))
    }

    pub fn save(&self, path: &Path, policy: SavePolicy) -> Result<(), SessionError> {
        self.store.save(path, policy)?;
        Ok(())
    }

    /// Replace all annotations with the contents of `path` and redraw
    pub fn load_ground_truth(&mut self, path: &Path) -> Result<(), SessionError> {
        self.store.load(path)?;
        self.show_annotation()
    }

    /// Current annotation as shown next to the frame
    pub fn summary(&self) -> String {
        self.store
            .record(self.frame_index)
            .copied()
            .unwrap_or_default()
            .summary()
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn frame_count(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &GroundTruthStore {
        &self.store
    }

    pub fn machine(&self) -> &DrawingMachine {
        &self.machine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn last_horizon(&self) -> Option<&HorizonLine> {
        self.last_horizon.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

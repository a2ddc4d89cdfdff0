mod npy;

use std::path::Path;

use ndarray::Array2;
use thiserror::Error;

use crate::horizon::HorizonLine;

/// Columns of one persisted row: `[Y, alpha, x_start, y_start, x_end, y_end]`
pub const COLUMNS: usize = 6;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{missing} of {total} frames are not annotated")]
    IncompleteAnnotation { missing: usize, total: usize },

    #[error("ground-truth file does not match the loaded video: {0}")]
    FormatMismatch(String),

    #[error("frame {index} has no annotation to propagate")]
    NoValidSourceForPropagation { index: usize },

    #[error("frame index {index} is out of range for {len} frames")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to write ground-truth array: {0}")]
    Write(#[from] ndarray_npy::WriteNpyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Ground truth for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationRecord {
    pub y: f32,
    pub alpha: f32,
    pub x_start: i32,
    pub y_start: i32,
    pub x_end: i32,
    pub y_end: i32,
}

impl Default for AnnotationRecord {
    fn default() -> Self {
        Self::UNANNOTATED
    }
}

impl AnnotationRecord {
    pub const UNANNOTATED: Self = Self {
        y: f32::NAN,
        alpha: f32::NAN,
        x_start: 0,
        y_start: 0,
        x_end: 0,
        y_end: 0,
    };

    pub fn from_horizon(horizon: &HorizonLine) -> Self {
        let [x_start, y_start, x_end, y_end] = horizon.original_endpoints();
        Self {
            y: horizon.y as f32,
            alpha: horizon.alpha as f32,
            x_start,
            y_start,
            x_end,
            y_end,
        }
    }

    pub fn is_annotated(&self) -> bool {
        !self.y.is_nan()
    }

    pub fn to_row(&self) -> [f32; COLUMNS] {
        [
            self.y,
            self.alpha,
            self.x_start as f32,
            self.y_start as f32,
            self.x_end as f32,
            self.y_end as f32,
        ]
    }

    fn from_row(row: &[f32]) -> Option<Self> {
        let [y, alpha, xs, ys, xe, ye] = *row else {
            return None;
        };
        if y.is_nan() != alpha.is_nan() || y.is_infinite() || alpha.is_infinite() {
            return None;
        }
        Some(Self {
            y,
            alpha,
            x_start: xs as i32,
            y_start: ys as i32,
            x_end: xe as i32,
            y_end: ye as i32,
        })
    }

    /// `Y` and `alpha` rounded to two decimals, `???` when unannotated
    pub fn summary(&self) -> String {
        if self.is_annotated() {
            format!("Y = {:.2} pixs, Alpha = {:.2} °", self.y, self.alpha)
        } else {
            "Y = ??? pixs, Alpha = ??? °".to_string()
        }
    }
}

/// Number of rows in a ground-truth file, read without checking it against
/// a video
pub fn row_count(path: &Path) -> Result<usize, StoreError> {
    Ok(npy::read(path)?.nrows())
}

/// Whether `save` may write a file that still has unannotated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePolicy {
    RequireComplete,
    AllowIncomplete,
}

/// Per-frame ground truth of one video
#[derive(Debug, Clone)]
pub struct GroundTruthStore {
    records: Vec<AnnotationRecord>,
}

impl GroundTruthStore {
    /// Store with every one of `frame_count` frames unannotated
    pub fn new(frame_count: usize) -> Self {
        tracing::debug!("Initialising ground truth for {} frames", frame_count);
        Self {
            records: vec![AnnotationRecord::UNANNOTATED; frame_count],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<&AnnotationRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn annotated_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_annotated()).count()
    }

    /// Indices of frames without an annotation
    pub fn missing(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_annotated())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.records.iter().all(AnnotationRecord::is_annotated)
    }

    fn slot(&mut self, index: usize) -> Result<&mut AnnotationRecord, StoreError> {
        let len = self.records.len();
        self.records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }

    /// Record `horizon` as the ground truth of frame `index`
    pub fn validate(&mut self, index: usize, horizon: &HorizonLine) -> Result<(), StoreError> {
        let record = AnnotationRecord::from_horizon(horizon);
        *self.slot(index)? = record;
        tracing::info!("Frame {} annotated: {}", index, record.summary());
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<(), StoreError> {
        *self.slot(index)? = AnnotationRecord::UNANNOTATED;
        tracing::info!("Frame {} annotation deleted", index);
        Ok(())
    }

    /// Copy the annotation of frame `index` into every earlier unannotated
    /// frame. Returns how many frames were filled.
    pub fn propagate_backward(&mut self, index: usize) -> Result<usize, StoreError> {
        let source = *self.slot(index)?;
        if !source.is_annotated() {
            return Err(StoreError::NoValidSourceForPropagation { index });
        }

        let mut filled = 0;
        for record in self.records[..index].iter_mut().filter(|r| !r.is_annotated()) {
            *record = source;
            filled += 1;
        }
        tracing::info!("Propagated frame {} annotation to {} earlier frames", index, filled);
        Ok(filled)
    }

    pub fn to_array(&self) -> Array2<f32> {
        Array2::from_shape_fn((self.records.len(), COLUMNS), |(row, col)| {
            self.records[row].to_row()[col]
        })
    }

    /// Persist every record to `path` as an `(N, 6)` `f4` array
    pub fn save(&self, path: &Path, policy: SavePolicy) -> Result<(), StoreError> {
        let missing = self.records.len() - self.annotated_count();
        if missing > 0 {
            if policy == SavePolicy::RequireComplete {
                return Err(StoreError::IncompleteAnnotation {
                    missing,
                    total: self.records.len(),
                });
            }
            tracing::warn!(
                "Saving with {} of {} frames unannotated",
                missing,
                self.records.len()
            );
        }

        npy::write_atomic(path, &self.to_array())?;
        tracing::info!("Saved {} records to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Replace every record with the contents of `path`.
    ///
    /// The file must hold exactly one row per frame; on any error the store
    /// is left as it was.
    pub fn load(&mut self, path: &Path) -> Result<(), StoreError> {
        let array = npy::read(path)?;
        let (rows, cols) = array.dim();
        if cols != COLUMNS {
            return Err(StoreError::FormatMismatch(format!(
                "expected {COLUMNS} columns, found {cols}"
            )));
        }
        if rows != self.records.len() {
            return Err(StoreError::FormatMismatch(format!(
                "expected {} rows (one per frame), found {rows}",
                self.records.len()
            )));
        }

        let records = array
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let row: Vec<f32> = row.iter().copied().collect();
                AnnotationRecord::from_row(&row).ok_or_else(|| {
                    StoreError::FormatMismatch(format!("row {i} mixes NaN and finite values"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.records = records;
        tracing::info!(
            "Loaded {} records ({} annotated) from {}",
            rows,
            self.annotated_count(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use ndarray_npy::WriteNpyExt;

    use super::{AnnotationRecord, GroundTruthStore, SavePolicy, StoreError};
    use crate::geometry::Point;
    use crate::horizon::{fit_horizon, Endpoints, HorizonLine, Segment};

    fn horizon(ys: i32, ye: i32) -> HorizonLine {
        let endpoints = Endpoints::new(Point::new(100, ys), Point::new(1800, ye));
        let segment = Segment {
            scaled: endpoints,
            original: endpoints,
        };
        fit_horizon(&segment, 1920, 1920).expect("fits")
    }

    fn same_bits(a: &AnnotationRecord, b: &AnnotationRecord) -> bool {
        a.to_row()
            .iter()
            .zip(b.to_row().iter())
            .all(|(x, y)| x.to_bits() == y.to_bits())
    }

    #[test]
    fn new_store_is_unannotated() {
        let store = GroundTruthStore::new(200);
        assert_eq!(store.len(), 200);
        assert_eq!(store.annotated_count(), 0);
        assert_eq!(store.missing().len(), 200);
        assert!(store.records().iter().all(|r| same_bits(r, &AnnotationRecord::UNANNOTATED)));
    }

    #[test]
    fn validate_stores_full_width_endpoints() {
        let mut store = GroundTruthStore::new(10);
        store.validate(5, &horizon(500, 520)).expect("validate");

        let record = store.record(5).expect("record");
        assert!(record.is_annotated());
        assert!((record.y - 510.1).abs() < 0.05);
        assert!((record.alpha + 0.674).abs() < 1e-3);
        assert_eq!(
            (record.x_start, record.y_start, record.x_end, record.y_end),
            (0, 498, 1919, 521)
        );
        assert_eq!(record.summary(), "Y = 510.11 pixs, Alpha = -0.67 °");

        // validating again overwrites
        store.validate(5, &horizon(300, 300)).expect("validate");
        assert_eq!(store.record(5).expect("record").y, 300.0);
    }

    #[test]
    fn delete_then_propagate_is_noop() {
        let mut store = GroundTruthStore::new(10);
        store.validate(5, &horizon(500, 520)).expect("validate");
        store.delete(5).expect("delete");

        let record = store.record(5).expect("record");
        assert!(same_bits(record, &AnnotationRecord::UNANNOTATED));

        let before = store.clone();
        let result = store.propagate_backward(5);
        assert!(matches!(
            result,
            Err(StoreError::NoValidSourceForPropagation { index: 5 })
        ));
        assert!(store
            .records()
            .iter()
            .zip(before.records())
            .all(|(a, b)| same_bits(a, b)));
    }

    #[test]
    fn propagate_fills_only_earlier_gaps() {
        let mut store = GroundTruthStore::new(8);
        store.validate(2, &horizon(100, 100)).expect("validate");
        store.validate(6, &horizon(400, 420)).expect("validate");

        let filled = store.propagate_backward(6).expect("propagate");
        assert_eq!(filled, 5);

        let source = *store.record(6).expect("record");
        for i in [0, 1, 3, 4, 5] {
            assert_eq!(store.record(i), Some(&source));
        }
        assert_eq!(store.record(2).expect("record").y, 100.0);
        assert!(!store.record(7).expect("record").is_annotated());
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut store = GroundTruthStore::new(3);
        assert!(matches!(
            store.delete(3),
            Err(StoreError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn incomplete_save_needs_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("clip_LineGT.npy");
        let store = GroundTruthStore::new(200);

        let result = store.save(&path, SavePolicy::RequireComplete);
        assert!(matches!(
            result,
            Err(StoreError::IncompleteAnnotation {
                missing: 200,
                total: 200
            })
        ));
        assert!(!path.exists());

        store
            .save(&path, SavePolicy::AllowIncomplete)
            .expect("confirmed save");
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_is_bit_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gt.npy");

        let mut store = GroundTruthStore::new(6);
        store.validate(1, &horizon(500, 520)).expect("validate");
        store.validate(4, &horizon(37, 12)).expect("validate");
        store.save(&path, SavePolicy::AllowIncomplete).expect("save");

        let mut reloaded = GroundTruthStore::new(6);
        reloaded.load(&path).expect("load");
        for (a, b) in store.records().iter().zip(reloaded.records()) {
            assert!(same_bits(a, b), "{a:?} != {b:?}");
        }
    }

    #[test]
    fn complete_store_saves_without_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gt.npy");

        let mut store = GroundTruthStore::new(3);
        store.validate(2, &horizon(10, 12)).expect("validate");
        store.propagate_backward(2).expect("propagate");
        assert!(store.is_complete());
        store.save(&path, SavePolicy::RequireComplete).expect("save");
    }

    #[test]
    fn load_rejects_wrong_row_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gt.npy");
        GroundTruthStore::new(5)
            .save(&path, SavePolicy::AllowIncomplete)
            .expect("save");

        let mut store = GroundTruthStore::new(4);
        store.validate(0, &horizon(10, 10)).expect("validate");
        assert!(matches!(
            store.load(&path),
            Err(StoreError::FormatMismatch(_))
        ));
        // untouched on failure
        assert!(store.record(0).expect("record").is_annotated());
    }

    #[test]
    fn load_rejects_wrong_column_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gt.npy");
        let file = std::fs::File::create(&path).expect("create");
        Array2::<f32>::zeros((4, 2)).write_npy(file).expect("write");

        let mut store = GroundTruthStore::new(4);
        assert!(matches!(
            store.load(&path),
            Err(StoreError::FormatMismatch(_))
        ));
    }

    #[test]
    fn load_rejects_mixed_rows_and_wrong_dtype() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mixed = dir.path().join("mixed.npy");
        let mut array = Array2::<f32>::zeros((2, 6));
        array[[0, 0]] = f32::NAN;
        array
            .write_npy(std::fs::File::create(&mixed).expect("create"))
            .expect("write");

        let wide = dir.path().join("f8.npy");
        Array2::<f64>::zeros((2, 6))
            .write_npy(std::fs::File::create(&wide).expect("create"))
            .expect("write");

        let mut store = GroundTruthStore::new(2);
        assert!(matches!(store.load(&mixed), Err(StoreError::FormatMismatch(_))));
        assert!(matches!(store.load(&wide), Err(StoreError::FormatMismatch(_))));
    }
}

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use ndarray_npy::{ReadNpyError, ReadNpyExt, WriteNpyExt};
use tempfile::NamedTempFile;

use super::StoreError;

/// Write `array` as `.npy` next to `path` and atomically move it into place
pub fn write_atomic(path: &Path, array: &Array2<f32>) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        array.write_npy(&mut writer)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

/// Read a 2-D `f4` array. Anything else is a format mismatch.
pub fn read(path: &Path) -> Result<Array2<f32>, StoreError> {
    let file = File::open(path)?;
    Array2::<f32>::read_npy(BufReader::new(file)).map_err(|err| match err {
        ReadNpyError::Io(err) => StoreError::Io(err),
        other => StoreError::FormatMismatch(other.to_string()),
    })
}

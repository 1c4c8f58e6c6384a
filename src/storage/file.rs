//! Crash-safe file replacement.

use std::fs::File;
use std::path::Path;

use crate::error::{LexidxError, Result};

/// Write a file by filling a temporary sibling and renaming it over `path`.
///
/// Readers only ever observe the previous file or the complete new one. A
/// failure anywhere leaves `path` untouched and removes the temporary file.
/// Every failure is reported as [`LexidxError::IndexWrite`].
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".lexidx-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| {
            LexidxError::index_write(format!("cannot create temp file in {}: {}", dir.display(), e))
        })?;

    write(tmp.as_file_mut())
        .map_err(|e| LexidxError::index_write(format!("cannot write {}: {}", path.display(), e)))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| LexidxError::index_write(format!("cannot sync {}: {}", path.display(), e)))?;
    tmp.persist(path).map_err(|e| {
        LexidxError::index_write(format!("cannot rename into {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

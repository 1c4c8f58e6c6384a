//! Read-only content blobs that entry references point into.

use std::fmt::Debug;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{LexidxError, Result};

/// Random access to the definition bytes of a dictionary.
pub trait ContentBlob: Send + Sync + Debug {
    /// Total size in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `length` bytes starting at `offset`.
    fn read(&self, offset: u64, length: u32) -> Result<&[u8]>;
}

/// Bounds-checked sub-slice shared by the blob implementations.
fn slice_range(data: &[u8], offset: u64, length: u32) -> Result<&[u8]> {
    let end = offset.checked_add(length as u64);
    match end {
        Some(end) if end <= data.len() as u64 => Ok(&data[offset as usize..end as usize]),
        _ => Err(LexidxError::invalid_argument(format!(
            "entry {}+{} out of bounds (blob len {})",
            offset,
            length,
            data.len()
        ))),
    }
}

/// A file mapped into memory.
#[derive(Debug)]
pub struct MmapBlob {
    path: PathBuf,
    /// `None` for an empty file, which cannot be mapped.
    map: Option<Mmap>,
}

impl MmapBlob {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            LexidxError::source_unavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        let len = file.metadata()?.len();

        let map = if len == 0 {
            None
        } else {
            // The source is treated as immutable while mapped.
            let map = unsafe { Mmap::map(&file) }.map_err(|e| {
                LexidxError::source_unavailable(format!("cannot map {}: {}", path.display(), e))
            })?;
            Some(map)
        };

        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }
}

impl ContentBlob for MmapBlob {
    fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    fn read(&self, offset: u64, length: u32) -> Result<&[u8]> {
        slice_range(self.as_bytes(), offset, length)
    }
}

/// A blob held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlob {
    data: Vec<u8>,
}

impl MemoryBlob {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl ContentBlob for MemoryBlob {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read(&self, offset: u64, length: u32) -> Result<&[u8]> {
        slice_range(&self.data, offset, length)
    }
}

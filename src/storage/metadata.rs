//! File metadata lookups used for cache invalidation.

use std::fmt::Debug;
use std::path::Path;
use std::time::SystemTime;

/// Existence and modification-time queries.
///
/// The cache manager only talks to the file system through this trait, so
/// tests can drive its decisions with fixed timestamps.
pub trait FileMetadata: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;

    /// Last modification time, or `None` if the file is missing or the
    /// platform does not report one.
    fn modified(&self, path: &Path) -> Option<SystemTime>;
}

/// [`FileMetadata`] backed by the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMetadata;

impl FileMetadata for FsMetadata {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }
}

//! File-system facing pieces: content blobs, metadata lookups and atomic writes.

pub mod blob;
pub mod file;
pub mod metadata;

pub use blob::{ContentBlob, MemoryBlob, MmapBlob};
pub use file::write_atomic;
pub use metadata::{FileMetadata, FsMetadata};

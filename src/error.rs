//! Error types for the lexical index engine.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants follow
//! the failure classes the engine distinguishes at runtime:
//!
//! - [`LexidxError::SourceUnavailable`]: the dictionary source cannot be opened.
//!   Fatal to enabling that dictionary.
//! - [`LexidxError::IndexFormat`]: a persisted index is corrupt, truncated or was
//!   written by another format version or normalization profile. Recovered by
//!   rebuilding.
//! - [`LexidxError::IndexWrite`]: a rebuilt index could not be persisted. The
//!   in-memory index stays usable.
//! - [`LexidxError::NormalizationStage`]: a conversion or stemming backend failed.
//!   The stage degrades to a pass-through.

use thiserror::Error;

/// The error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum LexidxError {
    /// An I/O error that does not belong to a more specific class.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The dictionary source file is missing or unreadable.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// The persisted index is corrupt, truncated or incompatible.
    #[error("Index format error: {0}")]
    IndexFormat(String),

    /// The rebuilt index could not be written to disk.
    #[error("Index write error: {0}")]
    IndexWrite(String),

    /// A normalization backend failed to initialize or to process input.
    #[error("Normalization stage error: {0}")]
    NormalizationStage(String),

    /// The index cannot address any more nodes.
    #[error("Index full: {0}")]
    IndexFull(String),

    /// An argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl LexidxError {
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        LexidxError::SourceUnavailable(msg.into())
    }

    pub fn index_format(msg: impl Into<String>) -> Self {
        LexidxError::IndexFormat(msg.into())
    }

    pub fn index_write(msg: impl Into<String>) -> Self {
        LexidxError::IndexWrite(msg.into())
    }

    pub fn normalization_stage(msg: impl Into<String>) -> Self {
        LexidxError::NormalizationStage(msg.into())
    }

    pub fn index_full(msg: impl Into<String>) -> Self {
        LexidxError::IndexFull(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        LexidxError::InvalidArgument(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        LexidxError::Other(msg.into())
    }

    /// Whether a failed index load may be retried by rebuilding from source.
    pub fn is_recoverable_by_rebuild(&self) -> bool {
        matches!(self, LexidxError::IndexFormat(_) | LexidxError::Io(_))
    }
}

/// Result type alias using [`LexidxError`].
pub type Result<T> = std::result::Result<T, LexidxError>;

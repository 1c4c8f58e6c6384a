//! # lexidx
//!
//! A persistent lexical index for dictionary headword lookup.
//!
//! Headwords are normalized (script conversion, accent stripping, case
//! folding) and stored in a trie that maps each key to byte ranges inside the
//! dictionary's read-only content blob. The trie is persisted next to its
//! source and reused for as long as it is at least as new as the source.
//!
//! ## Features
//!
//! - Arena-based trie with exact-match lookup and code point ordered iteration
//! - Checksummed binary index format with atomic writes
//! - Timestamp-driven cache invalidation with rebuild on corruption
//! - Runtime-configurable normalization pipeline with query-time stemming
//! - Multiple dictionaries queried in parallel
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lexidx::{Dictionary, Normalizer, PlainTextFormat, StageConfig};
//!
//! let stages = StageConfig { accent_stripping: true, ..StageConfig::none() };
//! let dict = Dictionary::new("en", Arc::new(PlainTextFormat), Arc::new(Normalizer::new(stages)));
//!
//! if dict.enable("/usr/share/dict/en.tsv") {
//!     for result in dict.query("café") {
//!         println!("{}: {}", result.query_text, result.result_text);
//!     }
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod lexical;
pub mod source;
pub mod storage;
mod util;

pub use analysis::{Normalizer, ScriptConverter, Stemmer, TableConverter};
pub use config::{DictionaryConfig, EngineConfig, StageConfig, StemmerAlgorithm, StemmerConfig};
pub use dictionary::{
    CacheOutcome, DictRegistry, Dictionary, DictionaryState, DictionaryStats, EnableEvent, QueryResult,
    ResultKind,
};
pub use error::{LexidxError, Result};
pub use lexical::{EntryRef, IndexBuilder, IndexStats, LexicalIndex};
pub use source::{DictionarySource, MemorySource, PlainTextFormat, SourceFormat, SourceRecord};
pub use storage::{ContentBlob, FileMetadata, FsMetadata};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

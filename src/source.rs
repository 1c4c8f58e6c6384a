//! Collaborator interfaces for dictionary sources.
//!
//! A source is anything that yields `(headword, offset, length)` records plus
//! the read-only content blob those ranges point into. Container formats plug
//! in through [`SourceFormat`]; [`plain::PlainTextFormat`] is the built-in one.

pub mod plain;

use std::fmt::Debug;
use std::path::Path;

use crate::error::Result;
use crate::lexical::entry::EntryRef;
use crate::storage::blob::{ContentBlob, MemoryBlob};

pub use plain::{PlainTextFormat, PlainTextSource};

/// One raw record of a dictionary source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// The headword as it appears in the source, before normalization.
    pub headword: String,
    pub entry: EntryRef,
}

impl SourceRecord {
    pub fn new(headword: impl Into<String>, offset: u64, length: u32) -> Self {
        Self {
            headword: headword.into(),
            entry: EntryRef::new(offset, length),
        }
    }
}

/// An opened dictionary source.
pub trait DictionarySource: Send + Sync + Debug {
    /// Stream the source records. Each call starts from the beginning.
    fn records(&self) -> Box<dyn Iterator<Item = Result<SourceRecord>> + '_>;

    /// The blob that record entries refer to.
    fn content(&self) -> &dyn ContentBlob;

    /// Whether the source promises ascending headword order.
    fn is_sorted(&self) -> bool {
        false
    }
}

/// Opens files of one container format.
pub trait SourceFormat: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Open `path`. A missing or unreadable file is
    /// [`LexidxError::SourceUnavailable`](crate::error::LexidxError::SourceUnavailable).
    fn open(&self, path: &Path) -> Result<Box<dyn DictionarySource>>;
}

/// A source held in memory, built from headword/definition pairs.
///
/// Definitions are concatenated into one blob in the given order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<SourceRecord>,
    blob: MemoryBlob,
    sorted: bool,
}

impl MemorySource {
    pub fn from_pairs<I, H, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (H, D)>,
        H: Into<String>,
        D: AsRef<str>,
    {
        let mut data = Vec::new();
        let mut records = Vec::new();
        for (headword, definition) in pairs {
            let definition = definition.as_ref().as_bytes();
            records.push(SourceRecord::new(
                headword,
                data.len() as u64,
                definition.len() as u32,
            ));
            data.extend_from_slice(definition);
        }
        Self {
            records,
            blob: MemoryBlob::new(data),
            sorted: false,
        }
    }

    pub fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    pub fn blob(&self) -> &MemoryBlob {
        &self.blob
    }
}

impl DictionarySource for MemorySource {
    fn records(&self) -> Box<dyn Iterator<Item = Result<SourceRecord>> + '_> {
        Box::new(self.records.iter().cloned().map(Ok))
    }

    fn content(&self) -> &dyn ContentBlob {
        &self.blob
    }

    fn is_sorted(&self) -> bool {
        self.sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_ranges() {
        let source = MemorySource::from_pairs([("apple", "a fruit"), ("pear", "another")]);
        let records: Vec<_> = source.records().map(|r| r.unwrap()).collect();

        assert_eq!(records[0], SourceRecord::new("apple", 0, 7));
        assert_eq!(records[1], SourceRecord::new("pear", 7, 7));
        assert_eq!(source.content().read(7, 7).unwrap(), b"another");
        assert!(!source.is_sorted());
    }
}

//! Tab-separated plain-text dictionaries.
//!
//! Each non-blank line is `headword<TAB>definition`. Lines starting with `#`
//! are comments. The file itself serves as the content blob: a record's entry
//! is the byte range of its definition, excluding the line terminator.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{LexidxError, Result};
use crate::source::{DictionarySource, SourceFormat, SourceRecord};
use crate::storage::blob::{ContentBlob, MmapBlob};

/// [`SourceFormat`] for tab-separated text files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextFormat;

impl SourceFormat for PlainTextFormat {
    fn name(&self) -> &str {
        "plain"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn DictionarySource>> {
        Ok(Box::new(PlainTextSource::open(path)?))
    }
}

/// A memory-mapped plain-text dictionary.
#[derive(Debug)]
pub struct PlainTextSource {
    path: PathBuf,
    blob: MmapBlob,
}

impl PlainTextSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let blob = MmapBlob::open(path)?;
        debug!("opened {} ({} bytes)", path.display(), blob.len());
        Ok(Self {
            path: path.to_path_buf(),
            blob,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DictionarySource for PlainTextSource {
    fn records(&self) -> Box<dyn Iterator<Item = Result<SourceRecord>> + '_> {
        Box::new(Records {
            data: self.blob.as_bytes(),
            pos: 0,
            line: 0,
        })
    }

    fn content(&self) -> &dyn ContentBlob {
        &self.blob
    }
}

struct Records<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

impl Records<'_> {
    fn parse(&self, start: usize, line: &[u8]) -> Result<SourceRecord> {
        let tab = line.iter().position(|&b| b == b'\t').ok_or_else(|| {
            LexidxError::source_unavailable(format!("line {}: missing tab separator", self.line))
        })?;
        let headword = std::str::from_utf8(&line[..tab]).map_err(|e| {
            LexidxError::source_unavailable(format!("line {}: headword is not UTF-8: {}", self.line, e))
        })?;
        let length = u32::try_from(line.len() - tab - 1).map_err(|_| {
            LexidxError::source_unavailable(format!("line {}: definition too long", self.line))
        })?;
        Ok(SourceRecord::new(headword, (start + tab + 1) as u64, length))
    }
}

impl Iterator for Records<'_> {
    type Item = Result<SourceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.data.len() {
            let start = self.pos;
            let rest = &self.data[start..];
            let end = match rest.iter().position(|&b| b == b'\n') {
                Some(n) => {
                    self.pos = start + n + 1;
                    start + n
                }
                None => {
                    self.pos = self.data.len();
                    self.data.len()
                }
            };
            self.line += 1;

            let mut line = &self.data[start..end];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            if line.iter().all(u8::is_ascii_whitespace) || line.starts_with(b"#") {
                continue;
            }
            return Some(self.parse(start, line));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn open(contents: &str) -> (tempfile::TempDir, PlainTextSource) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.tsv");
        fs::write(&path, contents).unwrap();
        let source = PlainTextSource::open(&path).unwrap();
        (dir, source)
    }

    #[test]
    fn test_records_point_at_definitions() {
        let (_dir, source) = open("# comment\napple\ta fruit\r\n\nPear\ta pome\n");
        let records: Vec<_> = source.records().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].headword, "apple");
        assert_eq!(records[1].headword, "Pear");

        let blob = source.content();
        let first = records[0].entry;
        assert_eq!(blob.read(first.offset, first.length).unwrap(), b"a fruit");
        let second = records[1].entry;
        assert_eq!(blob.read(second.offset, second.length).unwrap(), b"a pome");
    }

    #[test]
    fn test_last_line_without_newline() {
        let (_dir, source) = open("a\tx\nb\tyz");
        let records: Vec<_> = source.records().map(|r| r.unwrap()).collect();
        assert_eq!(records[1], SourceRecord::new("b", 6, 2));
    }

    #[test]
    fn test_missing_tab_is_an_error() {
        let (_dir, source) = open("apple\tfruit\nbroken line\n");
        let results: Vec<_> = source.records().collect();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(LexidxError::SourceUnavailable(_))));
    }

    #[test]
    fn test_empty_file_has_no_records() {
        let (_dir, source) = open("");
        assert_eq!(source.records().count(), 0);
    }

    #[test]
    fn test_format_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = PlainTextFormat.open(&dir.path().join("none.tsv")).unwrap_err();
        assert!(matches!(err, LexidxError::SourceUnavailable(_)));
    }
}

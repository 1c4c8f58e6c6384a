//! Bulk construction of a [`LexicalIndex`] from source records.

use std::path::Path;
use std::time::Instant;

use log::{debug, warn};
use serde::Serialize;

use crate::analysis::normalizer::Normalizer;
use crate::error::Result;
use crate::lexical::codec;
use crate::lexical::entry::EntryRef;
use crate::lexical::index::LexicalIndex;
use crate::source::SourceRecord;

/// Figures collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Records read from the source.
    pub records: usize,
    /// Records whose headword normalized to an empty key.
    pub skipped: usize,
    /// Whether keys were buffered and sorted before insertion.
    pub sorted: bool,
    pub keys: usize,
    pub nodes: usize,
    /// Whether the index reached disk; only set by
    /// [`IndexBuilder::build_and_persist`].
    pub persisted: bool,
}

/// Normalizes headwords and inserts them into a fresh index.
///
/// Keys are sorted before insertion unless the source is declared sorted and
/// no configured stage can reorder keys. The sort is stable, so records that
/// share a key keep their source order.
#[derive(Debug)]
pub struct IndexBuilder<'a> {
    normalizer: &'a Normalizer,
    pre_sorted: bool,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(normalizer: &'a Normalizer) -> Self {
        Self {
            normalizer,
            pre_sorted: false,
        }
    }

    /// Declare that the source yields headwords in ascending order.
    pub fn pre_sorted(mut self, pre_sorted: bool) -> Self {
        self.pre_sorted = pre_sorted;
        self
    }

    pub fn needs_sort(&self) -> bool {
        self.normalizer.reorders_keys() || !self.pre_sorted
    }

    /// Build an index in memory.
    ///
    /// The first record error aborts the build.
    pub fn build<I>(&self, records: I) -> Result<(LexicalIndex, BuildStats)>
    where
        I: IntoIterator<Item = Result<SourceRecord>>,
    {
        let start = Instant::now();
        let sort = self.needs_sort();
        let mut index = LexicalIndex::new();
        let mut stats = BuildStats {
            sorted: sort,
            ..BuildStats::default()
        };

        if sort {
            let mut pending: Vec<(String, EntryRef)> = Vec::new();
            for record in records {
                if let Some(pair) = self.prepare(record?, &mut stats) {
                    pending.push(pair);
                }
            }
            pending.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, entry) in pending {
                index.insert(&key, entry)?;
            }
        } else {
            for record in records {
                if let Some((key, entry)) = self.prepare(record?, &mut stats) {
                    index.insert(&key, entry)?;
                }
            }
        }

        stats.keys = index.key_count();
        stats.nodes = index.node_count();
        debug!(
            "built index: {} records, {} keys, {} nodes, sorted={} in {:?}",
            stats.records,
            stats.keys,
            stats.nodes,
            stats.sorted,
            start.elapsed()
        );
        Ok((index, stats))
    }

    /// Build an index and write it to `path`.
    ///
    /// A failed write is logged and reported through
    /// [`BuildStats::persisted`]; the in-memory index is still returned.
    pub fn build_and_persist<I>(&self, records: I, path: &Path) -> Result<(LexicalIndex, BuildStats)>
    where
        I: IntoIterator<Item = Result<SourceRecord>>,
    {
        let (index, mut stats) = self.build(records)?;
        match codec::write_index_file(&index, path, self.normalizer.profile()) {
            Ok(()) => stats.persisted = true,
            Err(e) => warn!("index kept in memory only: {}", e),
        }
        Ok((index, stats))
    }

    fn prepare(&self, record: SourceRecord, stats: &mut BuildStats) -> Option<(String, EntryRef)> {
        stats.records += 1;
        let key = self.normalizer.normalize_key(&record.headword);
        if key.is_empty() {
            stats.skipped += 1;
            debug!("skipping empty headword {:?}", record.headword);
            return None;
        }
        Some((key, record.entry))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::config::StageConfig;
    use crate::error::LexidxError;

    fn records(pairs: &[(&str, u64)]) -> Vec<Result<SourceRecord>> {
        pairs
            .iter()
            .map(|&(h, off)| Ok(SourceRecord::new(h, off, 1)))
            .collect()
    }

    #[test]
    fn test_sort_decision() {
        let plain = Normalizer::new(StageConfig::none());
        assert!(IndexBuilder::new(&plain).needs_sort());
        assert!(!IndexBuilder::new(&plain).pre_sorted(true).needs_sort());

        let accents = Normalizer::new(StageConfig { accent_stripping: true, ..StageConfig::none() });
        assert!(IndexBuilder::new(&accents).pre_sorted(true).needs_sort());
    }

    #[test]
    fn test_collisions_keep_source_order() {
        let n = Normalizer::new(StageConfig { case_folding: true, ..StageConfig::none() });
        let (index, stats) = IndexBuilder::new(&n)
            .build(records(&[("Polish", 0), ("apple", 5), ("polish", 10)]))
            .unwrap();

        assert!(stats.sorted);
        assert_eq!(stats.records, 3);
        assert_eq!(stats.keys, 2);
        assert_eq!(
            index.lookup("polish"),
            Some(&[EntryRef::new(0, 1), EntryRef::new(10, 1)][..])
        );
    }

    #[test]
    fn test_empty_headwords_are_skipped() {
        let n = Normalizer::new(StageConfig::none());
        let (index, stats) = IndexBuilder::new(&n)
            .build(records(&[("   ", 0), ("pear", 1)]))
            .unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(index.key_count(), 1);
        assert!(!index.contains_key(""));
    }

    #[test]
    fn test_sorted_and_unsorted_builds_agree() {
        let n = Normalizer::new(StageConfig::none());
        let input = [("a", 0), ("ab", 1), ("b", 2), ("ba", 3)];
        let (direct, direct_stats) = IndexBuilder::new(&n).pre_sorted(true).build(records(&input)).unwrap();
        let (sorted, _) = IndexBuilder::new(&n).build(records(&input)).unwrap();

        assert!(!direct_stats.sorted);
        assert_eq!(direct.iter().collect::<Vec<_>>(), sorted.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_record_error_aborts_build() {
        let n = Normalizer::new(StageConfig::none());
        let input = vec![
            Ok(SourceRecord::new("a", 0, 1)),
            Err(LexidxError::source_unavailable("line 2: missing tab separator")),
        ];
        assert!(IndexBuilder::new(&n).build(input).is_err());
    }

    #[test]
    fn test_persist_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("dict.index");
        let n = Normalizer::new(StageConfig::none());

        let (index, stats) = IndexBuilder::new(&n)
            .build_and_persist(records(&[("apple", 0)]), &path)
            .unwrap();
        assert!(!stats.persisted);
        assert!(index.contains_key("apple"));
        assert!(!path.exists());
    }

    #[test]
    fn test_persisted_index_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dict.index");
        let n = Normalizer::new(StageConfig::none());

        let (index, stats) = IndexBuilder::new(&n)
            .build_and_persist(records(&[("apple", 0), ("apple", 9)]), &path)
            .unwrap();
        assert!(stats.persisted);

        let (loaded, header) = codec::read_index_file(&path).unwrap();
        assert_eq!(header.profile, 0);
        assert_eq!(loaded.lookup("apple"), index.lookup("apple"));
    }
}

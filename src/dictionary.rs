//! A dictionary: one source file, its lexical index and the enable/disable
//! lifecycle around them.
//!
//! ```text
//! Unloaded --enable(path)--> Loaded --disable() / enable(other)--> Unloaded
//! ```
//!
//! Transitions hold the write side of the dictionary's lock, so a query never
//! observes a half-built or half-cleared index: [`Dictionary::query`] waits
//! until the transition has settled, [`Dictionary::try_query`] gives up
//! instead.

pub mod cache;
pub mod query;
pub mod registry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info};
use parking_lot::RwLock;
use serde::Serialize;

use crate::analysis::normalizer::Normalizer;
use crate::config::{DEFAULT_INDEX_SUFFIX, DictionaryConfig, EngineConfig};
use crate::error::Result;
use crate::lexical::entry::EntryRef;
use crate::lexical::index::{IndexStats, LexicalIndex};
use crate::source::{DictionarySource, PlainTextFormat, SourceFormat};
use crate::storage::metadata::{FileMetadata, FsMetadata};

pub use cache::{CacheOutcome, CachePlan, IndexCache, index_path_for};
pub use query::{QueryEngine, QueryResult, ResultKind};
pub use registry::{DictRegistry, EnableEvent};

/// Lifecycle state of a [`Dictionary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryState {
    Unloaded,
    Loaded,
}

/// Snapshot of a dictionary for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryStats {
    pub name: String,
    pub state: DictionaryState,
    pub source: Option<PathBuf>,
    pub outcome: Option<CacheOutcome>,
    pub index: Option<IndexStats>,
}

#[derive(Debug)]
struct Loaded {
    source_path: PathBuf,
    source: Box<dyn DictionarySource>,
    index: LexicalIndex,
    outcome: CacheOutcome,
}

#[derive(Debug)]
pub struct Dictionary {
    name: String,
    format: Arc<dyn SourceFormat>,
    normalizer: Arc<Normalizer>,
    metadata: Arc<dyn FileMetadata>,
    index_suffix: String,
    sorted: bool,
    loaded: RwLock<Option<Loaded>>,
}

impl Dictionary {
    pub fn new(name: impl Into<String>, format: Arc<dyn SourceFormat>, normalizer: Arc<Normalizer>) -> Self {
        Self {
            name: name.into(),
            format,
            normalizer,
            metadata: Arc::new(FsMetadata),
            index_suffix: DEFAULT_INDEX_SUFFIX.to_string(),
            sorted: false,
            loaded: RwLock::new(None),
        }
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn FileMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_index_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.index_suffix = suffix.into();
        self
    }

    /// Declare that sources of this dictionary list headwords in order.
    pub fn with_sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// A plain-text dictionary described by `dict`, sharing `normalizer`.
    pub fn from_config(dict: &DictionaryConfig, engine: &EngineConfig, normalizer: Arc<Normalizer>) -> Self {
        Self::new(dict.name.clone(), Arc::new(PlainTextFormat), normalizer)
            .with_index_suffix(engine.index_suffix.clone())
            .with_sorted(dict.sorted)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Load or build the index for `path`; `false` if the dictionary could
    /// not be enabled. Failures are logged.
    pub fn enable(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.try_enable(path) {
            Ok(outcome) => {
                info!("dict {}: enabled {} ({:?})", self.name, path.display(), outcome);
                true
            }
            Err(e) => {
                error!("dict {}: cannot enable {}: {}", self.name, path.display(), e);
                false
            }
        }
    }

    /// Like [`enable`](Self::enable) but returns the error.
    ///
    /// Enabling the source that is already loaded is a no-op while its index
    /// is current. Any other enable first unloads the current source.
    pub fn try_enable(&self, path: impl AsRef<Path>) -> Result<CacheOutcome> {
        let path = path.as_ref();
        let mut slot = self.loaded.write();
        let cache = IndexCache::new(&self.name, path, &self.index_suffix, self.metadata.as_ref());

        if let Some(current) = slot.as_ref()
            && current.source_path == path
            && matches!(cache.plan(), Ok(CachePlan::Load))
        {
            return Ok(CacheOutcome::Unchanged);
        }

        if let Some(previous) = slot.take() {
            Self::release(&self.name, previous);
        }

        let plan = cache.plan()?;
        let source = self.format.open(path)?;
        let (index, outcome) = cache.run(plan, source.as_ref(), &self.normalizer, self.sorted)?;

        *slot = Some(Loaded {
            source_path: path.to_path_buf(),
            source,
            index,
            outcome,
        });
        Ok(outcome)
    }

    /// Drop the index and close the source. Does nothing when unloaded.
    pub fn disable(&self) {
        if let Some(previous) = self.loaded.write().take() {
            Self::release(&self.name, previous);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.read().is_some()
    }

    pub fn state(&self) -> DictionaryState {
        if self.is_loaded() {
            DictionaryState::Loaded
        } else {
            DictionaryState::Unloaded
        }
    }

    pub fn source_path(&self) -> Option<PathBuf> {
        self.loaded.read().as_ref().map(|l| l.source_path.clone())
    }

    pub fn stats(&self) -> DictionaryStats {
        let guard = self.loaded.read();
        DictionaryStats {
            name: self.name.clone(),
            state: if guard.is_some() {
                DictionaryState::Loaded
            } else {
                DictionaryState::Unloaded
            },
            source: guard.as_ref().map(|l| l.source_path.clone()),
            outcome: guard.as_ref().map(|l| l.outcome),
            index: guard.as_ref().map(|l| l.index.stats()),
        }
    }

    /// Look `text` up. An unloaded dictionary answers with no results.
    pub fn query(&self, text: &str) -> Vec<QueryResult> {
        let guard = self.loaded.read();
        let Some(loaded) = guard.as_ref() else {
            debug!("dict {}: query while unloaded", self.name);
            return Vec::new();
        };
        QueryEngine::new(&self.name, &self.normalizer, &loaded.index, loaded.source.content()).query(text)
    }

    /// Look `text` up without waiting on an enable or disable in progress.
    ///
    /// `None` while a transition holds the dictionary; an unloaded dictionary
    /// answers `Some` with no results.
    pub fn try_query(&self, text: &str) -> Option<Vec<QueryResult>> {
        let guard = self.loaded.try_read()?;
        let Some(loaded) = guard.as_ref() else {
            return Some(Vec::new());
        };
        Some(QueryEngine::new(&self.name, &self.normalizer, &loaded.index, loaded.source.content()).query(text))
    }

    /// Visit every `(key, entries)` pair of the loaded index in key order.
    pub fn for_each_key<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(&str, &[EntryRef]),
    {
        let guard = self.loaded.read();
        let Some(loaded) = guard.as_ref() else {
            return false;
        };
        for (key, entries) in loaded.index.iter() {
            visit(&key, entries);
        }
        true
    }

    fn release(name: &str, mut loaded: Loaded) {
        loaded.index.clear();
        info!("dict {}: unloaded {}", name, loaded.source_path.display());
    }
}

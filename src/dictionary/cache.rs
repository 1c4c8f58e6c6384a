//! Index cache manager: decides between loading a persisted index and
//! rebuilding it from the source.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::analysis::normalizer::Normalizer;
use crate::error::{LexidxError, Result};
use crate::lexical::builder::IndexBuilder;
use crate::lexical::codec;
use crate::lexical::index::LexicalIndex;
use crate::source::DictionarySource;
use crate::storage::metadata::FileMetadata;

/// Path of the persisted index for `source`: the source path plus `suffix`.
pub fn index_path_for(source: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(source.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

/// What enabling a source will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePlan {
    /// The index file is at least as new as the source.
    Load,
    /// The index file is missing or older than the source.
    Rebuild,
}

/// How a dictionary came to be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOutcome {
    Loaded,
    Rebuilt,
    /// The index file was unusable and has been rebuilt.
    RecoveredByRebuild,
    /// The same source was already loaded and still current.
    Unchanged,
}

/// Cache decisions for one source file.
#[derive(Debug)]
pub struct IndexCache<'a> {
    name: &'a str,
    source: &'a Path,
    index_path: PathBuf,
    metadata: &'a dyn FileMetadata,
}

impl<'a> IndexCache<'a> {
    pub fn new(name: &'a str, source: &'a Path, suffix: &str, metadata: &'a dyn FileMetadata) -> Self {
        Self {
            name,
            source,
            index_path: index_path_for(source, suffix),
            metadata,
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Rebuild iff the index is absent or strictly older than the source.
    ///
    /// A missing source is [`LexidxError::SourceUnavailable`]. When either
    /// timestamp is unavailable the index is rebuilt.
    pub fn plan(&self) -> Result<CachePlan> {
        if !self.metadata.exists(self.source) {
            return Err(LexidxError::source_unavailable(format!(
                "{} does not exist",
                self.source.display()
            )));
        }
        if !self.metadata.exists(&self.index_path) {
            return Ok(CachePlan::Rebuild);
        }

        let plan = match (
            self.metadata.modified(&self.index_path),
            self.metadata.modified(self.source),
        ) {
            (Some(index_time), Some(source_time)) if index_time >= source_time => CachePlan::Load,
            _ => CachePlan::Rebuild,
        };
        debug!("dict {}: cache plan for {}: {:?}", self.name, self.source.display(), plan);
        Ok(plan)
    }

    /// Carry out `plan` against an opened source.
    ///
    /// A load that fails with a recoverable error falls back to a rebuild.
    pub fn run(
        &self,
        plan: CachePlan,
        source: &dyn DictionarySource,
        normalizer: &Normalizer,
        sorted: bool,
    ) -> Result<(LexicalIndex, CacheOutcome)> {
        if plan == CachePlan::Load {
            match self.load(normalizer) {
                Ok(index) => return Ok((index, CacheOutcome::Loaded)),
                Err(e) if e.is_recoverable_by_rebuild() => {
                    warn!(
                        "dict {}: cannot use {}, rebuilding: {}",
                        self.name,
                        self.index_path.display(),
                        e
                    );
                    let index = self.rebuild(source, normalizer, sorted)?;
                    return Ok((index, CacheOutcome::RecoveredByRebuild));
                }
                Err(e) => return Err(e),
            }
        }
        let index = self.rebuild(source, normalizer, sorted)?;
        Ok((index, CacheOutcome::Rebuilt))
    }

    /// Read the persisted index, rejecting one built with other stages.
    pub fn load(&self, normalizer: &Normalizer) -> Result<LexicalIndex> {
        info!("dict {}: loading index {}", self.name, self.index_path.display());
        let (index, header) = codec::read_index_file(&self.index_path)?;
        let expected = normalizer.profile();
        if header.profile != expected {
            return Err(LexidxError::index_format(format!(
                "normalization profile {:#x} does not match {:#x}",
                header.profile, expected
            )));
        }
        Ok(index)
    }

    pub fn rebuild(
        &self,
        source: &dyn DictionarySource,
        normalizer: &Normalizer,
        sorted: bool,
    ) -> Result<LexicalIndex> {
        info!("dict {}: building index from {}", self.name, self.source.display());
        let (index, stats) = IndexBuilder::new(normalizer)
            .pre_sorted(sorted || source.is_sorted())
            .build_and_persist(source.records(), &self.index_path)?;
        info!(
            "dict {}: indexed {} records under {} keys (persisted: {})",
            self.name, stats.records, stats.keys, stats.persisted
        );
        Ok(index)
    }
}

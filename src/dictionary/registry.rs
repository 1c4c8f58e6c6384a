//! The set of dictionaries known to the host, queried together.

use std::path::PathBuf;
use std::sync::Arc;

use ahash::AHashMap;
use crossbeam_channel::{Receiver, bounded};
use log::{debug, info};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::normalizer::Normalizer;
use crate::config::EngineConfig;
use crate::dictionary::{Dictionary, QueryResult};
use crate::error::{LexidxError, Result};

/// Reported once a background enable has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnableEvent {
    pub name: String,
    pub source: PathBuf,
    pub enabled: bool,
}

#[derive(Debug, Default)]
struct Inner {
    dictionaries: Vec<Arc<Dictionary>>,
    by_name: AHashMap<String, usize>,
}

/// Dictionaries in registration order, addressable by name.
///
/// Dictionaries are independent of each other: enabling one never blocks
/// queries against another. A dictionary in the middle of an enable or
/// disable is left out of [`query`](Self::query) results.
#[derive(Debug, Default)]
pub struct DictRegistry {
    inner: RwLock<Inner>,
}

impl DictRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One plain-text dictionary per configured entry, all sharing a
    /// normalizer built from `config`. Nothing is enabled yet.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = Arc::new(Normalizer::from_config(config));
        let registry = Self::new();
        for dict in &config.dictionaries {
            registry.register(Dictionary::from_config(dict, config, normalizer.clone()))?;
        }
        Ok(registry)
    }

    /// Add a dictionary. Names must be unique.
    pub fn register(&self, dictionary: Dictionary) -> Result<Arc<Dictionary>> {
        let mut inner = self.inner.write();
        if inner.by_name.contains_key(dictionary.name()) {
            return Err(LexidxError::invalid_argument(format!(
                "dictionary '{}' is already registered",
                dictionary.name()
            )));
        }
        let dictionary = Arc::new(dictionary);
        let slot = inner.dictionaries.len();
        inner.by_name.insert(dictionary.name().to_string(), slot);
        inner.dictionaries.push(dictionary.clone());
        debug!("dict {}: registered", dictionary.name());
        Ok(dictionary)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Dictionary>> {
        let inner = self.inner.read();
        inner.by_name.get(name).map(|&i| inner.dictionaries[i].clone())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .dictionaries
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Query every loaded dictionary in parallel.
    ///
    /// Results are grouped by dictionary in registration order. Dictionaries
    /// that are mid-transition are skipped rather than waited on.
    pub fn query(&self, text: &str) -> Vec<QueryResult> {
        let dictionaries = self.snapshot();
        let per_dictionary: Vec<Vec<QueryResult>> = dictionaries
            .par_iter()
            .filter_map(|d| {
                let results = d.try_query(text);
                if results.is_none() {
                    debug!("dict {}: busy, skipped for query", d.name());
                }
                results
            })
            .collect();
        per_dictionary.into_iter().flatten().collect()
    }

    /// Enable `name` on a worker thread.
    ///
    /// The returned channel yields exactly one [`EnableEvent`].
    pub fn enable_in_background(&self, name: &str, source: impl Into<PathBuf>) -> Result<Receiver<EnableEvent>> {
        let dictionary = self
            .get(name)
            .ok_or_else(|| LexidxError::invalid_argument(format!("unknown dictionary '{}'", name)))?;
        let source = source.into();
        let (sender, receiver) = bounded(1);

        std::thread::Builder::new()
            .name(format!("lexidx-enable-{}", name))
            .spawn(move || {
                let enabled = dictionary.enable(&source);
                let event = EnableEvent {
                    name: dictionary.name().to_string(),
                    source,
                    enabled,
                };
                if sender.send(event).is_err() {
                    debug!("dict {}: enable result dropped", dictionary.name());
                }
            })?;
        Ok(receiver)
    }

    /// Enable every dictionary marked `enabled` in `config`, in parallel.
    ///
    /// Entries not registered here are reported as not enabled.
    pub fn enable_configured(&self, config: &EngineConfig) -> Vec<EnableEvent> {
        let events: Vec<EnableEvent> = config
            .dictionaries
            .par_iter()
            .filter(|d| d.enabled)
            .map(|d| EnableEvent {
                name: d.name.clone(),
                source: d.source.clone(),
                enabled: self.get(&d.name).is_some_and(|dict| dict.enable(&d.source)),
            })
            .collect();
        let ready = events.iter().filter(|e| e.enabled).count();
        info!("{} of {} configured dictionaries enabled", ready, events.len());
        events
    }

    fn snapshot(&self) -> Vec<Arc<Dictionary>> {
        self.inner.read().dictionaries.clone()
    }
}

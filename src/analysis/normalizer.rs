//! The text normalization pipeline shared by index construction and queries.

use std::sync::Arc;

use log::{debug, error};

use crate::analysis::accent::{fold_case, strip_accents};
use crate::analysis::converter::{ScriptConverter, TableConverter};
use crate::analysis::stemmer::{Stemmer, build_stemmer};
use crate::config::{EngineConfig, StageConfig};

/// Runs the configured stages over headwords and queries.
///
/// Stage order is fixed: stemming (queries only), script conversion, accent
/// stripping, case folding. Input is always trimmed first. A stage whose
/// backend is missing or fails is skipped and the text passes through.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    stages: StageConfig,
    stemmer: Option<Arc<dyn Stemmer>>,
    converter: Option<Arc<dyn ScriptConverter>>,
}

impl Normalizer {
    pub fn new(stages: StageConfig) -> Self {
        Self {
            stages,
            stemmer: None,
            converter: None,
        }
    }

    pub fn with_stemmer(mut self, stemmer: Arc<dyn Stemmer>) -> Self {
        self.stemmer = Some(stemmer);
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn ScriptConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Build the pipeline described by `config`.
    ///
    /// Backends that fail to initialise are logged and left out; the
    /// corresponding stage becomes a pass-through.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut normalizer = Self::new(config.stages);

        if config.stages.stemming {
            match build_stemmer(&config.stemmer) {
                Ok(stemmer) => normalizer.stemmer = Some(Arc::from(stemmer)),
                Err(e) => error!("stemming disabled: {}", e),
            }
        }

        if config.stages.script_conversion {
            match &config.conversion_table {
                Some(path) => match TableConverter::from_file(path) {
                    Ok(converter) => normalizer.converter = Some(Arc::new(converter)),
                    Err(e) => error!("script conversion disabled: {}", e),
                },
                None => error!("script conversion disabled: no conversion table configured"),
            }
        }

        normalizer
    }

    pub fn stages(&self) -> StageConfig {
        self.stages
    }

    /// Identifies how keys are shaped: the bit set of effective stages in the
    /// low word, the conversion table's fingerprint in the high word.
    ///
    /// Script conversion only counts when a converter is present, so an
    /// index built while the table was unavailable is rebuilt once it loads,
    /// and one built with another table is rebuilt as well.
    pub fn profile(&self) -> u64 {
        let converter = self.converter.as_ref().filter(|_| self.stages.script_conversion);
        let mut effective = self.stages;
        effective.script_conversion = converter.is_some();
        let table = converter.map_or(0, |c| c.fingerprint());
        (u64::from(table) << 32) | u64::from(effective.profile())
    }

    /// Whether the builder must sort keys regardless of source order.
    pub fn reorders_keys(&self) -> bool {
        self.stages.reorders_keys()
    }

    /// The single build-time key for a headword. Never stems.
    pub fn normalize_key(&self, raw: &str) -> String {
        let mut text = raw.trim().to_string();

        if self.stages.script_conversion {
            if let Some(converter) = &self.converter {
                match converter.convert(&text) {
                    Ok(converted) => text = converted,
                    Err(e) => debug!("{} conversion skipped for {:?}: {}", converter.name(), text, e),
                }
            }
        }
        if self.stages.accent_stripping {
            text = strip_accents(&text).into_owned();
        }
        if self.stages.case_folding {
            text = fold_case(&text).into_owned();
        }
        text
    }

    /// Ordered lookup keys for a query.
    ///
    /// Stemming candidates (or the trimmed input when there are none) are
    /// each run through [`normalize_key`](Self::normalize_key); duplicates and
    /// empty keys are dropped. Blank input yields no keys.
    pub fn query_variants(&self, raw: &str) -> Vec<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        if self.stages.stemming {
            if let Some(stemmer) = &self.stemmer {
                match stemmer.stem(trimmed) {
                    Ok(stems) => candidates = stems,
                    Err(e) => debug!("stemming skipped for {:?}: {}", trimmed, e),
                }
            }
        }
        if candidates.is_empty() {
            candidates.push(trimmed.to_string());
        }

        let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let key = self.normalize_key(&candidate);
            if !key.is_empty() && !variants.contains(&key) {
                variants.push(key);
            }
        }
        variants
    }
}

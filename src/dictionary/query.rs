//! Query engine: normalizer variants in, resolved definitions out.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::Normalizer;
use crate::lexical::index::LexicalIndex;
use crate::storage::blob::ContentBlob;

/// Kind of a result record. Lookups are the only kind produced here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    #[default]
    Lookup,
}

/// One resolved definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Name of the dictionary that produced the result.
    #[serde(rename = "engine")]
    pub origin_engine: String,
    /// The normalized variant that hit.
    #[serde(rename = "text")]
    pub query_text: String,
    #[serde(rename = "result")]
    pub result_text: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
}

/// Runs one lookup against a loaded index and its content blob.
pub struct QueryEngine<'a> {
    name: &'a str,
    normalizer: &'a Normalizer,
    index: &'a LexicalIndex,
    content: &'a dyn ContentBlob,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        name: &'a str,
        normalizer: &'a Normalizer,
        index: &'a LexicalIndex,
        content: &'a dyn ContentBlob,
    ) -> Self {
        Self {
            name,
            normalizer,
            index,
            content,
        }
    }

    /// Results in candidate order, then stored entry order.
    ///
    /// Misses yield nothing. Entries whose range falls outside the content
    /// blob are logged and skipped. Definitions that are not valid UTF-8 are
    /// decoded lossily.
    pub fn query(&self, raw: &str) -> Vec<QueryResult> {
        let mut results = Vec::new();
        for variant in self.normalizer.query_variants(raw) {
            let Some(entries) = self.index.lookup(&variant) else {
                debug!("dict {}: no entry for {:?}", self.name, variant);
                continue;
            };
            debug!("dict {}: {:?} has {} entries", self.name, variant, entries.len());

            for entry in entries {
                match self.content.read(entry.offset, entry.length) {
                    Ok(bytes) => results.push(QueryResult {
                        origin_engine: self.name.to_string(),
                        query_text: variant.clone(),
                        result_text: String::from_utf8_lossy(bytes).into_owned(),
                        kind: ResultKind::Lookup,
                    }),
                    Err(e) => warn!("dict {}: skipping entry for {:?}: {}", self.name, variant, e),
                }
            }
        }

        if results.is_empty() {
            debug!("dict {}: no results for {:?}", self.name, raw.trim());
        }
        results
    }
}

//! Script and orthography conversion.

use std::fmt::Debug;
use std::path::Path;

use aho_corasick::{AhoCorasick, MatchKind};
use log::debug;

use crate::error::{LexidxError, Result};

/// Maps text through a fixed conversion, e.g. traditional to simplified Chinese.
pub trait ScriptConverter: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn convert(&self, text: &str) -> Result<String>;

    /// Identifies the mapping. Indexes built under a different fingerprint
    /// are rebuilt. Defaults to a hash of [`name`](Self::name).
    fn fingerprint(&self) -> u32 {
        crc32fast::hash(self.name().as_bytes())
    }
}

/// Table-driven converter using leftmost-longest phrase replacement.
///
/// Longer phrases win over the single characters they contain, so a table
/// can carry phrase-level exceptions next to its character mappings.
#[derive(Debug, Clone)]
pub struct TableConverter {
    name: String,
    matcher: AhoCorasick,
    replacements: Vec<String>,
    fingerprint: u32,
}

impl TableConverter {
    /// Build from `(from, to)` pairs. Later duplicates of a `from` are ignored.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut replacements: Vec<String> = Vec::new();
        let mut seen = ahash::AHashSet::new();
        for (from, to) in pairs {
            let from = from.into();
            if from.is_empty() || !seen.insert(from.clone()) {
                continue;
            }
            patterns.push(from);
            replacements.push(to.into());
        }

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| LexidxError::normalization_stage(format!("conversion table: {}", e)))?;
        let fingerprint = table_fingerprint(&patterns, &replacements);

        Ok(Self {
            name: name.into(),
            matcher,
            replacements,
            fingerprint,
        })
    }

    /// Parse a table of `from<TAB>to [alternatives...]` lines.
    ///
    /// Only the first target of a line is used. Blank lines and `#` comments
    /// are skipped.
    pub fn from_table_str(name: impl Into<String>, table: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for (no, line) in table.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let (from, targets) = line.split_once('\t').ok_or_else(|| {
                LexidxError::normalization_stage(format!("line {}: missing tab separator", no + 1))
            })?;
            let to = targets.split_whitespace().next().ok_or_else(|| {
                LexidxError::normalization_stage(format!("line {}: no target", no + 1))
            })?;
            pairs.push((from.to_string(), to.to_string()));
        }
        Self::from_pairs(name, pairs)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = std::fs::read_to_string(path).map_err(|e| {
            LexidxError::normalization_stage(format!("cannot read {}: {}", path.display(), e))
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string());
        let converter = Self::from_table_str(name, &table)?;
        debug!(
            "loaded conversion table {} ({} mappings)",
            path.display(),
            converter.len()
        );
        Ok(converter)
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}

impl ScriptConverter for TableConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(&self, text: &str) -> Result<String> {
        Ok(self.matcher.replace_all(text, &self.replacements))
    }

    fn fingerprint(&self) -> u32 {
        self.fingerprint
    }
}

/// CRC32 over the mappings sorted by source phrase, so line order in the
/// table file does not matter.
fn table_fingerprint(patterns: &[String], replacements: &[String]) -> u32 {
    let mut order: Vec<usize> = (0..patterns.len()).collect();
    order.sort_unstable_by(|&a, &b| patterns[a].cmp(&patterns[b]));

    let mut hasher = crc32fast::Hasher::new();
    for i in order {
        hasher.update(patterns[i].as_bytes());
        hasher.update(&[0]);
        hasher.update(replacements[i].as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

//! Engine configuration.
//!
//! Configuration is read-only from the engine's point of view: it is built in
//! code with [`EngineConfig::builder`] or parsed from JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LexidxError, Result};

/// Suffix appended to a source path to name its persisted index.
pub const DEFAULT_INDEX_SUFFIX: &str = ".index";

/// Which normalization stages are active.
///
/// Stages always run in a fixed order: stemming, script conversion, accent
/// stripping, case folding. Stemming only ever applies to queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub stemming: bool,
    pub script_conversion: bool,
    pub accent_stripping: bool,
    pub case_folding: bool,
}

impl StageConfig {
    /// Profile bit: keys went through script conversion.
    pub const PROFILE_SCRIPT_CONVERSION: u32 = 1 << 0;
    /// Profile bit: keys had combining marks removed.
    pub const PROFILE_ACCENT_STRIPPING: u32 = 1 << 1;
    /// Profile bit: keys were lower-cased.
    pub const PROFILE_CASE_FOLDING: u32 = 1 << 2;

    /// No stage active; keys are only trimmed.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            stemming: true,
            script_conversion: true,
            accent_stripping: true,
            case_folding: true,
        }
    }

    /// Whether any enabled stage may order normalized keys differently from
    /// the raw headwords they came from.
    pub fn reorders_keys(&self) -> bool {
        self.script_conversion || self.accent_stripping || self.case_folding
    }

    /// Bit set of the key-affecting stages, as stored in an index header.
    pub fn profile(&self) -> u32 {
        let mut profile = 0;
        if self.script_conversion {
            profile |= Self::PROFILE_SCRIPT_CONVERSION;
        }
        if self.accent_stripping {
            profile |= Self::PROFILE_ACCENT_STRIPPING;
        }
        if self.case_folding {
            profile |= Self::PROFILE_CASE_FOLDING;
        }
        profile
    }
}

/// Stemming algorithm used to expand queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmerAlgorithm {
    /// Inflection rules that strip or rewrite common suffixes.
    #[default]
    Suffix,
    /// Snowball stemmer for [`StemmerConfig::language`].
    Snowball,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemmerConfig {
    pub algorithm: StemmerAlgorithm,
    /// Snowball language name, e.g. `"english"`.
    pub language: String,
}

impl Default for StemmerConfig {
    fn default() -> Self {
        Self {
            algorithm: StemmerAlgorithm::Suffix,
            language: "english".to_string(),
        }
    }
}

/// One dictionary known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    pub name: String,
    pub source: PathBuf,
    /// The source yields headwords in ascending order.
    #[serde(default)]
    pub sorted: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl DictionaryConfig {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            sorted: false,
            enabled: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_index_suffix() -> String {
    DEFAULT_INDEX_SUFFIX.to_string()
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub stages: StageConfig,
    #[serde(default)]
    pub stemmer: StemmerConfig,
    /// Conversion table loaded when `stages.script_conversion` is set.
    #[serde(default)]
    pub conversion_table: Option<PathBuf>,
    #[serde(default = "default_index_suffix")]
    pub index_suffix: String,
    #[serde(default)]
    pub dictionaries: Vec<DictionaryConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            stages: StageConfig::default(),
            stemmer: StemmerConfig::default(),
            conversion_table: None,
            index_suffix: default_index_suffix(),
            dictionaries: Vec::new(),
        }
    }

    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_suffix.is_empty() {
            return Err(LexidxError::invalid_argument("index_suffix must not be empty"));
        }
        for (i, dict) in self.dictionaries.iter().enumerate() {
            if dict.name.is_empty() {
                return Err(LexidxError::invalid_argument(format!(
                    "dictionary #{} has an empty name",
                    i
                )));
            }
            if self.dictionaries[..i].iter().any(|d| d.name == dict.name) {
                return Err(LexidxError::invalid_argument(format!(
                    "duplicate dictionary name '{}'",
                    dict.name
                )));
            }
        }
        Ok(())
    }

    pub fn dictionary(&self, name: &str) -> Option<&DictionaryConfig> {
        self.dictionaries.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    stages: StageConfig,
    stemmer: Option<StemmerConfig>,
    conversion_table: Option<PathBuf>,
    index_suffix: Option<String>,
    dictionaries: Vec<DictionaryConfig>,
}

impl EngineConfigBuilder {
    pub fn stages(mut self, stages: StageConfig) -> Self {
        self.stages = stages;
        self
    }

    pub fn stemmer(mut self, stemmer: StemmerConfig) -> Self {
        self.stemmer = Some(stemmer);
        self
    }

    pub fn conversion_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.conversion_table = Some(path.into());
        self
    }

    pub fn index_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.index_suffix = Some(suffix.into());
        self
    }

    pub fn add_dictionary(mut self, dict: DictionaryConfig) -> Self {
        self.dictionaries.push(dict);
        self
    }

    pub fn build(self) -> Result<EngineConfig> {
        let config = EngineConfig {
            stages: self.stages,
            stemmer: self.stemmer.unwrap_or_default(),
            conversion_table: self.conversion_table,
            index_suffix: self.index_suffix.unwrap_or_else(default_index_suffix),
            dictionaries: self.dictionaries,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::new());
        assert_eq!(config.index_suffix, ".index");
        assert!(!config.stages.reorders_keys());
    }

    #[test]
    fn test_full_json() {
        let json = r#"{
            "stages": { "stemming": true, "accent_stripping": true },
            "stemmer": { "algorithm": "snowball", "language": "french" },
            "conversion_table": "/usr/share/lexidx/t2s.txt",
            "dictionaries": [
                { "name": "en", "source": "/data/en.tsv", "sorted": true },
                { "name": "fr", "source": "/data/fr.tsv", "enabled": false }
            ]
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();

        assert!(config.stages.stemming);
        assert!(config.stages.accent_stripping);
        assert!(!config.stages.script_conversion);
        assert_eq!(config.stemmer.algorithm, StemmerAlgorithm::Snowball);
        assert_eq!(config.stemmer.language, "french");
        assert_eq!(config.dictionaries.len(), 2);
        assert!(config.dictionary("en").unwrap().sorted);
        assert!(config.dictionary("en").unwrap().enabled);
        assert!(!config.dictionary("fr").unwrap().enabled);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = EngineConfig::builder()
            .add_dictionary(DictionaryConfig::new("en", "a.tsv"))
            .add_dictionary(DictionaryConfig::new("en", "b.tsv"))
            .build();
        assert!(matches!(result, Err(LexidxError::InvalidArgument(_))));
    }

    #[test]
    fn test_reordering_stages() {
        assert!(!StageConfig { stemming: true, ..StageConfig::none() }.reorders_keys());
        assert!(StageConfig { script_conversion: true, ..StageConfig::none() }.reorders_keys());
        assert!(StageConfig { accent_stripping: true, ..StageConfig::none() }.reorders_keys());
        assert!(StageConfig { case_folding: true, ..StageConfig::none() }.reorders_keys());
    }

    #[test]
    fn test_profile_ignores_stemming() {
        assert_eq!(StageConfig { stemming: true, ..StageConfig::none() }.profile(), 0);
        assert_eq!(StageConfig::all().profile(), 0b111);
        assert_eq!(
            StageConfig { accent_stripping: true, ..StageConfig::none() }.profile(),
            StageConfig::PROFILE_ACCENT_STRIPPING
        );
    }
}

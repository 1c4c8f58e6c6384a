use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use lexidx::{Dictionary, EngineConfig, Normalizer, PlainTextFormat};

/// Load the engine configuration, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::new()),
    }
}

/// Dictionary name for `source`: the configured one, else the file stem.
pub fn dictionary_name(config: &EngineConfig, source: &Path) -> String {
    config
        .dictionaries
        .iter()
        .find(|d| d.source == source)
        .map(|d| d.name.clone())
        .or_else(|| source.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "dict".to_string())
}

/// Whether `source` is declared sorted in the configuration.
pub fn configured_sorted(config: &EngineConfig, source: &Path) -> bool {
    config
        .dictionaries
        .iter()
        .any(|d| d.source == source && d.sorted)
}

/// Enable a plain-text dictionary for `source`.
pub fn open_dictionary(config: &EngineConfig, source: &Path) -> Result<Dictionary> {
    if !source.is_file() {
        bail!("Source {} does not exist.", source.display());
    }
    let normalizer = Arc::new(Normalizer::from_config(config));
    let dict = Dictionary::new(dictionary_name(config, source), Arc::new(PlainTextFormat), normalizer)
        .with_index_suffix(config.index_suffix.clone())
        .with_sorted(configured_sorted(config, source));
    dict.try_enable(source)
        .with_context(|| format!("Failed to enable {}", source.display()))?;
    Ok(dict)
}

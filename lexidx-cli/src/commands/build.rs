use anyhow::{Context, Result, bail};
use lexidx::dictionary::index_path_for;
use lexidx::{EngineConfig, IndexBuilder, Normalizer, PlainTextFormat, SourceFormat};

use crate::cli::BuildCommand;
use crate::context;
use crate::output::{self, OutputFormat};

/// Rebuild the index of a source unconditionally.
pub fn run(cmd: BuildCommand, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let source = PlainTextFormat
        .open(&cmd.source)
        .with_context(|| format!("Failed to open {}", cmd.source.display()))?;
    let normalizer = Normalizer::from_config(config);
    let index_path = index_path_for(&cmd.source, &config.index_suffix);
    let sorted = cmd.sorted || context::configured_sorted(config, &cmd.source);

    let (_index, stats) = IndexBuilder::new(&normalizer)
        .pre_sorted(sorted)
        .build_and_persist(source.records(), &index_path)
        .context("Failed to build index")?;

    output::print_build_stats(&index_path, &stats, format);
    if !stats.persisted {
        bail!("Index could not be written to {}.", index_path.display());
    }
    Ok(())
}

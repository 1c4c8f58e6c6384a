use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, bail};
use lexidx::dictionary::index_path_for;
use lexidx::lexical::codec;
use lexidx::EngineConfig;

use crate::cli::InspectCommand;
use crate::output::{self, KeyRow, OutputFormat};

/// Show header and contents of a persisted index.
pub fn run(cmd: InspectCommand, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let index_path = index_path_for(&cmd.source, &config.index_suffix);
    if !index_path.is_file() {
        bail!(
            "No index found at {}. Run 'lexidx build' first.",
            index_path.display()
        );
    }

    if !cmd.keys {
        let file = File::open(&index_path).context("Failed to open index file")?;
        let header = codec::read_header(&mut BufReader::new(file))?;
        output::print_header(&index_path, &header, None, format);
        return Ok(());
    }

    let (index, header) = codec::read_index_file(&index_path)?;
    let keys: Vec<KeyRow> = index
        .iter()
        .map(|(key, entries)| KeyRow {
            key,
            entries: entries.len(),
        })
        .collect();
    output::print_header(&index_path, &header, Some(&keys), format);
    Ok(())
}

use anyhow::Result;
use lexidx::EngineConfig;

use crate::cli::QueryCommand;
use crate::context;
use crate::output::{self, OutputFormat};

/// Look text up in one dictionary.
pub fn run(cmd: QueryCommand, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    let dict = context::open_dictionary(config, &cmd.source)?;
    let text = cmd.text.join(" ");
    let results = dict.query(&text);
    output::print_results(&results, format);
    Ok(())
}

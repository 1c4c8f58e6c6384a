use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// lexidx - dictionary headword index
#[derive(Parser)]
#[command(name = "lexidx", version, about)]
pub struct Cli {
    /// Engine configuration (JSON). Defaults to no normalization stages.
    #[arg(long, env = "LEXIDX_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build (or rebuild) the index of a source file.
    Build(BuildCommand),
    /// Look text up in a source file, loading or building its index.
    Query(QueryCommand),
    /// Show the persisted index of a source file.
    Inspect(InspectCommand),
}

#[derive(Parser)]
pub struct BuildCommand {
    /// Tab-separated dictionary source.
    pub source: PathBuf,

    /// The source lists headwords in ascending order.
    #[arg(long)]
    pub sorted: bool,
}

#[derive(Parser)]
pub struct QueryCommand {
    /// Tab-separated dictionary source.
    pub source: PathBuf,

    /// Text to look up; several words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Parser)]
pub struct InspectCommand {
    /// Tab-separated dictionary source.
    pub source: PathBuf,

    /// List every key with its entry count.
    #[arg(long)]
    pub keys: bool,
}

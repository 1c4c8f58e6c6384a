mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{build, inspect, query};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexidx=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = context::load_config(cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Command::Build(cmd) => build::run(cmd, &config, format),
        Command::Query(cmd) => query::run(cmd, &config, format),
        Command::Inspect(cmd) => inspect::run(cmd, &config, format),
    }
}

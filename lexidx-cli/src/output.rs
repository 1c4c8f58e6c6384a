use std::path::Path;

use clap::ValueEnum;
use lexidx::lexical::builder::BuildStats;
use lexidx::lexical::codec::IndexHeader;
use lexidx::QueryResult;
use serde::Serialize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

/// Print query results.
pub fn print_results(results: &[QueryResult], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(results),
        OutputFormat::Table => {
            if results.is_empty() {
                println!("No results found.");
                return;
            }
            let rows: Vec<ResultRow> = results
                .iter()
                .map(|r| ResultRow {
                    engine: r.origin_engine.clone(),
                    text: r.query_text.clone(),
                    result: truncate(&r.result_text, 80),
                })
                .collect();
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

/// Print the outcome of a build.
pub fn print_build_stats(index_path: &Path, stats: &BuildStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&json!({
            "index": index_path,
            "stats": stats,
        })),
        OutputFormat::Table => {
            println!("Index: {}", index_path.display());
            let rows = vec![StatsRow {
                records: stats.records,
                skipped: stats.skipped,
                keys: stats.keys,
                nodes: stats.nodes,
                sorted: stats.sorted,
                persisted: stats.persisted,
            }];
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
}

/// Print an index header and, optionally, its keys.
pub fn print_header(index_path: &Path, header: &IndexHeader, keys: Option<&[KeyRow]>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut value = json!({
                "index": index_path,
                "header": header,
            });
            if let Some(keys) = keys {
                value["keys"] = json!(keys);
            }
            print_json(&value);
        }
        OutputFormat::Table => {
            println!("Index:   {}", index_path.display());
            println!("Version: {}", header.version);
            println!("Stages:  {:#05b}", header.stage_bits());
            println!("Table:   {:#010x}", header.table_fingerprint());
            println!("Nodes:   {}", header.node_count);
            println!("Keys:    {}", header.key_count);
            println!("Entries: {}", header.entry_count);
            if let Some(keys) = keys
                && !keys.is_empty()
            {
                let table = Table::new(keys).with(Style::rounded()).to_string();
                println!("\n{table}");
            }
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct KeyRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Entries")]
    pub entries: usize,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Dictionary")]
    engine: String,
    #[tabled(rename = "Text")]
    text: String,
    #[tabled(rename = "Result")]
    result: String,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Skipped")]
    skipped: usize,
    #[tabled(rename = "Keys")]
    keys: usize,
    #[tabled(rename = "Nodes")]
    nodes: usize,
    #[tabled(rename = "Sorted")]
    sorted: bool,
    #[tabled(rename = "Persisted")]
    persisted: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

/// Shorten `text` to at most `max` characters on one line.
fn truncate(text: &str, max: usize) -> String {
    let line = text.replace(['\n', '\r'], " ");
    if line.chars().count() > max {
        let head: String = line.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        line
    }
}

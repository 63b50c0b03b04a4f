use anyhow::{Context, Result};
use std::path::PathBuf;

use osmnodes::reader::{NodeCsvReader, NodeSummary};

/// Display a summary of a node table
pub fn run(file: PathBuf, limit: Option<u64>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let mut reader = NodeCsvReader::open(&file).context("Failed to open node table")?;
    let summary =
        NodeSummary::from_reader(&mut reader, limit).context("Failed to read node table")?;

    if json {
        let text = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}", heading("Node Table Information"));
    println!("======================");
    println!("File: {}", file.display());
    if let Some(limit) = limit {
        println!("(first {} rows only)", limit);
    }
    println!();

    println!("{}", heading("Rows:"));
    println!("  Nodes: {}", summary.rows);
    println!("  Skipped (malformed): {}", summary.skipped_rows);
    println!();

    println!("{}", heading("Identifiers:"));
    match (summary.min_id, summary.max_id) {
        (Some(min), Some(max)) => println!("  Range: {} .. {}", min, max),
        _ => println!("  Range: <empty>"),
    }
    println!("  Ascending: {}", if summary.ids_ascending { "yes" } else { "no" });
    println!("  Duplicates: {}", summary.duplicate_ids);
    println!();

    println!("{}", heading("Bounds:"));
    match summary.bounds {
        Some(b) => {
            println!("  Longitude: {} .. {}", b.min_lon, b.max_lon);
            println!("  Latitude:  {} .. {}", b.min_lat, b.max_lat);
        }
        None => println!("  <empty>"),
    }

    Ok(())
}

#[cfg(feature = "colorized_output")]
fn heading(text: &str) -> String {
    console::style(text).bold().to_string()
}

#[cfg(not(feature = "colorized_output"))]
fn heading(text: &str) -> String {
    text.to_string()
}

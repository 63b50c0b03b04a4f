//! # osmnodes
//!
//! Command-line tool for turning OpenStreetMap PBF extracts into node tables.
//!
//! ## Usage
//!
//! ```bash
//! # Extract every located node
//! osmnodes extract florida-latest.osm.pbf florida_nodes.csv
//!
//! # Inspect the result
//! osmnodes info florida_nodes.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use osmnodes::pipeline::ExtractionMode;

#[cfg_attr(not(feature = "pbf"), allow(dead_code))]
mod config;
#[cfg(feature = "pbf")]
mod extract;
mod info;

/// osmnodes - OpenStreetMap node extraction for index benchmarks
#[derive(Parser)]
#[command(name = "osmnodes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// How nodes move from the decoder to the table.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Write through a bounded buffer (flat memory)
    Streaming,
    /// Collect every node, then write
    Buffered,
}

impl From<ModeArg> for ExtractionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Streaming => ExtractionMode::Streaming,
            ModeArg::Buffered => ExtractionMode::Buffered,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract located nodes from an OSM PBF file into a CSV table
    #[cfg(feature = "pbf")]
    Extract {
        /// Input .osm.pbf file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV path (defaults to <input stem>_nodes.csv)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Extraction mode (default: streaming)
        #[arg(short = 'm', long, value_enum)]
        mode: Option<ModeArg>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        // === Advanced tuning flags (hidden from --help) ===
        /// Nodes staged per sink write in streaming mode
        #[arg(short = 'b', long, hide = true)]
        batch_size: Option<usize>,

        /// Records between progress checkpoints
        #[arg(long, hide = true)]
        progress_interval: Option<u64>,

        /// Skip fsync before replacing the output
        #[arg(long, hide = true)]
        no_sync: bool,
    },
    /// Summarize a node table
    Info {
        /// Node CSV file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only read the first N rows
        #[arg(short = 'n', long)]
        limit: Option<u64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// Progress checkpoints log at info, so info is the floor.
pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        #[cfg(feature = "pbf")]
        Commands::Extract {
            input,
            output,
            mode,
            config,
            batch_size,
            progress_interval,
            no_sync,
        } => extract::run(extract::ExtractArgs {
            input,
            output,
            mode: mode.map(ExtractionMode::from),
            config,
            batch_size,
            progress_interval,
            no_sync,
        }),
        Commands::Info { file, limit, json } => info::run(file, limit, json),
    }
}

use anyhow::{Context, Result};
use log::info;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use osmnodes::pipeline::{ExtractionMode, NodeExtractor, PipelineConfig};

use super::config::{Config, ExtractionConfig};

/// Arguments of the extract command, before config-file merging
pub struct ExtractArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub mode: Option<ExtractionMode>,
    pub config: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub progress_interval: Option<u64>,
    pub no_sync: bool,
}

/// Extract located nodes from an OSM PBF file into a CSV table
pub fn run(args: ExtractArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input));

    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?.extraction,
        None => ExtractionConfig::default(),
    };
    let config = merge_config(&args, file_config)?;

    info!("osmnodes - PBF to node table");
    info!("============================");
    info!("Input:  {}", args.input.display());
    info!("Output: {}", output.display());
    info!("Mode: {}", config.mode);
    info!("Batch size: {}", config.batch_size);
    info!("Progress interval: {}", config.progress_interval);

    let extractor = NodeExtractor::with_config(config);
    let stats = extractor
        .extract_file(&args.input, &output)
        .context("Extraction failed")?;

    info!("Extraction complete!");
    info!("  Entities seen: {}", stats.entities_seen);
    info!("  Nodes accepted: {}", stats.nodes_accepted);
    info!("  Entities without location: {}", stats.entities_rejected);
    info!("  Rows written: {}", stats.rows_written);
    info!(
        "  Output file size: {} bytes ({:.2} MB)",
        stats.output_file_size,
        stats.output_file_size as f64 / 1024.0 / 1024.0
    );
    info!("  Elapsed: {:.2?}", stats.elapsed);
    info!("Done! Saved to {}", output.display());

    Ok(())
}

/// Flags win over the config file, which wins over defaults
fn merge_config(args: &ExtractArgs, file: ExtractionConfig) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();

    if let Some(mode) = args.mode.or(file.mode) {
        config.mode = mode;
    }
    if let Some(batch_size) = args.batch_size.or(file.batch_size) {
        config.batch_size = batch_size;
    }
    if let Some(interval) = args.progress_interval.or(file.progress_interval) {
        config.progress_interval =
            NonZeroU64::new(interval).context("progress_interval must be at least 1")?;
    }
    config.writer_config.sync_on_finish = !args.no_sync && file.sync.unwrap_or(true);

    Ok(config)
}

/// `florida-latest.osm.pbf` -> `florida-latest_nodes.csv`, next to the input
fn default_output(input: &Path) -> PathBuf {
    let name = input.file_name().unwrap_or_default().to_string_lossy();
    let stem = name
        .trim_end_matches(".osm.pbf")
        .trim_end_matches(".pbf");
    input.with_file_name(format!("{}_nodes.csv", stem))
}

//! TOML configuration file support.
//!
//! Settings that would otherwise need several flags can live in a file:
//!
//! ```toml
//! # osmnodes.toml
//! [extraction]
//! mode = "streaming"
//! batch_size = 65536
//! progress_interval = 1000000
//! sync = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use osmnodes::pipeline::ExtractionMode;

/// Root configuration structure for osmnodes.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Extraction-specific settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Configuration for the extract command.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// `streaming` or `buffered`.
    pub mode: Option<ExtractionMode>,

    /// Nodes staged per sink write in streaming mode.
    pub batch_size: Option<usize>,

    /// Records between progress checkpoints.
    pub progress_interval: Option<u64>,

    /// Fsync the table before it replaces the destination.
    pub sync: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

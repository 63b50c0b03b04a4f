//! Entity source to node table pipeline
//!
//! [`NodeExtractor`] drains an [`EntitySource`], filters it through a
//! [`NodeCollector`] and serializes the accepted nodes through a
//! [`NodeSink`], with one progress reporter per phase held in [`RunState`].

use std::fmt;
use std::io::Write;
use std::num::NonZeroU64;
use std::path::Path;
use std::time::{Duration, Instant};

use log::info;
use serde::{Deserialize, Serialize};

use crate::collector::{CollectError, NodeCollector};
use crate::progress::{Phase, ProgressReporter, DEFAULT_PROGRESS_INTERVAL};
use crate::source::{EntitySource, SourceError};
use crate::writer::{NodeCsvWriter, NodeFileWriter, NodeSink, WriterConfig, WriterError, WriterStats};

/// Default nodes staged between sink writes in streaming mode
pub const DEFAULT_BATCH_SIZE: usize = 65_536;

/// Largest accepted `batch_size` (16Mi nodes, about 400 MB staged)
pub const MAX_BATCH_SIZE: usize = 1 << 24;

/// Errors that abort an extraction run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The entity source failed to open or stopped mid-stream
    #[error("decode phase failed: {0}")]
    Decode(#[source] SourceError),

    /// An entity violated the source contract while being accepted
    #[error("accumulate phase failed: {0}")]
    Accumulate(#[source] SourceError),

    /// The node table could not be created or written
    #[error("write phase failed: {0}")]
    Write(#[from] WriterError),

    /// Configuration rejected before the run started
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Phase the run was in when it failed, if it had started
    pub fn phase(&self) -> Option<Phase> {
        match self {
            PipelineError::Decode(_) => Some(Phase::Decode),
            PipelineError::Accumulate(_) => Some(Phase::Accumulate),
            PipelineError::Write(_) => Some(Phase::Write),
            PipelineError::InvalidConfig(_) => None,
        }
    }
}

impl From<CollectError> for PipelineError {
    fn from(error: CollectError) -> Self {
        match error {
            CollectError::Source(e) => PipelineError::Decode(e),
            CollectError::Entity(e) => PipelineError::Accumulate(e),
        }
    }
}

/// How accepted nodes travel from the collector to the sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Accepted nodes go through a bounded batch buffer; memory stays flat
    #[default]
    Streaming,
    /// Collect every node first, then write them all
    Buffered,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Streaming => f.write_str("streaming"),
            ExtractionMode::Buffered => f.write_str("buffered"),
        }
    }
}

/// Configuration for an extraction run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Streaming or two-pass extraction
    pub mode: ExtractionMode,

    /// Nodes staged between sink writes in streaming mode
    pub batch_size: usize,

    /// Records between progress checkpoints, per phase
    pub progress_interval: NonZeroU64,

    /// Writer configuration
    pub writer_config: WriterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Streaming,
            batch_size: DEFAULT_BATCH_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            writer_config: WriterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Small batches for memory-constrained hosts
    pub fn low_memory() -> Self {
        Self {
            batch_size: 4_096,
            ..Self::default()
        }
    }

    /// Two-pass extraction: accumulate everything, then write
    pub fn buffered() -> Self {
        Self {
            mode: ExtractionMode::Buffered,
            ..Self::default()
        }
    }

    /// Check the configuration before a run
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(PipelineError::InvalidConfig(format!(
                "batch_size {} exceeds the maximum of {}",
                self.batch_size, MAX_BATCH_SIZE
            )));
        }
        Ok(())
    }
}

/// Progress counters for one run
///
/// The two reporters never share a count: `accumulation` tracks accepted
/// nodes and `serialization` tracks rows written.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Accepted-node counter
    pub accumulation: ProgressReporter,
    /// Written-row counter
    pub serialization: ProgressReporter,
}

impl RunState {
    /// Fresh state with both counters at zero
    pub fn new(interval: NonZeroU64) -> Self {
        Self {
            accumulation: ProgressReporter::new(Phase::Accumulate, interval),
            serialization: ProgressReporter::new(Phase::Write, interval),
        }
    }

    /// Nodes accepted so far
    pub fn accepted(&self) -> u64 {
        self.accumulation.count()
    }

    /// Rows serialized so far; trails `accepted` while a batch is staged
    pub fn rows_written(&self) -> u64 {
        self.serialization.count()
    }
}

/// Statistics from an extraction run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Mode the run used
    pub mode: ExtractionMode,
    /// Entities pulled from the source
    pub entities_seen: u64,
    /// Entities accepted as nodes
    pub nodes_accepted: u64,
    /// Entities dropped for lacking a valid coordinate
    pub entities_rejected: u64,
    /// Data rows written to the table
    pub rows_written: u64,
    /// Checkpoints emitted while accumulating
    pub accumulate_checkpoints: u64,
    /// Checkpoints emitted while writing
    pub write_checkpoints: u64,
    /// Size of the finished table in bytes (0 for in-memory writers)
    pub output_file_size: u64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} entities accepted, {} rows written in {:.2?} ({} mode)",
            self.nodes_accepted, self.entities_seen, self.rows_written, self.elapsed, self.mode
        )
    }
}

/// Runs the extraction pipeline
pub struct NodeExtractor {
    config: PipelineConfig,
}

impl NodeExtractor {
    /// Create an extractor with default configuration
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Create an extractor with custom configuration
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Set the extraction mode
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the streaming batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract an OSM PBF file into a node table at `output_path`
    #[cfg(feature = "pbf")]
    pub fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<PipelineStats, PipelineError> {
        let input_path = input_path.as_ref();
        info!("Extracting nodes from {}", input_path.display());
        let source =
            crate::source::PbfEntitySource::open(input_path).map_err(PipelineError::Decode)?;
        self.extract(source, output_path)
    }

    /// Extract `source` into a node table at `output_path`
    ///
    /// The destination is replaced only if the whole run succeeds.
    pub fn extract<S: EntitySource, P: AsRef<Path>>(
        &self,
        source: S,
        output_path: P,
    ) -> Result<PipelineStats, PipelineError> {
        self.config.validate()?;
        let started = Instant::now();

        let mut sink = NodeFileWriter::create(output_path, &self.config.writer_config)?;
        let mut collector = NodeCollector::new();
        let mut state = RunState::new(self.config.progress_interval);

        self.drive(source, &mut collector, &mut sink, &mut state)?;
        let writer_stats = sink.finish()?;

        let stats = self.stats(&collector, &state, &writer_stats, started);
        info!("Done: {}", stats);
        Ok(stats)
    }

    /// Extract `source` into any writer, returning it once the table is complete
    pub fn extract_to_writer<S: EntitySource, W: Write>(
        &self,
        source: S,
        writer: W,
    ) -> Result<(W, PipelineStats), PipelineError> {
        self.config.validate()?;
        let started = Instant::now();

        let mut sink = NodeCsvWriter::new(writer, &self.config.writer_config)?;
        let mut collector = NodeCollector::new();
        let mut state = RunState::new(self.config.progress_interval);

        self.drive(source, &mut collector, &mut sink, &mut state)?;
        let (writer, writer_stats) = sink.finish()?;

        let stats = self.stats(&collector, &state, &writer_stats, started);
        Ok((writer, stats))
    }

    fn drive<S: EntitySource, K: NodeSink>(
        &self,
        source: S,
        collector: &mut NodeCollector,
        sink: &mut K,
        state: &mut RunState,
    ) -> Result<(), PipelineError> {
        match self.config.mode {
            ExtractionMode::Streaming => self.run_streaming(source, collector, sink, state),
            ExtractionMode::Buffered => self.run_buffered(source, collector, sink, state),
        }
    }

    fn stats(
        &self,
        collector: &NodeCollector,
        state: &RunState,
        writer_stats: &WriterStats,
        started: Instant,
    ) -> PipelineStats {
        PipelineStats {
            mode: self.config.mode,
            entities_seen: collector.seen(),
            nodes_accepted: collector.accepted(),
            entities_rejected: collector.rejected(),
            rows_written: writer_stats.rows_written,
            accumulate_checkpoints: state.accumulation.checkpoints(),
            write_checkpoints: state.serialization.checkpoints(),
            output_file_size: writer_stats.file_size_bytes,
            elapsed: started.elapsed(),
        }
    }
}

impl Default for NodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

mod buffered;
mod streaming;

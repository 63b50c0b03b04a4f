//! # Node Table Writer
//!
//! Serializes accepted nodes to the flat `id,lon,lat` CSV table consumed by
//! the index benchmarks.
//!
//! ## Design Principles
//!
//! 1. **Streaming**: rows are encoded as they arrive; nothing beyond the CSV
//!    encoder's buffer is held in memory.
//!
//! 2. **Exact Coordinates**: longitude and latitude are written in the
//!    shortest form that parses back to the same `f64`.
//!
//! 3. **All-or-Nothing Output**: [`NodeFileWriter`] stages rows in a
//!    temporary file and renames it over the destination only on success.

mod atomic;
mod config;
mod error;
mod stats;
mod writer_impl;


pub use atomic::NodeFileWriter;
pub use config::WriterConfig;
pub use error::WriterError;
pub use stats::WriterStats;
pub use writer_impl::NodeCsvWriter;

use crate::model::AcceptedNode;
use crate::progress::ProgressReporter;

/// Column names of the node table, in order
pub const NODE_COLUMNS: [&str; 3] = ["id", "lon", "lat"];

/// Destination for accepted nodes
pub trait NodeSink {
    /// Serialize one node and record it on `progress`
    fn write_node(
        &mut self,
        node: &AcceptedNode,
        progress: &mut ProgressReporter,
    ) -> Result<(), WriterError>;

    /// Serialize a batch of nodes in order
    fn write_nodes(
        &mut self,
        nodes: &[AcceptedNode],
        progress: &mut ProgressReporter,
    ) -> Result<(), WriterError> {
        for node in nodes {
            self.write_node(node, progress)?;
        }
        Ok(())
    }

    /// Data rows written so far
    fn rows_written(&self) -> u64;
}

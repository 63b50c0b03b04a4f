use std::io::Write;

use crate::model::AcceptedNode;
use crate::progress::ProgressReporter;

use super::config::WriterConfig;
use super::error::WriterError;
use super::stats::WriterStats;
use super::{NodeSink, NODE_COLUMNS};

/// Streaming CSV writer for accepted nodes
///
/// The header row is written on construction, so a writer that receives no
/// nodes still produces a valid header-only table. Coordinates are written in
/// their shortest round-trip form.
pub struct NodeCsvWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: u64,
}

impl<W: Write> NodeCsvWriter<W> {
    /// Create a new writer to any Write implementation
    pub fn new(inner: W, config: &WriterConfig) -> Result<Self, WriterError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .buffer_capacity(config.buffer_capacity)
            .from_writer(inner);
        writer.write_record(NODE_COLUMNS)?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Flush buffered rows to the underlying writer
    pub fn flush(&mut self) -> Result<(), WriterError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer with final statistics
    pub fn finish(self) -> Result<(W, WriterStats), WriterError> {
        let rows_written = self.rows_written;
        let inner = self
            .writer
            .into_inner()
            .map_err(|e| WriterError::IoError(e.into_error()))?;

        Ok((
            inner,
            WriterStats {
                rows_written,
                file_size_bytes: 0,
            },
        ))
    }
}

impl<W: Write> NodeSink for NodeCsvWriter<W> {
    fn write_node(
        &mut self,
        node: &AcceptedNode,
        progress: &mut ProgressReporter,
    ) -> Result<(), WriterError> {
        self.writer.serialize(node)?;
        self.rows_written += 1;
        progress.record();
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

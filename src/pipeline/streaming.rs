use log::debug;

use super::{NodeExtractor, PipelineError, RunState, DEFAULT_BATCH_SIZE};
use crate::collector::NodeCollector;
use crate::model::AcceptedNode;
use crate::source::EntitySource;
use crate::writer::NodeSink;

impl NodeExtractor {
    /// Accept and serialize in one pass through a bounded batch buffer
    pub(super) fn run_streaming<S: EntitySource, K: NodeSink>(
        &self,
        mut source: S,
        collector: &mut NodeCollector,
        sink: &mut K,
        state: &mut RunState,
    ) -> Result<(), PipelineError> {
        let batch_size = self.config.batch_size;
        // Large batches grow on demand instead of reserving up front
        let mut batch: Vec<AcceptedNode> = Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE));

        while let Some(entity) = source.next_entity().map_err(PipelineError::Decode)? {
            let accepted = collector
                .accept(entity, &mut state.accumulation)
                .map_err(PipelineError::Accumulate)?;

            if let Some(node) = accepted {
                batch.push(node);
                if batch.len() >= batch_size {
                    sink.write_nodes(&batch, &mut state.serialization)?;
                    batch.clear();
                }
            }
        }

        if !batch.is_empty() {
            sink.write_nodes(&batch, &mut state.serialization)?;
        }

        debug!(
            "Source drained: {} entities, {} accepted, {} rows written",
            collector.seen(),
            state.accepted(),
            state.rows_written()
        );
        Ok(())
    }
}

use log::info;

use super::{NodeExtractor, PipelineError, RunState};
use crate::collector::NodeCollector;
use crate::source::EntitySource;
use crate::writer::NodeSink;

impl NodeExtractor {
    /// Accumulate every node, then serialize them all
    ///
    /// Memory grows with the number of accepted nodes.
    pub(super) fn run_buffered<S: EntitySource, K: NodeSink>(
        &self,
        source: S,
        collector: &mut NodeCollector,
        sink: &mut K,
        state: &mut RunState,
    ) -> Result<(), PipelineError> {
        let nodes = collector.collect_all(source, &mut state.accumulation)?;

        info!("Total nodes: {}", nodes.len());
        info!("Writing node table...");
        sink.write_nodes(&nodes, &mut state.serialization)?;
        Ok(())
    }
}

//! Coordinate filter between the entity source and the sink.

use crate::model::{AcceptedNode, EntityRecord};
use crate::progress::ProgressReporter;
use crate::source::{EntitySource, SourceError};

/// Errors from draining a source through the collector.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The source failed to produce the next entity
    #[error("source failed: {0}")]
    Source(#[source] SourceError),

    /// The source produced an entity that violates its contract
    #[error("rejected entity: {0}")]
    Entity(#[source] SourceError),
}

/// Filters entities down to those with a valid coordinate.
///
/// Validity comes from the entity's flag alone; coordinate values are passed
/// through untouched, and duplicate identifiers are not collapsed.
#[derive(Debug, Default)]
pub struct NodeCollector {
    seen: u64,
    accepted: u64,
    rejected: u64,
}

impl NodeCollector {
    /// Create a collector with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter one entity.
    ///
    /// Returns `Some` for located entities and records the acceptance on
    /// `progress`. An entity flagged valid without both coordinates is a
    /// [`SourceError::MalformedEntity`].
    pub fn accept(
        &mut self,
        entity: EntityRecord,
        progress: &mut ProgressReporter,
    ) -> Result<Option<AcceptedNode>, SourceError> {
        self.seen += 1;

        if !entity.coordinate_valid {
            self.rejected += 1;
            return Ok(None);
        }

        let (lon, lat) = match (entity.lon, entity.lat) {
            (Some(lon), Some(lat)) => (lon, lat),
            (lon, lat) => {
                let missing = match (lon, lat) {
                    (None, None) => "longitude and latitude",
                    (None, _) => "longitude",
                    _ => "latitude",
                };
                return Err(SourceError::MalformedEntity {
                    id: entity.id,
                    reason: format!("flagged as located but {} missing", missing),
                });
            }
        };

        self.accepted += 1;
        progress.record();
        Ok(Some(AcceptedNode::new(entity.id, lon, lat)))
    }

    /// Drain `source` and return every accepted node in arrival order.
    pub fn collect_all<S: EntitySource>(
        &mut self,
        mut source: S,
        progress: &mut ProgressReporter,
    ) -> Result<Vec<AcceptedNode>, CollectError> {
        let mut nodes = Vec::new();
        while let Some(entity) = source.next_entity().map_err(CollectError::Source)? {
            if let Some(node) = self.accept(entity, progress).map_err(CollectError::Entity)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    /// Entities inspected.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Entities accepted.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Entities dropped for lacking a valid coordinate.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

//! # osmnodes - OpenStreetMap Node Extraction
//!
//! `osmnodes` streams geolocated nodes out of OpenStreetMap PBF extracts and
//! writes them as a flat `id,lon,lat` CSV table, the input format of the
//! spatial and learned-index benchmarks.
//!
//! ## Pipeline
//!
//! ```text
//! EntitySource ──▶ NodeCollector ──▶ NodeSink
//!  (osmpbf)       (coordinate filter)  (CSV, atomic file)
//! ```
//!
//! - **Sources** yield [`model::EntityRecord`]s one at a time; the PBF adapter
//!   holds at most one decoded block in memory.
//! - **The collector** keeps entities flagged with a valid coordinate, in
//!   arrival order.
//! - **Sinks** write rows with exact, round-trippable coordinates. The file
//!   sink replaces its destination only when the run succeeds.
//! - **Progress** is logged every million records, separately for the
//!   accumulation and write phases.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use osmnodes::pipeline::{NodeExtractor, PipelineConfig};
//!
//! let extractor = NodeExtractor::with_config(PipelineConfig::default());
//! let stats = extractor.extract_file("florida-latest.osm.pbf", "florida_nodes.csv")?;
//! println!("{}", stats);
//! # Ok::<(), osmnodes::pipeline::PipelineError>(())
//! ```
//!
//! ## Reading Tables Back
//!
//! ```rust,no_run
//! use osmnodes::reader::{load_sorted_keys, KeyColumn};
//!
//! // First million longitudes, sorted, with their ranks
//! let keys = load_sorted_keys("florida_nodes.csv", KeyColumn::Lon, Some(1_000_000))?;
//! # Ok::<(), osmnodes::reader::ReaderError>(())
//! ```

pub mod collector;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod reader;
pub mod source;
pub mod writer;

/// Prelude for common imports
pub mod prelude {
    pub use crate::collector::NodeCollector;
    pub use crate::model::{AcceptedNode, EntityRecord};
    pub use crate::pipeline::{
        ExtractionMode, NodeExtractor, PipelineConfig, PipelineError, PipelineStats,
    };
    pub use crate::progress::{Phase, ProgressReporter};
    pub use crate::reader::{KeyColumn, NodeCsvReader, NodeSummary};
    #[cfg(feature = "pbf")]
    pub use crate::source::PbfEntitySource;
    pub use crate::source::{EntitySource, SourceError};
    pub use crate::writer::{NodeCsvWriter, NodeFileWriter, NodeSink, WriterConfig};
}

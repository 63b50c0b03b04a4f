//! Reading node tables back for index benchmarks.
//!
//! [`NodeCsvReader`] streams an `id,lon,lat` table produced by the writer.
//! Rows that don't parse are skipped with a warning, so a hand-edited or
//! concatenated table still loads. [`load_sorted_keys`] turns one coordinate
//! column into the sorted `(key, position)` pairs a learned index trains on.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use log::{info, warn};
use serde::Serialize;

use crate::model::AcceptedNode;
use crate::progress::{Phase, ProgressReporter};
use crate::writer::NODE_COLUMNS;

/// Errors that can occur while reading a node table
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV decoder
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// The table does not start with `id,lon,lat`
    #[error("Invalid header: expected id,lon,lat, found {0}")]
    InvalidHeader(String),
}

/// Coordinate column used as an index key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColumn {
    /// Longitude
    Lon,
    /// Latitude
    Lat,
}

impl KeyColumn {
    fn key(self, node: &AcceptedNode) -> f64 {
        match self {
            KeyColumn::Lon => node.lon,
            KeyColumn::Lat => node.lat,
        }
    }
}

/// Streaming reader for node tables
pub struct NodeCsvReader<R: Read> {
    reader: csv::Reader<R>,
    record: csv::ByteRecord,
    progress: ProgressReporter,
    skipped: u64,
}

impl NodeCsvReader<File> {
    /// Open a node table on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        info!("Loading node table from {}", path.display());
        Self::from_reader(File::open(path)?)
    }
}

impl<R: Read> NodeCsvReader<R> {
    /// Read a node table from any reader, validating its header
    pub fn from_reader(inner: R) -> Result<Self, ReaderError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(inner);

        let headers = reader.headers()?;
        if !headers.iter().map(str::trim).eq(NODE_COLUMNS) {
            return Err(ReaderError::InvalidHeader(
                headers.iter().collect::<Vec<_>>().join(","),
            ));
        }

        Ok(Self {
            reader,
            record: csv::ByteRecord::new(),
            progress: ProgressReporter::with_default_interval(Phase::Load),
            skipped: 0,
        })
    }

    /// Next well-formed node, or `None` at end of table
    pub fn next_node(&mut self) -> Result<Option<AcceptedNode>, ReaderError> {
        loop {
            if !self.reader.read_byte_record(&mut self.record)? {
                return Ok(None);
            }

            match parse_row(&self.record) {
                Some(node) => {
                    self.progress.record();
                    return Ok(Some(node));
                }
                None => {
                    self.skipped += 1;
                    match self.record.position() {
                        Some(pos) => warn!("Skipping malformed row at line {}", pos.line()),
                        None => warn!("Skipping malformed row"),
                    }
                }
            }
        }
    }

    /// Read up to `max_records` nodes (all when `None`) in table order
    pub fn read_nodes(&mut self, max_records: Option<usize>) -> Result<Vec<AcceptedNode>, ReaderError> {
        let mut nodes = Vec::new();
        while max_records.map_or(true, |max| nodes.len() < max) {
            match self.next_node()? {
                Some(node) => nodes.push(node),
                None => break,
            }
        }
        info!("Loaded {} records", nodes.len());
        Ok(nodes)
    }

    /// Rows skipped because they didn't parse
    pub fn skipped_rows(&self) -> u64 {
        self.skipped
    }

    /// Nodes read so far
    pub fn rows_read(&self) -> u64 {
        self.progress.count()
    }
}

fn parse_row(record: &csv::ByteRecord) -> Option<AcceptedNode> {
    let id = parse_field(record, 0)?;
    let lon = parse_field(record, 1)?;
    let lat = parse_field(record, 2)?;
    Some(AcceptedNode::new(id, lon, lat))
}

// Non-UTF-8 bytes make the field, and so the row, malformed
fn parse_field<T: FromStr>(record: &csv::ByteRecord, index: usize) -> Option<T> {
    std::str::from_utf8(record.get(index)?).ok()?.trim().parse().ok()
}

/// Load one coordinate column, sort it, and number the sorted keys `0..n`
///
/// `max_records` caps how many rows are read before sorting.
pub fn load_sorted_keys<P: AsRef<Path>>(
    path: P,
    column: KeyColumn,
    max_records: Option<usize>,
) -> Result<Vec<(f64, usize)>, ReaderError> {
    let mut reader = NodeCsvReader::open(path)?;
    let nodes = reader.read_nodes(max_records)?;
    Ok(sorted_keys(&nodes, column))
}

/// Sort the `column` values of `nodes` and pair each with its rank
pub fn sorted_keys(nodes: &[AcceptedNode], column: KeyColumn) -> Vec<(f64, usize)> {
    let mut keys: Vec<f64> = nodes.iter().map(|node| column.key(node)).collect();
    keys.sort_by(f64::total_cmp);
    keys.into_iter().enumerate().map(|(pos, key)| (key, pos)).collect()
}

/// Bounding box of a set of nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Western edge
    pub min_lon: f64,
    /// Southern edge
    pub min_lat: f64,
    /// Eastern edge
    pub max_lon: f64,
    /// Northern edge
    pub max_lat: f64,
}

impl BoundingBox {
    fn of(node: &AcceptedNode) -> Self {
        Self {
            min_lon: node.lon,
            min_lat: node.lat,
            max_lon: node.lon,
            max_lat: node.lat,
        }
    }

    fn extend(&mut self, node: &AcceptedNode) {
        self.min_lon = self.min_lon.min(node.lon);
        self.min_lat = self.min_lat.min(node.lat);
        self.max_lon = self.max_lon.max(node.lon);
        self.max_lat = self.max_lat.max(node.lat);
    }
}

/// One-pass summary of a node table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeSummary {
    /// Well-formed rows read
    pub rows: u64,
    /// Malformed rows skipped
    pub skipped_rows: u64,
    /// Smallest identifier
    pub min_id: Option<i64>,
    /// Largest identifier
    pub max_id: Option<i64>,
    /// Whether identifiers never decrease in table order
    pub ids_ascending: bool,
    /// Rows whose identifier already appeared earlier in the table
    pub duplicate_ids: u64,
    /// Extent of all coordinates
    pub bounds: Option<BoundingBox>,
}

impl NodeSummary {
    /// Summarize up to `max_records` rows from `reader`
    ///
    /// Identifiers are kept until the end to count duplicates, so memory
    /// grows by 8 bytes per row read.
    pub fn from_reader<R: Read>(
        reader: &mut NodeCsvReader<R>,
        max_records: Option<u64>,
    ) -> Result<Self, ReaderError> {
        let mut summary = NodeSummary {
            ids_ascending: true,
            ..Default::default()
        };
        let mut last_id: Option<i64> = None;
        let mut ids: Vec<i64> = Vec::new();

        while max_records.map_or(true, |max| summary.rows < max) {
            let node = match reader.next_node()? {
                Some(node) => node,
                None => break,
            };

            summary.rows += 1;
            summary.min_id = Some(summary.min_id.map_or(node.id, |id| id.min(node.id)));
            summary.max_id = Some(summary.max_id.map_or(node.id, |id| id.max(node.id)));
            if last_id.is_some_and(|last| node.id < last) {
                summary.ids_ascending = false;
            }
            last_id = Some(node.id);
            ids.push(node.id);

            match summary.bounds.as_mut() {
                Some(bounds) => bounds.extend(&node),
                None => summary.bounds = Some(BoundingBox::of(&node)),
            }
        }

        if !summary.ids_ascending {
            ids.sort_unstable();
        }
        summary.duplicate_ids = ids.windows(2).filter(|pair| pair[0] == pair[1]).count() as u64;
        summary.skipped_rows = reader.skipped_rows();
        Ok(summary)
    }
}

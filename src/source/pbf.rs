//! OpenStreetMap PBF adapter.
//!
//! Block parsing is delegated to `osmpbf`; this adapter walks the file one
//! blob at a time and turns nodes and dense nodes into [`EntityRecord`]s.
//! Ways and relations are skipped. At most one decoded block's nodes are held
//! in memory at a time.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use osmpbf::{BlobDecode, BlobReader, Element};

use super::{EntitySource, SourceError};
use crate::model::{is_valid_location, EntityRecord};

/// Streaming entity source over an `.osm.pbf` file.
pub struct PbfEntitySource<R: Read + Send = BufReader<File>> {
    blobs: BlobReader<R>,
    pending: VecDeque<EntityRecord>,
    blocks_decoded: u64,
}

impl PbfEntitySource<BufReader<File>> {
    /// Open a PBF file for streaming.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        debug!("Opening PBF source {}", path.display());
        let blobs = BlobReader::from_path(path)?;
        Ok(Self::from_blob_reader(blobs))
    }
}

impl<R: Read + Send> PbfEntitySource<R> {
    /// Stream PBF data from any reader.
    pub fn from_reader(reader: R) -> Self {
        Self::from_blob_reader(BlobReader::new(reader))
    }

    fn from_blob_reader(blobs: BlobReader<R>) -> Self {
        Self {
            blobs,
            pending: VecDeque::new(),
            blocks_decoded: 0,
        }
    }

    /// Number of data blocks decoded so far.
    pub fn blocks_decoded(&self) -> u64 {
        self.blocks_decoded
    }

    /// Decode blobs until at least one entity is pending.
    ///
    /// Returns `false` at end of file.
    fn fill(&mut self) -> Result<bool, SourceError> {
        while self.pending.is_empty() {
            let blob = match self.blobs.next() {
                Some(blob) => blob?,
                None => return Ok(false),
            };

            // Header and unknown blobs carry no entities
            if let BlobDecode::OsmData(block) = blob.decode()? {
                self.blocks_decoded += 1;
                for element in block.elements() {
                    match element {
                        Element::Node(node) => {
                            self.pending
                                .push_back(node_entity(node.id(), node.lon(), node.lat()));
                        }
                        Element::DenseNode(node) => {
                            self.pending
                                .push_back(node_entity(node.id(), node.lon(), node.lat()));
                        }
                        _ => {}
                    }
                }
                debug!(
                    "Block {}: {} node entities",
                    self.blocks_decoded,
                    self.pending.len()
                );
            }
        }
        Ok(true)
    }
}

impl<R: Read + Send> EntitySource for PbfEntitySource<R> {
    fn next_entity(&mut self) -> Result<Option<EntityRecord>, SourceError> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.pending.pop_front())
    }
}

/// Build an entity from decoded node fields, flagging out-of-range locations.
fn node_entity(id: i64, lon: f64, lat: f64) -> EntityRecord {
    if is_valid_location(lon, lat) {
        EntityRecord::located(id, lon, lat)
    } else {
        EntityRecord::unlocated(id)
    }
}

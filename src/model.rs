//! Entity and node records flowing through the extraction pipeline.

use serde::{Deserialize, Serialize};

/// A single decoded entity from the source container.
///
/// `lon`/`lat` are only meaningful when `coordinate_valid` is set. Validity is
/// decided by the source; nothing downstream re-checks the coordinate values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRecord {
    /// Entity identifier, unique within a source file.
    pub id: i64,
    /// Whether the source considers the coordinate pair usable.
    pub coordinate_valid: bool,
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
}

impl EntityRecord {
    /// Entity with a valid coordinate pair.
    pub fn located(id: i64, lon: f64, lat: f64) -> Self {
        Self {
            id,
            coordinate_valid: true,
            lon: Some(lon),
            lat: Some(lat),
        }
    }

    /// Entity without a usable coordinate.
    pub fn unlocated(id: i64) -> Self {
        Self {
            id,
            coordinate_valid: false,
            lon: None,
            lat: None,
        }
    }
}

/// An entity that passed the coordinate filter.
///
/// Field order matches the CSV column order (`id,lon,lat`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptedNode {
    /// Entity identifier.
    pub id: i64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl AcceptedNode {
    /// Create a node from its identifier and coordinate pair.
    pub fn new(id: i64, lon: f64, lat: f64) -> Self {
        Self { id, lon, lat }
    }
}

/// Returns true when `lon`/`lat` lie on the globe.
///
/// Used by source adapters to derive the validity flag; out-of-range values
/// are how undefined locations show up in decoded PBF data.
pub fn is_valid_location(lon: f64, lat: f64) -> bool {
    lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat)
}

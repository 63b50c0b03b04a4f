/// Errors raised by an entity source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error while opening or reading the source
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the PBF decoder
    #[cfg(feature = "pbf")]
    #[error("PBF decode error: {0}")]
    PbfError(#[from] osmpbf::Error),

    /// Source stopped mid-stream or produced an unreadable block
    #[error("Corrupt source: {0}")]
    Corrupt(String),

    /// Entity flagged as located but missing a coordinate
    #[error("Malformed entity {id}: {reason}")]
    MalformedEntity {
        /// Identifier of the offending entity
        id: i64,
        /// What was missing
        reason: String,
    },
}

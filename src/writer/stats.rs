use std::fmt;

/// Statistics from a completed write operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Number of data rows written (header excluded)
    pub rows_written: u64,
    /// Final file size in bytes, 0 when not writing to a file
    pub file_size_bytes: u64,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} rows ({} bytes)",
            self.rows_written, self.file_size_bytes
        )
    }
}

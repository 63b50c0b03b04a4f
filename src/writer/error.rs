/// Errors that can occur during writing
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV encoder
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Destination path can't hold an output file
    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

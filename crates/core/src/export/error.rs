//! Export error types.

use thiserror::Error;

/// Errors while producing export files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export.
    #[error("Nothing to export")]
    Empty,

    /// CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Zip writer failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Write to the in-memory buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Empty => 400,
            _ => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "NOTHING_TO_EXPORT",
            _ => "EXPORT_ERROR",
        }
    }
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ExportError {
    fn from(err: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        Self::Io(err.into_error())
    }
}

//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found in storage.
    #[error("file not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    fn from_opendal(err: &opendal::Error, key: &str) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: key.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}

/// Attaches the key to an OpenDAL error.
pub(super) trait ResultExt<T> {
    fn for_key(self, key: &str) -> Result<T, StorageError>;
}

impl<T> ResultExt<T> for Result<T, opendal::Error> {
    fn for_key(self, key: &str) -> Result<T, StorageError> {
        self.map_err(|e| StorageError::from_opendal(&e, key))
    }
}

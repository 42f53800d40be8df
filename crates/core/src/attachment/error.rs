//! Attachment error types.

use thiserror::Error;
use uuid::Uuid;

use super::types::AttachmentType;
use crate::application::ApplicationStatus;
use crate::storage::StorageError;

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Attachment not found.
    #[error("attachment not found: {0}")]
    NotFound(Uuid),

    /// Application not found.
    #[error("application not found: {0}")]
    ApplicationNotFound(Uuid),

    /// Application can not be changed in its current status.
    #[error("attachments can not be changed when the application is {0}")]
    NotEditable(ApplicationStatus),

    /// Per-application limit reached.
    #[error("too many attachments, the maximum is {max}")]
    TooMany {
        /// Limit.
        max: u64,
    },

    /// Zero-byte upload.
    #[error("file is empty")]
    EmptyFile,

    /// File too large.
    #[error("file too large: {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Invalid MIME type.
    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    /// Declared type does not match the file content.
    #[error("file content does not match content type {declared}")]
    ContentMismatch {
        /// Type given by the client.
        declared: String,
    },

    /// Type not accepted for this application.
    #[error("attachment type {0} is not allowed for this application")]
    TypeNotAllowed(AttachmentType),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AttachmentError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::Storage(StorageError::NotFound { .. }) => 404,
            Self::Storage(_) | Self::Repository(_) => 500,
            _ => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::Storage(StorageError::NotFound { .. }) => {
                "ATTACHMENT_NOT_FOUND"
            }
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::NotEditable(_) => "NOT_EDITABLE",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Repository(_) => "DATABASE_ERROR",
            _ => "INVALID_ATTACHMENT",
        }
    }
}

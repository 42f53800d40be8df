//! Batch error types.

use thiserror::Error;
use uuid::Uuid;

use super::types::BatchStatus;

/// Errors raised by batch operations.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Batch not found.
    #[error("Batch {0} not found")]
    NotFound(Uuid),

    /// Status change not allowed.
    #[error("Batch status can not change from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: BatchStatus,
        /// Requested status.
        to: BatchStatus,
    },

    /// Decision date is in the future.
    #[error("Decision date can not be in the future")]
    InvalidDecisionDate,

    /// Another draft with the same proposal exists.
    #[error("A draft batch with the same proposal already exists")]
    DraftAlreadyExists,

    /// Decision fields missing.
    #[error("Required decision fields missing: {}", .0.join(", "))]
    CompletionFieldsMissing(Vec<&'static str>),

    /// Batch can only be deleted in draft.
    #[error("Batch in status {0} can not be deleted")]
    NotDraft(BatchStatus),

    /// Membership can not change in this status.
    #[error("Applications of a batch in status {0} can not be modified")]
    ApplicationsLocked(BatchStatus),

    /// Only accepted or rejected applications can be batched.
    #[error("Status or application id is not valid")]
    InvalidApplicationStatus,

    /// Nothing matched the request.
    #[error("Applications were not applicable to be detached")]
    NothingToDetach,

    /// Export of a batch without members.
    #[error("Cannot export empty batch")]
    Empty,

    /// Export not allowed in this status.
    #[error("Batch in status {0} can not be exported")]
    NotExportable(BatchStatus),

    /// Payment export found nothing to send.
    #[error("There are no accepted batches to export")]
    NothingToExport,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl BatchError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::NothingToDetach => 404,
            Self::Database(_) => 500,
            _ => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "BATCH_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::NothingToDetach => "NOTHING_TO_DETACH",
            _ => "INVALID_BATCH_STATE",
        }
    }

    /// Key the frontends translate, where one exists.
    #[must_use]
    pub fn error_key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidDecisionDate => Some("batchInvalidDecisionDate"),
            Self::DraftAlreadyExists => Some("batchInvalidDraftAlreadyExists"),
            Self::CompletionFieldsMissing(_) => Some("batchInvalidCompletionRequiredFieldsMissing"),
            Self::InvalidTransition { .. } => Some("batchInvalidStatusTransition"),
            _ => None,
        }
    }
}

//! Workflow error types for status transitions.

use thiserror::Error;
use uuid::Uuid;

use crate::application::ApplicationStatus;
use crate::validation::ValidationErrors;
use crate::workflow::types::Actor;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to} by {actor}")]
    InvalidTransition {
        /// The current status.
        from: ApplicationStatus,
        /// The attempted target status.
        to: ApplicationStatus,
        /// Who attempted it.
        actor: Actor,
    },

    /// The application can not be changed by this actor in its status.
    #[error("Application in status {status} can not be modified by {actor}")]
    NotEditable {
        /// Current status.
        status: ApplicationStatus,
        /// Who attempted the change.
        actor: Actor,
    },

    /// The application is in a batch that no longer accepts changes.
    #[error("Application belongs to a batch that can not be modified")]
    BatchLocked,

    /// The application is not ready for the requested status.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Application not found.
    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. }
            | Self::NotEditable { .. }
            | Self::BatchLocked
            | Self::Validation(_) => 400,
            Self::ApplicationNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotEditable { .. } => "APPLICATION_NOT_EDITABLE",
            Self::BatchLocked => "BATCH_LOCKED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: ApplicationStatus::Draft,
            to: ApplicationStatus::Accepted,
            actor: Actor::Applicant,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(
            err.to_string(),
            "Invalid status transition from draft to accepted by applicant"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = WorkflowError::ApplicationNotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "APPLICATION_NOT_FOUND");
    }

    #[test]
    fn test_batch_locked_error() {
        assert_eq!(WorkflowError::BatchLocked.status_code(), 400);
        assert_eq!(WorkflowError::BatchLocked.error_code(), "BATCH_LOCKED");
    }
}

//! Application error types.

use thiserror::Error;
use uuid::Uuid;

use super::types::ApplicationStatus;
use crate::validation::ValidationErrors;

/// Errors raised while reading or changing applications.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Application not found, or not visible to the caller.
    #[error("Application {0} not found")]
    NotFound(Uuid),

    /// Company not found.
    #[error("Company {0} not found")]
    CompanyNotFound(Uuid),

    /// Field validation failed.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The caller may not edit the application in its current status.
    #[error("Application can not be modified in status {0}")]
    NotEditable(ApplicationStatus),

    /// Handler assignment not allowed in the current status.
    #[error("Handler can not be changed in status {0}")]
    HandlerChangeNotAllowed(ApplicationStatus),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ApplicationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::CompanyNotFound(_) => 404,
            Self::Validation(_) | Self::NotEditable(_) | Self::HandlerChangeNotAllowed(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "APPLICATION_NOT_FOUND",
            Self::CompanyNotFound(_) => "COMPANY_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotEditable(_) => "APPLICATION_NOT_EDITABLE",
            Self::HandlerChangeNotAllowed(_) => "HANDLER_CHANGE_NOT_ALLOWED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ValidationErrors> for ApplicationError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

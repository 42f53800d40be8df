//! Calculation error types.

use thiserror::Error;
use uuid::Uuid;

use crate::application::ApplicationStatus;
use crate::validation::ValidationErrors;

/// Errors from calculating or storing a benefit calculation.
#[derive(Debug, Error)]
pub enum CalculationError {
    /// Input is not valid.
    #[error("Invalid calculation: {0}")]
    Validation(ValidationErrors),

    /// Application does not exist.
    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    /// Calculation only changes while the application is handled.
    #[error("Calculation can not be changed when the application is {0}")]
    NotEditable(ApplicationStatus),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CalculationError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::NotEditable(_) => 400,
            Self::ApplicationNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotEditable(_) => "NOT_EDITABLE",
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<ValidationErrors> for CalculationError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

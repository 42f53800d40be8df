//! Mapping of domain errors to HTTP responses.
//!
//! Bodies are `{"error": CODE, "message": text}`. Validation errors add a
//! `fields` map and batch errors add the `errorKey` frontends branch on.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};

use benefit_core::ValidationErrors;
use benefit_core::application::ApplicationError;
use benefit_core::attachment::AttachmentError;
use benefit_core::batch::BatchError;
use benefit_core::calculator::CalculationError;
use benefit_core::export::ExportError;
use benefit_core::workflow::WorkflowError;
use benefit_shared::AppError;
use benefit_shared::case_system::CaseSystemError;

/// An error ready to be rendered as a response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Option<ValidationErrors>,
    error_key: Option<&'static str>,
}

impl ApiError {
    /// Creates an error with a status, code, and message.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: None,
            error_key: None,
        }
    }

    /// 401 with the given code.
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// 403.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// 400 for a malformed request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 400 carrying field errors.
    #[must_use]
    pub fn validation(fields: ValidationErrors) -> Self {
        Self {
            fields: Some(fields),
            ..Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Validation failed")
        }
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(code = self.code, error = %self.message, "request failed");
            "An error occurred".to_string()
        } else {
            self.message
        };

        let mut body = Map::new();
        body.insert("error".into(), Value::from(self.code));
        body.insert("message".into(), Value::from(message));
        if let Some(fields) = self.fields {
            body.insert("fields".into(), json!(fields));
        }
        if let Some(key) = self.error_key {
            body.insert("errorKey".into(), Value::from(key));
        }

        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Validation(fields) => Self::validation(fields),
            other => Self::from_parts(other.status_code(), other.error_code(), other.to_string()),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Validation(fields) => Self::validation(fields),
            other => Self::from_parts(other.status_code(), other.error_code(), other.to_string()),
        }
    }
}

impl From<CalculationError> for ApiError {
    fn from(e: CalculationError) -> Self {
        match e {
            CalculationError::Validation(fields) => Self::validation(fields),
            other => Self::from_parts(other.status_code(), other.error_code(), other.to_string()),
        }
    }
}

impl From<BatchError> for ApiError {
    fn from(e: BatchError) -> Self {
        let error_key = e.error_key();
        Self {
            error_key,
            ..Self::from_parts(e.status_code(), e.error_code(), e.to_string())
        }
    }
}

impl From<AttachmentError> for ApiError {
    fn from(e: AttachmentError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        Self::from_parts(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<CaseSystemError> for ApiError {
    fn from(e: CaseSystemError) -> Self {
        AppError::ExternalService(e.to_string()).into()
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::Database(e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use uuid::Uuid;

    use super::*;

    async fn body_json(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_carries_fields() {
        let fields = ValidationErrors::single("employee.monthly_pay", "Must be positive");
        let (status, body) = body_json(ApplicationError::Validation(fields).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["employee.monthly_pay"][0], "Must be positive");
    }

    #[tokio::test]
    async fn test_batch_error_carries_error_key() {
        let (status, body) = body_json(BatchError::DraftAlreadyExists.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorKey"], "batchInvalidDraftAlreadyExists");
        assert!(body.get("fields").is_none());
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) =
            body_json(BatchError::Database("connection refused".into()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An error occurred");
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let id = Uuid::nil();
        let (status, body) = body_json(ApplicationError::NotFound(id).into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], format!("Application {id} not found"));
    }

    #[tokio::test]
    async fn test_case_system_failure_is_bad_gateway() {
        let error: ApiError = CaseSystemError::Request("timed out".into()).into();
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.code(), "EXTERNAL_SERVICE_ERROR");
    }
}

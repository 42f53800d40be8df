//! Inbound routes for the case system: callbacks and attachment downloads.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use benefit_core::attachment::AttachmentError;
use benefit_db::{AttachmentRepository, CaseSystemRepository, OpenedCase};

use crate::{AppState, error::ApiError, middleware::CaseSystemAuth, routes::attachments};

/// Creates the case system routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/case-system/callback/{application_id}", post(case_callback))
        .route("/case-system/attachments/{id}", get(case_attachment))
}

/// Outcome reported by the case system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CallbackMessage {
    /// The case was opened.
    Success,
    /// The request was rejected.
    Failure,
}

/// Callback body. Every field is required, also on failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCallbackRequest {
    /// Outcome.
    pub message: CallbackMessage,
    /// Id of the original open-case request.
    pub request_id: Uuid,
    /// Case id.
    pub case_id: String,
    /// Case guid.
    pub case_guid: Uuid,
}

/// POST `/case-system/callback/{application_id}`
async fn case_callback(
    State(state): State<AppState>,
    _auth: CaseSystemAuth,
    Path(application_id): Path<Uuid>,
    payload: Result<Json<CaseCallbackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    if payload.message == CallbackMessage::Failure {
        error!(
            %application_id,
            request_id = %payload.request_id,
            "Case system callback reported failure"
        );
        return Ok(Json(json!({"message": "Callback received but unsuccessful"})));
    }

    let case_id = payload.case_id.trim();
    if case_id.is_empty() {
        return Err(ApiError::bad_request("caseId must not be blank"));
    }

    CaseSystemRepository::new((*state.db).clone())
        .apply_callback(
            application_id,
            &OpenedCase {
                request_id: payload.request_id,
                case_id: case_id.to_string(),
                case_guid: payload.case_guid,
            },
        )
        .await?;

    info!(%application_id, "Case system callback applied");
    Ok(Json(json!({"message": "Callback received"})))
}

/// GET `/case-system/attachments/{id}`
async fn case_attachment(
    State(state): State<AppState>,
    _auth: CaseSystemAuth,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let attachment = AttachmentRepository::new(
        (*state.db).clone(),
        state.config.benefit.association_form_codes.clone(),
    )
    .find_unscoped(id)
    .await?
    .ok_or(AttachmentError::NotFound(id))?;

    let content = state
        .storage
        .read(&attachment.storage_key)
        .await
        .map_err(AttachmentError::from)?;
    Ok(attachments::file_response(&attachment, content))
}

//! Decision batch routes, for handlers only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use benefit_core::application::ApplicationStatus;
use benefit_core::batch::{Batch, BatchStatus, Decision, DecisionFields};
use benefit_core::export::{batch_documents, zip_documents};
use benefit_db::{BatchRepository, CaseSystemRepository};
use benefit_shared::case_system::OpenCaseRequest;

use crate::{AppState, error::ApiError, middleware::AuthUser, routes::attachments};

/// Creates the batch routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/batches", get(list_batches))
        .route("/batches/assign-applications", patch(assign_applications))
        .route("/batches/{id}", get(get_batch).delete(delete_batch))
        .route(
            "/batches/{id}/deassign-applications",
            patch(deassign_applications),
        )
        .route("/batches/{id}/status", patch(change_status))
        .route("/batches/{id}/export", get(export_batch))
        .route("/batches/{id}/send-to-case-system", post(send_to_case_system))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing batches.
#[derive(Debug, Default, Deserialize)]
pub struct ListBatchesQuery {
    /// Filter by status.
    pub status: Option<BatchStatus>,
}

/// A batch with its member application ids.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// The batch.
    #[serde(flatten)]
    pub batch: Batch,
    /// Decision made on the batch, if any.
    pub decision: Option<Decision>,
    /// Member applications.
    pub applications: Vec<Uuid>,
}

/// Request body for attaching applications to the draft batch.
#[derive(Debug, Deserialize)]
pub struct AssignApplicationsRequest {
    /// Accepted or rejected.
    pub status: ApplicationStatus,
    /// Applications to attach.
    pub application_ids: Vec<Uuid>,
}

/// Request body for detaching applications.
#[derive(Debug, Deserialize)]
pub struct DeassignApplicationsRequest {
    /// Applications to detach.
    pub application_ids: Vec<Uuid>,
}

/// Response for detaching applications.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeassignApplicationsResponse {
    /// Number of members left in the batch. The batch is gone when this is zero.
    pub remaining_apps: usize,
}

/// Request body for a batch status change.
#[derive(Debug, Deserialize)]
pub struct ChangeBatchStatusRequest {
    /// Target status.
    pub status: BatchStatus,
    /// Decision details to store with the change.
    #[serde(flatten)]
    pub decision_fields: DecisionFields,
}

/// Response for a batch status change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatusResponse {
    /// Batch id.
    pub id: Uuid,
    /// New status.
    pub status: BatchStatus,
    /// Status before the change.
    pub previous_status: BatchStatus,
    /// Decision made on the batch, if any.
    pub decision: Option<Decision>,
}

/// Result of pushing a batch to the case system.
#[derive(Debug, Default, Serialize)]
pub struct SendToCaseSystemResponse {
    /// Applications for which a case was requested.
    pub sent: Vec<Uuid>,
    /// Applications that already have a case.
    pub skipped: Vec<Uuid>,
    /// Applications whose request failed.
    pub failed: Vec<Uuid>,
}

fn repository(state: &AppState) -> BatchRepository {
    BatchRepository::new(
        (*state.db).clone(),
        state.config.benefit.association_form_codes.clone(),
    )
}

fn batch_response(batch: Batch, applications: Vec<Uuid>) -> BatchResponse {
    BatchResponse {
        decision: batch.decision(),
        batch,
        applications,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/batches`
async fn list_batches(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListBatchesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let batches = repository(&state).list(query.status).await?;
    Ok(Json(batches))
}

/// GET `/batches/{id}`
async fn get_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let details = repository(&state).get(id).await?;
    Ok(Json(batch_response(details.batch, details.application_ids)))
}

/// DELETE `/batches/{id}`
async fn delete_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    repository(&state).delete(id).await?;

    info!(batch_id = %id, "Batch deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/batches/assign-applications`
async fn assign_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AssignApplicationsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let details = repository(&state)
        .assign_applications(payload.status, &payload.application_ids, auth.user_id())
        .await?;

    info!(
        batch_id = %details.batch.id,
        members = details.application_ids.len(),
        "Applications assigned to batch"
    );
    Ok(Json(batch_response(details.batch, details.application_ids)))
}

/// PATCH `/batches/{id}/deassign-applications`
async fn deassign_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeassignApplicationsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let remaining = repository(&state)
        .deassign_applications(id, &payload.application_ids)
        .await?;

    info!(batch_id = %id, remaining = remaining.len(), "Applications detached from batch");
    Ok(Json(DeassignApplicationsResponse {
        remaining_apps: remaining.len(),
    }))
}

/// PATCH `/batches/{id}/status`
async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeBatchStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let (batch, change) = repository(&state)
        .change_status(id, payload.status, &payload.decision_fields)
        .await?;

    info!(batch_id = %id, from = %change.from, to = %change.to, "Batch status changed");
    Ok(Json(BatchStatusResponse {
        id,
        status: change.to,
        previous_status: change.from,
        decision: batch.decision(),
    }))
}

/// GET `/batches/{id}/export`
///
/// Returns the decision documents as a zip file.
async fn export_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let export = repository(&state).export(id).await?;

    let documents = batch_documents(
        &export.applications,
        export.batch.proposal_for_decision,
        &export.batch.decision_fields,
    );
    let archive = zip_documents(&documents)?;

    info!(
        batch_id = %id,
        applications = export.applications.len(),
        documents = documents.len(),
        "Batch exported"
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"batch_{id}.zip\""),
            ),
        ],
        archive,
    ))
}

/// POST `/batches/{id}/send-to-case-system`
///
/// Requests a case for every member that has none yet. A failure for one
/// application does not stop the others.
async fn send_to_case_system(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let batch = repository(&state).with_applications(id).await?;
    let statuses = CaseSystemRepository::new((*state.db).clone());
    let files = attachments::service(&state);

    let mut result = SendToCaseSystemResponse::default();
    for application in &batch.applications {
        if application.case_id.is_some() {
            result.skipped.push(application.id);
            continue;
        }

        let attachment_urls = files
            .list(application.id)
            .await?
            .iter()
            .map(|a| state.case_system.attachment_url(a.id))
            .collect();
        let request = OpenCaseRequest {
            application_id: application.id,
            application_number: application.application_number,
            title: format!(
                "Helsinki-lisä, {} ({})",
                application.company.name, application.application_number
            ),
            company_name: application.company.name.clone(),
            business_id: application.company.business_id.clone(),
            callback_url: state.case_system.callback_url(application.id),
            attachment_urls,
        };

        match state.case_system.open_case(&request).await {
            Ok(request_id) => {
                statuses
                    .record_request_sent(application.id, request_id)
                    .await?;
                result.sent.push(application.id);
            }
            Err(e) => {
                warn!(error = %e, application_id = %application.id, "Open case request failed");
                result.failed.push(application.id);
            }
        }
    }

    info!(
        batch_id = %id,
        sent = result.sent.len(),
        skipped = result.skipped.len(),
        failed = result.failed.len(),
        "Batch sent to case system"
    );
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deassign_response_reports_member_count() {
        let json = serde_json::to_value(DeassignApplicationsResponse { remaining_apps: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({"remainingApps": 2}));
    }

    #[test]
    fn test_status_response_is_camel_case() {
        let json = serde_json::to_value(BatchStatusResponse {
            id: Uuid::nil(),
            status: BatchStatus::AwaitingDecision,
            previous_status: BatchStatus::ReportCreated,
            decision: None,
        })
        .unwrap();
        assert!(json.get("previousStatus").is_some());
    }
}

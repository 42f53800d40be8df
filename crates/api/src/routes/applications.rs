//! Application routes: drafts, field updates, status changes, and handler assignment.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use benefit_core::application::{
    Address, Application, ApplicationFields, ApplicationStatus, BenefitType,
    available_benefit_types,
};
use benefit_core::attachment::AttachmentRequirements;
use benefit_db::{ApplicationFilter, ApplicationRepository};
use benefit_shared::types::{PageRequest, PageResponse};

use crate::{AppState, error::ApiError, middleware::AuthUser, routes::attachments};

/// Creates the application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/applications/{id}",
            get(get_application)
                .put(update_application)
                .delete(delete_application),
        )
        .route("/applications/{id}/status", patch(change_status))
        .route("/applications/{id}/handler", patch(change_handler))
        .route("/applications/{id}/benefit-types", get(benefit_types))
        .route(
            "/applications/{id}/attachment-requirements",
            get(attachment_requirements),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing applications.
#[derive(Debug, Default, Deserialize)]
pub struct ListApplicationsQuery {
    /// Filter by status.
    pub status: Option<ApplicationStatus>,
    /// Filter by batch.
    pub batch: Option<Uuid>,
    /// Filter by archived flag.
    pub archived: Option<bool>,
    /// Page number, from 1.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    /// Target status.
    pub status: ApplicationStatus,
    /// Optional comment stored in the log entry.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Request body for handler assignment. `null` unassigns.
#[derive(Debug, Deserialize)]
pub struct ChangeHandlerRequest {
    /// Handler to assign.
    pub handler_id: Option<Uuid>,
}

/// An application with its derived values.
#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    /// The application.
    #[serde(flatten)]
    pub application: Application,
    /// Manual amount when set, otherwise the calculated amount.
    pub benefit_amount: Option<Decimal>,
    /// Alternative address when selected, otherwise the company address.
    pub effective_address: Address,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        Self {
            benefit_amount: application.benefit_amount(),
            effective_address: application.effective_address().clone(),
            application,
        }
    }
}

/// Response for a status change.
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    /// Application id.
    pub id: Uuid,
    /// New status.
    pub status: ApplicationStatus,
    /// Status before the change.
    pub previous_status: ApplicationStatus,
}

fn repository(state: &AppState) -> ApplicationRepository {
    ApplicationRepository::new((*state.db).clone(), state.config.benefit.clone())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/applications`
///
/// Applicants see their own company; handlers see every company.
async fn list_applications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = ApplicationFilter {
        company_id: auth.company_scope()?,
        status: query.status,
        batch_id: query.batch,
        archived: query.archived,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    }
    .normalized();

    let (applications, total) = repository(&state).list(&filter, &page).await?;
    let data = applications
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();
    Ok(Json(PageResponse::new(data, &page, total)))
}

/// POST `/applications`
async fn create_application(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let company_id = auth.require_applicant()?;
    let application = repository(&state).create(company_id).await?;

    info!(
        application_id = %application.id,
        application_number = application.application_number,
        %company_id,
        "Application created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

/// GET `/applications/{id}`
async fn get_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let application = repository(&state).find(id, auth.company_scope()?).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

/// PUT `/applications/{id}`
///
/// Attachments that no longer fit the new fields are removed.
async fn update_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(fields): Json<ApplicationFields>,
) -> Result<impl IntoResponse, ApiError> {
    let (application, purged) = repository(&state)
        .update_fields(id, auth.company_scope()?, auth.actor(), fields)
        .await?;

    if !purged.is_empty() {
        info!(application_id = %id, count = purged.len(), "Purged invalid attachments");
        attachments::service(&state).remove_files(&purged).await;
    }
    Ok(Json(ApplicationResponse::from(application)))
}

/// DELETE `/applications/{id}`
async fn delete_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let company_id = auth.require_applicant()?;
    let removed = repository(&state).delete_draft(id, Some(company_id)).await?;
    attachments::service(&state).remove_files(&removed).await;

    info!(application_id = %id, "Draft deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/applications/{id}/status`
async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let (application, change) = repository(&state)
        .change_status(
            id,
            auth.company_scope()?,
            auth.actor(),
            payload.status,
            comment,
        )
        .await?;

    info!(
        application_id = %id,
        from = %change.from,
        to = %change.to,
        actor = %change.actor,
        "Application status changed"
    );
    notify_status_change(&state, &application).await;

    Ok(Json(StatusChangeResponse {
        id,
        status: change.to,
        previous_status: change.from,
    }))
}

async fn notify_status_change(state: &AppState, application: &Application) {
    let Some(email) = application.fields.company_contact_person_email.as_deref() else {
        return;
    };
    if let Err(e) = state
        .email_service
        .send_status_change(
            email,
            application.application_number,
            &application.company.name,
            application.status.as_str(),
        )
        .await
    {
        warn!(error = %e, application_id = %application.id, "Failed to send status email");
    }
}

/// PATCH `/applications/{id}/handler`
async fn change_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeHandlerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let application = repository(&state).set_handler(id, payload.handler_id).await?;

    info!(application_id = %id, handler_id = ?payload.handler_id, "Handler changed");
    Ok(Json(ApplicationResponse::from(application)))
}

/// GET `/applications/{id}/benefit-types`
async fn benefit_types(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let application = repository(&state).find(id, auth.company_scope()?).await?;
    let types: Vec<BenefitType> = available_benefit_types(
        application.organization_type,
        application.fields.association_has_business_activities,
        application.fields.apprenticeship_program,
    );
    Ok(Json(types))
}

/// GET `/applications/{id}/attachment-requirements`
async fn attachment_requirements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let application = repository(&state).find(id, auth.company_scope()?).await?;
    Ok(Json(AttachmentRequirements::for_fields(&application.fields)))
}

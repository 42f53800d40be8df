//! Attachment routes: multipart upload, listing, download, and deletion.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use benefit_core::attachment::{Attachment, AttachmentService, AttachmentType, UploadInput};
use benefit_db::{ApplicationRepository, AttachmentRepository};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the attachment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications/{id}/attachments",
            get(list_attachments).post(upload_attachment),
        )
        .route(
            "/applications/{id}/attachments/{attachment_id}",
            get(download_attachment).delete(delete_attachment),
        )
}

/// Attachment service bound to the database repository.
pub(crate) fn service(state: &AppState) -> AttachmentService<AttachmentRepository> {
    let repo = AttachmentRepository::new(
        (*state.db).clone(),
        state.config.benefit.association_form_codes.clone(),
    );
    AttachmentService::new(
        state.storage.clone(),
        Arc::new(repo),
        state.config.benefit.max_upload_size,
    )
}

/// Response with the file content and its original name.
pub(crate) fn file_response(attachment: &Attachment, content: Bytes) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment.file_name.replace('"', "")
    );
    (
        [
            (header::CONTENT_TYPE, attachment.content_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(content),
    )
        .into_response()
}

/// Checks that the caller can see the application.
async fn visible_application(
    state: &AppState,
    auth: &AuthUser,
    application_id: Uuid,
) -> Result<(), ApiError> {
    ApplicationRepository::new((*state.db).clone(), state.config.benefit.clone())
        .find(application_id, auth.company_scope()?)
        .await?;
    Ok(())
}

struct UploadForm {
    attachment_type: AttachmentType,
    file_name: String,
    content_type: String,
    content: Bytes,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut attachment_type = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("attachment_type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                let parsed = AttachmentType::parse(value.trim()).ok_or_else(|| {
                    ApiError::bad_request(format!("Unknown attachment type: {value}"))
                })?;
                attachment_type = Some(parsed);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                file = Some((file_name, content_type, content));
            }
            _ => {}
        }
    }

    let attachment_type =
        attachment_type.ok_or_else(|| ApiError::bad_request("attachment_type is required"))?;
    let (file_name, content_type, content) =
        file.ok_or_else(|| ApiError::bad_request("file is required"))?;

    Ok(UploadForm {
        attachment_type,
        file_name,
        content_type,
        content,
    })
}

/// POST `/applications/{id}/attachments`
async fn upload_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    visible_application(&state, &auth, application_id).await?;
    let form = read_upload_form(multipart).await?;

    let attachment = service(&state)
        .upload(UploadInput {
            application_id,
            attachment_type: form.attachment_type,
            file_name: form.file_name,
            content_type: form.content_type,
            content: form.content,
            actor: auth.actor(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

/// GET `/applications/{id}/attachments`
async fn list_attachments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    visible_application(&state, &auth, application_id).await?;
    let attachments = service(&state).list(application_id).await?;
    Ok(Json(attachments))
}

/// GET `/applications/{id}/attachments/{attachment_id}`
async fn download_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((application_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    visible_application(&state, &auth, application_id).await?;
    let (attachment, content) = service(&state)
        .download(attachment_id, application_id)
        .await?;
    Ok(file_response(&attachment, content))
}

/// DELETE `/applications/{id}/attachments/{attachment_id}`
async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((application_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    visible_application(&state, &auth, application_id).await?;
    service(&state)
        .delete(attachment_id, application_id, auth.actor())
        .await?;

    info!(%application_id, %attachment_id, "Attachment deleted");
    Ok(StatusCode::NO_CONTENT)
}

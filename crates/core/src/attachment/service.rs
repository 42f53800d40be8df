//! Attachment service implementation.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use super::error::AttachmentError;
use super::requirements::AttachmentRequirements;
use super::types::{Attachment, CreateAttachmentInput, UploadInput};
use crate::application::Application;
use crate::storage::{StorageService, storage_key};
use crate::workflow::{Actor, WorkflowService};

/// Maximum number of attachments on one application.
pub const MAX_ATTACHMENTS: u64 = 20;

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["application/pdf", "image/png", "image/jpeg"];

/// Repository trait for attachment persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait AttachmentRepository: Send + Sync {
    /// Load the owning application.
    fn find_application(
        &self,
        application_id: Uuid,
    ) -> impl Future<Output = Result<Option<Application>, AttachmentError>> + Send;

    /// Number of attachments on an application.
    fn count_by_application(
        &self,
        application_id: Uuid,
    ) -> impl Future<Output = Result<u64, AttachmentError>> + Send;

    /// Create a new attachment record.
    fn create(
        &self,
        input: CreateAttachmentInput,
    ) -> impl Future<Output = Result<Attachment, AttachmentError>> + Send;

    /// Find attachment by ID within an application.
    fn find_by_id(
        &self,
        id: Uuid,
        application_id: Uuid,
    ) -> impl Future<Output = Result<Option<Attachment>, AttachmentError>> + Send;

    /// List attachments of an application.
    fn list_by_application(
        &self,
        application_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Attachment>, AttachmentError>> + Send;

    /// Delete attachment by ID.
    fn delete(
        &self,
        id: Uuid,
        application_id: Uuid,
    ) -> impl Future<Output = Result<bool, AttachmentError>> + Send;
}

/// Attachment service for managing file attachments.
pub struct AttachmentService<R: AttachmentRepository> {
    storage: Arc<StorageService>,
    repo: Arc<R>,
    max_upload_size: u64,
}

impl<R: AttachmentRepository> AttachmentService<R> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(storage: Arc<StorageService>, repo: Arc<R>, max_upload_size: u64) -> Self {
        Self {
            storage,
            repo,
            max_upload_size,
        }
    }

    /// Checks size and content before anything is stored.
    pub fn validate_file(&self, content_type: &str, content: &[u8]) -> Result<(), AttachmentError> {
        let size = content.len() as u64;
        if size == 0 {
            return Err(AttachmentError::EmptyFile);
        }
        if size > self.max_upload_size {
            return Err(AttachmentError::FileTooLarge {
                size,
                max: self.max_upload_size,
            });
        }
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(AttachmentError::InvalidContentType(content_type.to_string()));
        }
        let detected = infer::get(content).map(|kind| kind.mime_type());
        if detected != Some(content_type) {
            return Err(AttachmentError::ContentMismatch {
                declared: content_type.to_string(),
            });
        }
        Ok(())
    }

    /// Store a new attachment.
    ///
    /// The file goes to storage first; if the record can not be created the
    /// stored object is removed again.
    pub async fn upload(&self, input: UploadInput) -> Result<Attachment, AttachmentError> {
        let application = self.editable_application(input.application_id, input.actor).await?;

        let requirements = AttachmentRequirements::for_fields(&application.fields);
        if !requirements.allows(input.attachment_type) {
            return Err(AttachmentError::TypeNotAllowed(input.attachment_type));
        }

        let count = self.repo.count_by_application(application.id).await?;
        if count >= MAX_ATTACHMENTS {
            return Err(AttachmentError::TooMany {
                max: MAX_ATTACHMENTS,
            });
        }

        self.validate_file(&input.content_type, &input.content)?;

        let id = Uuid::new_v4();
        let key = storage_key(application.id, id, &input.file_name);
        let file_size = i64::try_from(input.content.len())
            .map_err(|_| AttachmentError::FileTooLarge {
                size: input.content.len() as u64,
                max: self.max_upload_size,
            })?;
        self.storage.write(&key, input.content).await?;

        let created = self
            .repo
            .create(CreateAttachmentInput {
                id,
                application_id: application.id,
                attachment_type: input.attachment_type,
                file_name: input.file_name,
                content_type: input.content_type,
                file_size,
                storage_key: key.clone(),
            })
            .await;

        match created {
            Ok(attachment) => {
                tracing::info!(
                    attachment_id = %attachment.id,
                    application_id = %attachment.application_id,
                    attachment_type = %attachment.attachment_type,
                    "Attachment uploaded"
                );
                Ok(attachment)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::warn!(error = %cleanup, key = %key, "Failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    /// Read an attachment with its content.
    pub async fn download(
        &self,
        attachment_id: Uuid,
        application_id: Uuid,
    ) -> Result<(Attachment, Bytes), AttachmentError> {
        let attachment = self.get_by_id(attachment_id, application_id).await?;
        let content = self.storage.read(&attachment.storage_key).await?;
        Ok((attachment, content))
    }

    /// Delete an attachment.
    ///
    /// This removes both the database record and the storage object.
    pub async fn delete(
        &self,
        attachment_id: Uuid,
        application_id: Uuid,
        actor: Actor,
    ) -> Result<(), AttachmentError> {
        self.editable_application(application_id, actor).await?;
        let attachment = self.get_by_id(attachment_id, application_id).await?;

        self.repo.delete(attachment_id, application_id).await?;

        if let Err(e) = self.storage.delete(&attachment.storage_key).await {
            tracing::warn!(error = %e, key = %attachment.storage_key, "Failed to remove stored file");
        }

        Ok(())
    }

    /// Remove storage objects of records already deleted by the caller.
    pub async fn remove_files(&self, attachments: &[Attachment]) {
        for attachment in attachments {
            if let Err(e) = self.storage.delete(&attachment.storage_key).await {
                tracing::warn!(error = %e, key = %attachment.storage_key, "Failed to remove stored file");
            }
        }
    }

    /// List attachments of an application.
    pub async fn list(&self, application_id: Uuid) -> Result<Vec<Attachment>, AttachmentError> {
        self.repo.list_by_application(application_id).await
    }

    /// Get attachment by ID.
    pub async fn get_by_id(
        &self,
        attachment_id: Uuid,
        application_id: Uuid,
    ) -> Result<Attachment, AttachmentError> {
        self.repo
            .find_by_id(attachment_id, application_id)
            .await?
            .ok_or(AttachmentError::NotFound(attachment_id))
    }

    async fn editable_application(
        &self,
        application_id: Uuid,
        actor: Actor,
    ) -> Result<Application, AttachmentError> {
        let application = self
            .repo
            .find_application(application_id)
            .await?
            .ok_or(AttachmentError::ApplicationNotFound(application_id))?;

        if !WorkflowService::is_editable_by(application.status, actor) {
            return Err(AttachmentError::NotEditable(application.status));
        }
        Ok(application)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

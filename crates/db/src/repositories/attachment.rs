//! Attachment repository for database operations.
//!
//! Implements the attachment store used by `AttachmentService`.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use benefit_core::application::Application;
use benefit_core::attachment::{
    Attachment, AttachmentError, AttachmentRepository as AttachmentRepoTrait,
    CreateAttachmentInput,
};

use super::convert::{application_to_domain, attachment_to_domain, now, to_db_attachment_type};
use crate::entities::{applications, attachments};

/// Attachment repository implementation.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    db: DatabaseConnection,
    association_form_codes: Vec<i32>,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, association_form_codes: Vec<i32>) -> Self {
        Self {
            db,
            association_form_codes,
        }
    }

    /// Finds an attachment by id alone.
    ///
    /// Used when the case system fetches files by link.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_unscoped(&self, id: Uuid) -> Result<Option<Attachment>, AttachmentError> {
        let model = attachments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(model.map(attachment_to_domain))
    }
}

impl AttachmentRepoTrait for AttachmentRepository {
    async fn find_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, AttachmentError> {
        let model = applications::Entity::find_by_id(application_id)
            .one(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        model
            .map(|m| application_to_domain(m, &self.association_form_codes))
            .transpose()
            .map_err(AttachmentError::repository)
    }

    async fn count_by_application(&self, application_id: Uuid) -> Result<u64, AttachmentError> {
        attachments::Entity::find()
            .filter(attachments::Column::ApplicationId.eq(application_id))
            .count(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))
    }

    async fn create(&self, input: CreateAttachmentInput) -> Result<Attachment, AttachmentError> {
        let active_model = attachments::ActiveModel {
            id: Set(input.id),
            application_id: Set(input.application_id),
            attachment_type: Set(to_db_attachment_type(input.attachment_type)),
            file_name: Set(input.file_name),
            content_type: Set(input.content_type),
            file_size: Set(input.file_size),
            storage_key: Set(input.storage_key),
            created_at: Set(now()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(attachment_to_domain(model))
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        application_id: Uuid,
    ) -> Result<Option<Attachment>, AttachmentError> {
        let model = attachments::Entity::find_by_id(id)
            .filter(attachments::Column::ApplicationId.eq(application_id))
            .one(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(model.map(attachment_to_domain))
    }

    async fn list_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<Attachment>, AttachmentError> {
        let models = attachments::Entity::find()
            .filter(attachments::Column::ApplicationId.eq(application_id))
            .order_by_asc(attachments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(models.into_iter().map(attachment_to_domain).collect())
    }

    async fn delete(&self, id: Uuid, application_id: Uuid) -> Result<bool, AttachmentError> {
        let result = attachments::Entity::delete_many()
            .filter(attachments::Column::Id.eq(id))
            .filter(attachments::Column::ApplicationId.eq(application_id))
            .exec(&self.db)
            .await
            .map_err(|e| AttachmentError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

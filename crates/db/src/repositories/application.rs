//! Application repository for database operations.
//!
//! Every mutation runs in one transaction together with its side effects:
//! attachment purges on field updates, and log entries, case system status
//! records, and batch detachment on status changes.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use benefit_core::application::{
    Application, ApplicationError, ApplicationFields, ApplicationStatus, OrganizationType,
    RuleContext, can_assign_handler, can_unassign_handler, validate_fields,
    validate_for_submission,
};
use benefit_core::attachment::{Attachment, AttachmentRequirements};
use benefit_core::time;
use benefit_core::validation::ValidationErrors;
use benefit_core::workflow::{Actor, SideEffect, StatusChange, WorkflowError, WorkflowService};
use benefit_shared::config::BenefitConfig;
use benefit_shared::types::PageRequest;

use super::convert::{
    application_to_domain, attachment_to_domain, fields_to_json, from_db_application_status,
    from_db_attachment_type, from_db_batch_status, now, to_db_application_status,
};
use crate::entities::{
    application_batches, application_log_entries, applications, attachments,
    case_system_statuses, companies, sea_orm_active_enums::CaseSystemStatus,
};

/// Filters for listing applications.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    /// Only applications of this company.
    pub company_id: Option<Uuid>,
    /// Only applications in this status.
    pub status: Option<ApplicationStatus>,
    /// Only members of this batch.
    pub batch_id: Option<Uuid>,
    /// Archived or not.
    pub archived: Option<bool>,
}

/// Application repository.
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    db: DatabaseConnection,
    benefit: BenefitConfig,
}

impl ApplicationRepository {
    /// Creates a new application repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, benefit: BenefitConfig) -> Self {
        Self { db, benefit }
    }

    fn rule_context(&self, organization_type: OrganizationType) -> RuleContext {
        RuleContext {
            today: time::today(),
            organization_type,
            min_working_hours: Decimal::from(self.benefit.min_working_hours),
        }
    }

    fn to_domain(&self, model: applications::Model) -> Result<Application, ApplicationError> {
        application_to_domain(model, &self.benefit.association_form_codes)
            .map_err(ApplicationError::Database)
    }

    /// Creates a draft for a company, copying the company data into it.
    ///
    /// # Errors
    ///
    /// Returns `CompanyNotFound` if the company does not exist.
    pub async fn create(&self, company_id: Uuid) -> Result<Application, ApplicationError> {
        let company = companies::Entity::find_by_id(company_id)
            .one(&self.db)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .ok_or(ApplicationError::CompanyNotFound(company_id))?;

        let fields = ApplicationFields {
            company_bank_account_number: company.bank_account_number.clone(),
            ..ApplicationFields::default()
        };
        let timestamp = now();

        let model = applications::ActiveModel {
            id: Set(Uuid::new_v4()),
            status: Set(to_db_application_status(ApplicationStatus::Draft)),
            company_id: Set(company.id),
            company_name: Set(company.name),
            company_business_id: Set(company.business_id),
            company_form_code: Set(company.company_form_code),
            company_street_address: Set(company.street_address),
            company_postcode: Set(company.postcode),
            company_city: Set(company.city),
            fields: Set(fields_to_json(&fields).map_err(ApplicationError::Database)?),
            handler_id: Set(None),
            batch_id: Set(None),
            archived: Set(false),
            calculated_benefit_amount: Set(None),
            manual_benefit_amount: Set(None),
            case_id: Set(None),
            case_guid: Set(None),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| ApplicationError::Database(e.to_string()))?;

        tracing::info!(
            application_id = %model.id,
            application_number = model.application_number,
            %company_id,
            "application created"
        );
        self.to_domain(model)
    }

    /// Finds an application, optionally restricted to one company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it does not exist or belongs to another company.
    pub async fn find(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
    ) -> Result<Application, ApplicationError> {
        let model = find_model(&self.db, id, company_id)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .ok_or(ApplicationError::NotFound(id))?;
        self.to_domain(model)
    }

    /// Lists applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Application>, u64), ApplicationError> {
        let mut query = applications::Entity::find();
        if let Some(company_id) = filter.company_id {
            query = query.filter(applications::Column::CompanyId.eq(company_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(applications::Column::Status.eq(to_db_application_status(status)));
        }
        if let Some(batch_id) = filter.batch_id {
            query = query.filter(applications::Column::BatchId.eq(batch_id));
        }
        if let Some(archived) = filter.archived {
            query = query.filter(applications::Column::Archived.eq(archived));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        let models = query
            .order_by_desc(applications::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        let applications = models
            .into_iter()
            .map(|m| self.to_domain(m))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((applications, total))
    }

    /// Replaces the fields of an application.
    ///
    /// Attachments whose type is no longer allowed are deleted in the same
    /// transaction and returned so their files can be removed.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` when `actor` may not edit the application and
    /// `Validation` when the fields break a rule.
    pub async fn update_fields(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
        actor: Actor,
        fields: ApplicationFields,
    ) -> Result<(Application, Vec<Attachment>), ApplicationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        let model = find_model(&txn, id, company_id)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .ok_or(ApplicationError::NotFound(id))?;
        let current = self.to_domain(model.clone())?;

        if !WorkflowService::is_editable_by(current.status, actor) {
            return Err(ApplicationError::NotEditable(current.status));
        }
        validate_fields(&fields, &self.rule_context(current.organization_type))?;

        let existing: Vec<Attachment> = attachments::Entity::find()
            .filter(attachments::Column::ApplicationId.eq(id))
            .all(&txn)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .into_iter()
            .map(attachment_to_domain)
            .collect();
        let purge = AttachmentRequirements::for_fields(&fields).purge_invalid(&existing);
        if !purge.is_empty() {
            attachments::Entity::delete_many()
                .filter(attachments::Column::Id.is_in(purge.clone()))
                .exec(&txn)
                .await
                .map_err(|e| ApplicationError::Database(e.to_string()))?;
        }

        let mut active: applications::ActiveModel = model.into();
        active.fields = Set(fields_to_json(&fields).map_err(ApplicationError::Database)?);
        active.updated_at = Set(now());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        let purged: Vec<Attachment> = existing
            .into_iter()
            .filter(|a| purge.contains(&a.id))
            .collect();
        if !purged.is_empty() {
            tracing::info!(application_id = %id, count = purged.len(), "purged invalid attachments");
        }
        Ok((self.to_domain(updated)?, purged))
    }

    /// Deletes a draft application.
    ///
    /// Returns its attachments so their files can be removed.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` unless the application is a draft.
    pub async fn delete_draft(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
    ) -> Result<Vec<Attachment>, ApplicationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        let model = find_model(&txn, id, company_id)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .ok_or(ApplicationError::NotFound(id))?;
        let status = from_db_application_status(model.status);
        if status != ApplicationStatus::Draft {
            return Err(ApplicationError::NotEditable(status));
        }

        let files: Vec<Attachment> = attachments::Entity::find()
            .filter(attachments::Column::ApplicationId.eq(id))
            .all(&txn)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .into_iter()
            .map(attachment_to_domain)
            .collect();

        applications::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        tracing::info!(application_id = %id, "draft application deleted");
        Ok(files)
    }

    /// Moves an application to another status.
    ///
    /// The side effects of the transition are applied in the same
    /// transaction, and a log entry is written.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the workflow does not allow the change
    /// - `Validation` if submission fields or required attachments are missing
    /// - `BatchLocked` if the batch of a decided application can not change
    pub async fn change_status(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
        actor: Actor,
        to: ApplicationStatus,
        comment: Option<String>,
    ) -> Result<(Application, StatusChange), WorkflowError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let model = find_model(&txn, id, company_id)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::ApplicationNotFound(id))?;
        let application = application_to_domain(model.clone(), &self.benefit.association_form_codes)
            .map_err(WorkflowError::Database)?;

        let change = WorkflowService::transition(application.status, to, actor, comment)?;

        let mut errors = ValidationErrors::new();
        if change.requires(SideEffect::ValidateSubmission) {
            let ctx = self.rule_context(application.organization_type);
            if let Err(field_errors) = validate_for_submission(&application.fields, &ctx) {
                errors = field_errors;
            }
        }
        if change.requires(SideEffect::CheckAttachments) {
            let present: Vec<_> = attachments::Entity::find()
                .filter(attachments::Column::ApplicationId.eq(id))
                .all(&txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?
                .into_iter()
                .map(|a| from_db_attachment_type(a.attachment_type))
                .collect();
            let requirements = AttachmentRequirements::for_fields(&application.fields);
            for missing in requirements.missing_required(&present) {
                errors.add("attachments", format!("Required attachment {missing} is missing"));
            }
        }
        errors.into_result().map_err(WorkflowError::Validation)?;

        let mut active: applications::ActiveModel = model.into();
        if change.requires(SideEffect::DetachFromBatch)
            && let Some(batch_id) = application.batch_id
        {
            let batch = application_batches::Entity::find_by_id(batch_id)
                .one(&txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?;
            if let Some(batch) = batch {
                if !from_db_batch_status(batch.status).applications_can_be_modified() {
                    return Err(WorkflowError::BatchLocked);
                }
                active.batch_id = Set(None);
            }
        }
        if change.requires(SideEffect::RecordSubmission) {
            case_system_statuses::ActiveModel {
                id: Set(Uuid::new_v4()),
                application_id: Set(id),
                status: Set(CaseSystemStatus::SubmittedButNotSent),
                request_id: Set(None),
                created_at: Set(now()),
            }
            .insert(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;
        }

        active.status = Set(to_db_application_status(change.to));
        active.updated_at = Set(now());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        application_log_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            application_id: Set(id),
            from_status: Set(to_db_application_status(change.from)),
            to_status: Set(to_db_application_status(change.to)),
            actor: Set(change.actor.to_string()),
            comment: Set(change.comment.clone()),
            created_at: Set(now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| WorkflowError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        tracing::info!(
            application_id = %id,
            from = %change.from,
            to = %change.to,
            actor = %change.actor,
            "application status changed"
        );

        let application = application_to_domain(updated, &self.benefit.association_form_codes)
            .map_err(WorkflowError::Database)?;
        Ok((application, change))
    }

    /// Assigns a handler, or clears the assignment when `handler_id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `HandlerChangeNotAllowed` in statuses where the change is not allowed.
    pub async fn set_handler(
        &self,
        id: Uuid,
        handler_id: Option<Uuid>,
    ) -> Result<Application, ApplicationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        let model = find_model(&txn, id, None)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .ok_or(ApplicationError::NotFound(id))?;
        let status = from_db_application_status(model.status);
        let allowed = if handler_id.is_some() {
            can_assign_handler(status)
        } else {
            can_unassign_handler(status)
        };
        if !allowed {
            return Err(ApplicationError::HandlerChangeNotAllowed(status));
        }

        let mut active: applications::ActiveModel = model.into();
        active.handler_id = Set(handler_id);
        active.updated_at = Set(now());
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        self.to_domain(updated)
    }
}

async fn find_model<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    company_id: Option<Uuid>,
) -> Result<Option<applications::Model>, DbErr> {
    let mut query = applications::Entity::find_by_id(id);
    if let Some(company_id) = company_id {
        query = query.filter(applications::Column::CompanyId.eq(company_id));
    }
    query.one(conn).await
}

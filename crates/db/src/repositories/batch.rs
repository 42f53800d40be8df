//! Decision batch repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use benefit_core::application::{Application, ApplicationStatus};
use benefit_core::batch::{
    Batch, BatchError, BatchService, BatchStatus, BatchStatusChange, DecisionFields,
};
use benefit_core::time;

use super::convert::{
    application_to_domain, batch_to_domain, from_db_batch_status, now, set_decision_fields,
    to_db_application_status, to_db_batch_status, to_db_decision,
};
use crate::entities::{application_batches, applications};

/// A batch with the ids of its member applications.
#[derive(Debug, Clone)]
pub struct BatchDetails {
    /// The batch.
    pub batch: Batch,
    /// Member application ids.
    pub application_ids: Vec<Uuid>,
}

/// A batch with its member applications loaded.
#[derive(Debug, Clone)]
pub struct BatchWithApplications {
    /// The batch.
    pub batch: Batch,
    /// Member applications, ordered by application number.
    pub applications: Vec<Application>,
}

/// Decision batch repository.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    db: DatabaseConnection,
    association_form_codes: Vec<i32>,
}

impl BatchRepository {
    /// Creates a new batch repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, association_form_codes: Vec<i32>) -> Self {
        Self {
            db,
            association_form_codes,
        }
    }

    /// Lists batches, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, status: Option<BatchStatus>) -> Result<Vec<Batch>, BatchError> {
        let mut query = application_batches::Entity::find();
        if let Some(status) = status {
            query = query.filter(application_batches::Column::Status.eq(to_db_batch_status(status)));
        }

        let models = query
            .order_by_desc(application_batches::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        Ok(models.into_iter().map(batch_to_domain).collect())
    }

    /// Loads a batch with its member ids.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the batch does not exist.
    pub async fn get(&self, id: Uuid) -> Result<BatchDetails, BatchError> {
        let batch = find_batch(&self.db, id).await?;
        let application_ids = member_ids(&self.db, id)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        Ok(BatchDetails {
            batch: batch_to_domain(batch),
            application_ids,
        })
    }

    /// Adds decided applications to the draft batch of their decision.
    ///
    /// The draft is created when none exists. Only applications in `status`
    /// that are not yet batched are added.
    ///
    /// # Errors
    ///
    /// Returns `InvalidApplicationStatus` if `status` is not a decision or
    /// none of the applications could be added.
    pub async fn assign_applications(
        &self,
        status: ApplicationStatus,
        application_ids: &[Uuid],
        handler_id: Uuid,
    ) -> Result<BatchDetails, BatchError> {
        let proposal = BatchService::proposal_for(status)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        let existing = application_batches::Entity::find()
            .filter(application_batches::Column::Status.eq(to_db_batch_status(BatchStatus::Draft)))
            .filter(application_batches::Column::ProposalForDecision.eq(to_db_decision(proposal)))
            .one(&txn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        let batch = if let Some(batch) = existing {
            batch
        } else {
            let timestamp = now();
            application_batches::ActiveModel {
                id: Set(Uuid::new_v4()),
                status: Set(to_db_batch_status(BatchStatus::Draft)),
                proposal_for_decision: Set(to_db_decision(proposal)),
                handler_id: Set(Some(handler_id)),
                created_at: Set(timestamp),
                updated_at: Set(timestamp),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?
        };

        let result = applications::Entity::update_many()
            .col_expr(applications::Column::BatchId, Expr::value(batch.id))
            .col_expr(applications::Column::UpdatedAt, Expr::value(now()))
            .filter(applications::Column::Id.is_in(application_ids.to_vec()))
            .filter(applications::Column::Status.eq(to_db_application_status(status)))
            .filter(applications::Column::BatchId.is_null())
            .filter(applications::Column::Archived.eq(false))
            .exec(&txn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(BatchError::InvalidApplicationStatus);
        }

        let application_ids = member_ids(&txn, batch.id)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        tracing::info!(
            batch_id = %batch.id,
            added = result.rows_affected,
            proposal = %proposal,
            "applications assigned to batch"
        );
        Ok(BatchDetails {
            batch: batch_to_domain(batch),
            application_ids,
        })
    }

    /// Removes decided applications from a batch.
    ///
    /// The batch is deleted when its last member leaves. Returns the ids of
    /// the remaining members.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationsLocked` when the batch does not accept changes and
    /// `NothingToDetach` when none of the applications was a member.
    pub async fn deassign_applications(
        &self,
        id: Uuid,
        application_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, BatchError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        let batch = find_batch(&txn, id).await?;
        BatchService::ensure_applications_modifiable(from_db_batch_status(batch.status))?;

        let result = applications::Entity::update_many()
            .col_expr(applications::Column::BatchId, Expr::value(Option::<Uuid>::None))
            .col_expr(applications::Column::UpdatedAt, Expr::value(now()))
            .filter(applications::Column::BatchId.eq(id))
            .filter(applications::Column::Id.is_in(application_ids.to_vec()))
            .filter(applications::Column::Status.is_in([
                to_db_application_status(ApplicationStatus::Accepted),
                to_db_application_status(ApplicationStatus::Rejected),
            ]))
            .exec(&txn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(BatchError::NothingToDetach);
        }

        let remaining = member_ids(&txn, id)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;
        if remaining.is_empty() {
            application_batches::Entity::delete_by_id(id)
                .exec(&txn)
                .await
                .map_err(|e| BatchError::Database(e.to_string()))?;
            tracing::info!(batch_id = %id, "empty batch deleted");
        }

        txn.commit()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        Ok(remaining)
    }

    /// Moves a batch to another status.
    ///
    /// Decision fields from `update` are stored when the batch is decided.
    /// Members are archived when the batch goes to the payment system.
    ///
    /// # Errors
    ///
    /// Returns the `BatchError` of the violated rule.
    pub async fn change_status(
        &self,
        id: Uuid,
        to: BatchStatus,
        update: &DecisionFields,
    ) -> Result<(Batch, BatchStatusChange), BatchError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        let model = find_batch(&txn, id).await?;
        let current = batch_to_domain(model.clone());
        let change = BatchService::change_status(
            current.status,
            to,
            &current.decision_fields,
            update,
            time::today(),
        )?;

        if to == BatchStatus::Draft {
            let other_draft = application_batches::Entity::find()
                .filter(application_batches::Column::Id.ne(id))
                .filter(application_batches::Column::Status.eq(to_db_batch_status(BatchStatus::Draft)))
                .filter(application_batches::Column::ProposalForDecision.eq(model.proposal_for_decision))
                .count(&txn)
                .await
                .map_err(|e| BatchError::Database(e.to_string()))?;
            BatchService::ensure_single_draft(other_draft > 0)?;
        }

        let updated = apply_change(&txn, model, &change).await?;

        txn.commit()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        tracing::info!(
            batch_id = %id,
            from = %change.from,
            to = %change.to,
            "batch status changed"
        );
        Ok((updated, change))
    }

    /// Deletes a draft batch after detaching its members.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` unless the batch is a draft.
    pub async fn delete(&self, id: Uuid) -> Result<(), BatchError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        let batch = find_batch(&txn, id).await?;
        BatchService::ensure_deletable(from_db_batch_status(batch.status))?;

        applications::Entity::update_many()
            .col_expr(applications::Column::BatchId, Expr::value(Option::<Uuid>::None))
            .col_expr(applications::Column::UpdatedAt, Expr::value(now()))
            .filter(applications::Column::BatchId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        application_batches::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        tracing::info!(batch_id = %id, "batch deleted");
        Ok(())
    }

    /// Loads a batch with its members.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the batch does not exist.
    pub async fn with_applications(&self, id: Uuid) -> Result<BatchWithApplications, BatchError> {
        let batch = find_batch(&self.db, id).await?;
        let applications = self.members(&self.db, id).await?;
        Ok(BatchWithApplications {
            batch: batch_to_domain(batch),
            applications,
        })
    }

    /// Loads a batch for the decision export.
    ///
    /// A draft batch becomes `report_created`.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a batch without members and `NotExportable` in
    /// statuses that can not be exported.
    pub async fn export(&self, id: Uuid) -> Result<BatchWithApplications, BatchError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        let model = find_batch(&txn, id).await?;
        let applications = self.members(&txn, id).await?;
        let status = from_db_batch_status(model.status);
        let next = BatchService::export_status(status, applications.len() as u64)?;

        let batch = if next == status {
            batch_to_domain(model)
        } else {
            let mut active: application_batches::ActiveModel = model.into();
            active.status = Set(to_db_batch_status(next));
            active.updated_at = Set(now());
            let updated = active
                .update(&txn)
                .await
                .map_err(|e| BatchError::Database(e.to_string()))?;
            tracing::info!(batch_id = %id, from = %status, to = %next, "batch status changed");
            batch_to_domain(updated)
        };

        txn.commit()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        Ok(BatchWithApplications {
            batch,
            applications,
        })
    }

    /// Accepted batches waiting for the payment export, with their members.
    ///
    /// # Errors
    ///
    /// Returns `NothingToExport` when there are no accepted batches.
    pub async fn accepted_for_payment(&self) -> Result<Vec<BatchWithApplications>, BatchError> {
        let batches = application_batches::Entity::find()
            .filter(application_batches::Column::Status.eq(to_db_batch_status(BatchStatus::Accepted)))
            .order_by_asc(application_batches::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        if batches.is_empty() {
            return Err(BatchError::NothingToExport);
        }

        let mut result = Vec::with_capacity(batches.len());
        for batch in batches {
            let applications = self.members(&self.db, batch.id).await?;
            result.push(BatchWithApplications {
                batch: batch_to_domain(batch),
                applications,
            });
        }
        Ok(result)
    }

    /// Moves exported batches to `sent_to_payment_system` and archives their members.
    ///
    /// # Errors
    ///
    /// Fails without changes if any batch is no longer accepted.
    pub async fn mark_sent_to_payment(&self, ids: &[Uuid]) -> Result<(), BatchError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        let today = time::today();
        for &id in ids {
            let model = find_batch(&txn, id).await?;
            let current = batch_to_domain(model.clone());
            let change = BatchService::change_status(
                current.status,
                BatchStatus::SentToPaymentSystem,
                &current.decision_fields,
                &DecisionFields::default(),
                today,
            )?;
            apply_change(&txn, model, &change).await?;
        }

        txn.commit()
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;

        tracing::info!(batches = ids.len(), "batches sent to payment system");
        Ok(())
    }

    async fn members<C: ConnectionTrait>(
        &self,
        conn: &C,
        batch_id: Uuid,
    ) -> Result<Vec<Application>, BatchError> {
        applications::Entity::find()
            .filter(applications::Column::BatchId.eq(batch_id))
            .order_by_asc(applications::Column::ApplicationNumber)
            .all(conn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?
            .into_iter()
            .map(|m| {
                application_to_domain(m, &self.association_form_codes).map_err(BatchError::Database)
            })
            .collect()
    }
}

async fn find_batch<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<application_batches::Model, BatchError> {
    application_batches::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| BatchError::Database(e.to_string()))?
        .ok_or(BatchError::NotFound(id))
}

async fn member_ids<C: ConnectionTrait>(conn: &C, batch_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
    applications::Entity::find()
        .select_only()
        .column(applications::Column::Id)
        .filter(applications::Column::BatchId.eq(batch_id))
        .order_by_asc(applications::Column::ApplicationNumber)
        .into_tuple()
        .all(conn)
        .await
}

/// Persists a validated status change and archives members when required.
async fn apply_change<C: ConnectionTrait>(
    conn: &C,
    model: application_batches::Model,
    change: &BatchStatusChange,
) -> Result<Batch, BatchError> {
    let id = model.id;
    let mut active: application_batches::ActiveModel = model.into();
    active.status = Set(to_db_batch_status(change.to));
    set_decision_fields(&mut active, &change.decision_fields);
    active.updated_at = Set(now());
    let updated = active
        .update(conn)
        .await
        .map_err(|e| BatchError::Database(e.to_string()))?;

    if change.archive_applications {
        applications::Entity::update_many()
            .col_expr(applications::Column::Archived, Expr::value(true))
            .col_expr(applications::Column::UpdatedAt, Expr::value(now()))
            .filter(applications::Column::BatchId.eq(id))
            .exec(conn)
            .await
            .map_err(|e| BatchError::Database(e.to_string()))?;
    }

    Ok(batch_to_domain(updated))
}

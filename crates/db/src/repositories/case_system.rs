//! Case-system bookkeeping: request statuses and callback handling.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde_json::json;
use uuid::Uuid;

use benefit_core::application::ApplicationError;

use super::convert::now;
use crate::entities::{
    applications, audit_log_entries, case_system_statuses, sea_orm_active_enums::CaseSystemStatus,
};

/// Actor name written to audit entries created by callbacks.
pub const CASE_SYSTEM_ACTOR: &str = "case_system";

/// Case identifiers delivered by a successful callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedCase {
    /// Request id echoed back by the case system.
    pub request_id: Uuid,
    /// Human readable case id.
    pub case_id: String,
    /// Case system internal guid.
    pub case_guid: Uuid,
}

/// Case-system repository.
#[derive(Debug, Clone)]
pub struct CaseSystemRepository {
    db: DatabaseConnection,
}

impl CaseSystemRepository {
    /// Creates a new case-system repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records that an open-case request was sent for an application.
    pub async fn record_request_sent(
        &self,
        application_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), ApplicationError> {
        case_system_statuses::ActiveModel {
            id: Set(Uuid::new_v4()),
            application_id: Set(application_id),
            status: Set(CaseSystemStatus::RequestToOpenCaseSent),
            request_id: Set(Some(request_id)),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ApplicationError::Database(e.to_string()))?;
        Ok(())
    }

    /// Stores the case identifiers of a successful callback.
    ///
    /// Sets `case_id`/`case_guid` on the application, writes a `case_opened`
    /// status and an audit entry, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the application does not exist.
    pub async fn apply_callback(
        &self,
        application_id: Uuid,
        case: &OpenedCase,
    ) -> Result<(), ApplicationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        let model = applications::Entity::find_by_id(application_id)
            .one(&txn)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?
            .ok_or(ApplicationError::NotFound(application_id))?;

        let timestamp = now();
        let mut active: applications::ActiveModel = model.into();
        active.case_id = Set(Some(case.case_id.clone()));
        active.case_guid = Set(Some(case.case_guid));
        active.updated_at = Set(timestamp);
        active
            .update(&txn)
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        case_system_statuses::ActiveModel {
            id: Set(Uuid::new_v4()),
            application_id: Set(application_id),
            status: Set(CaseSystemStatus::CaseOpened),
            request_id: Set(Some(case.request_id)),
            created_at: Set(timestamp),
        }
        .insert(&txn)
        .await
        .map_err(|e| ApplicationError::Database(e.to_string()))?;

        audit_log_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            actor: Set(CASE_SYSTEM_ACTOR.to_string()),
            operation: Set("update".to_string()),
            target_type: Set("application".to_string()),
            target_id: Set(application_id),
            details: Set(json!({
                "requestId": case.request_id,
                "caseId": case.case_id,
                "caseGuid": case.case_guid,
            })),
            created_at: Set(timestamp),
        }
        .insert(&txn)
        .await
        .map_err(|e| ApplicationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| ApplicationError::Database(e.to_string()))?;

        tracing::info!(%application_id, case_id = %case.case_id, "case opened");
        Ok(())
    }
}

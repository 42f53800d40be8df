//! Batch rules.

use chrono::NaiveDate;

use super::error::BatchError;
use super::types::{BatchStatus, Decision, DecisionFields};
use crate::application::ApplicationStatus;
use crate::workflow::WorkflowService;

/// What the caller must do after a batch status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStatusChange {
    /// Status before.
    pub from: BatchStatus,
    /// Status after.
    pub to: BatchStatus,
    /// Decision fields after applying the request.
    pub decision_fields: DecisionFields,
    /// Member applications must be archived.
    pub archive_applications: bool,
}

/// Stateless batch rules.
pub struct BatchService;

impl BatchService {
    /// Decision of a batch, derived from its status and proposal.
    ///
    /// Batches past the payment export follow their proposal.
    #[must_use]
    pub const fn decision(status: BatchStatus, proposal: Decision) -> Option<Decision> {
        match status {
            BatchStatus::Draft
            | BatchStatus::ReportCreated
            | BatchStatus::AwaitingDecision
            | BatchStatus::Returned => None,
            BatchStatus::Accepted => Some(Decision::Accepted),
            BatchStatus::Rejected => Some(Decision::Rejected),
            BatchStatus::SentToPaymentSystem | BatchStatus::Completed => Some(proposal),
        }
    }

    /// Proposal for an assign request, or an error if the status can not be batched.
    pub fn proposal_for(status: ApplicationStatus) -> Result<Decision, BatchError> {
        Decision::from_application_status(status).ok_or(BatchError::InvalidApplicationStatus)
    }

    /// Fails unless members of the batch can be added or removed.
    pub fn ensure_applications_modifiable(status: BatchStatus) -> Result<(), BatchError> {
        if status.applications_can_be_modified() {
            Ok(())
        } else {
            Err(BatchError::ApplicationsLocked(status))
        }
    }

    /// True if an application may join a batch with `proposal`.
    #[must_use]
    pub fn can_join(application_status: ApplicationStatus, proposal: Decision) -> bool {
        application_status == proposal.application_status()
    }

    /// Fails unless the batch can be deleted.
    pub fn ensure_deletable(status: BatchStatus) -> Result<(), BatchError> {
        if status == BatchStatus::Draft {
            Ok(())
        } else {
            Err(BatchError::NotDraft(status))
        }
    }

    /// Fails if creating or reopening a draft would leave two drafts with the same proposal.
    pub fn ensure_single_draft(other_draft_exists: bool) -> Result<(), BatchError> {
        if other_draft_exists {
            Err(BatchError::DraftAlreadyExists)
        } else {
            Ok(())
        }
    }

    /// Moves a draft to report_created on export. Returns the new status.
    pub fn export_status(status: BatchStatus, member_count: u64) -> Result<BatchStatus, BatchError> {
        let next = match status {
            BatchStatus::Draft | BatchStatus::ReportCreated => BatchStatus::ReportCreated,
            other => return Err(BatchError::NotExportable(other)),
        };
        if member_count == 0 {
            return Err(BatchError::Empty);
        }
        Ok(next)
    }

    /// Fields required before a decision can be recorded.
    #[must_use]
    pub fn missing_completion_fields(fields: &DecisionFields, decision: Decision) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());

        let mut missing = Vec::new();
        for (name, is_missing) in [
            ("decision_maker_name", blank(&fields.decision_maker_name)),
            ("decision_maker_title", blank(&fields.decision_maker_title)),
            ("section_of_the_law", blank(&fields.section_of_the_law)),
            ("decision_date", fields.decision_date.is_none()),
            ("expert_inspector_name", blank(&fields.expert_inspector_name)),
            ("expert_inspector_title", blank(&fields.expert_inspector_title)),
        ] {
            if is_missing {
                missing.push(name);
            }
        }
        if decision == Decision::Accepted {
            for (name, value) in [
                ("p2p_inspector_name", &fields.p2p_inspector_name),
                ("p2p_inspector_email", &fields.p2p_inspector_email),
                ("p2p_checker_name", &fields.p2p_checker_name),
            ] {
                if blank(value) {
                    missing.push(name);
                }
            }
        }
        missing
    }

    /// Validates a batch status change.
    ///
    /// Decision fields in `update` are applied only when the target is a
    /// decision; the result must then carry every completion field and a
    /// decision date that is not in the future.
    pub fn change_status(
        from: BatchStatus,
        to: BatchStatus,
        current: &DecisionFields,
        update: &DecisionFields,
        today: NaiveDate,
    ) -> Result<BatchStatusChange, BatchError> {
        if !WorkflowService::is_valid_batch_transition(from, to) {
            return Err(BatchError::InvalidTransition { from, to });
        }

        let mut decision_fields = current.clone();
        let decision = match to {
            BatchStatus::Accepted => Some(Decision::Accepted),
            BatchStatus::Rejected => Some(Decision::Rejected),
            _ => None,
        };
        if let Some(decision) = decision {
            decision_fields.apply(update);

            let missing = Self::missing_completion_fields(&decision_fields, decision);
            if !missing.is_empty() {
                return Err(BatchError::CompletionFieldsMissing(missing));
            }
            if decision_fields.decision_date.is_some_and(|d| d > today) {
                return Err(BatchError::InvalidDecisionDate);
            }
        }

        Ok(BatchStatusChange {
            from,
            to,
            decision_fields,
            archive_applications: to == BatchStatus::SentToPaymentSystem,
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

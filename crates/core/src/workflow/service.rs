//! Status transition guard.
//!
//! Transitions are plain predicates over `(from, to, actor)`. The service
//! turns an allowed transition into a [`StatusChange`] listing the work the
//! caller must do in the same database transaction.

use chrono::Utc;

use crate::application::ApplicationStatus;
use crate::batch::BatchStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Actor, SideEffect, StatusChange};

/// Stateless service for application and batch status transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Returns true if `actor` may move an application from `from` to `to`.
    #[must_use]
    pub fn is_valid_transition(from: ApplicationStatus, to: ApplicationStatus, actor: Actor) -> bool {
        use ApplicationStatus::{
            Accepted, AdditionalInformationNeeded, Cancelled, Draft, Handling, Received, Rejected,
        };

        match actor {
            Actor::Applicant => matches!(
                (from, to),
                (Draft | AdditionalInformationNeeded, Received)
            ),
            Actor::Handler => matches!(
                (from, to),
                (Draft, Received)
                    | (Received, Handling | Cancelled)
                    | (
                        Handling,
                        AdditionalInformationNeeded | Cancelled | Accepted | Rejected
                    )
                    | (AdditionalInformationNeeded, Handling | Cancelled)
                    | (Accepted, Handling | Cancelled)
                    | (Rejected, Handling)
            ),
        }
    }

    /// Returns true if a batch may move from `from` to `to`.
    #[must_use]
    pub fn is_valid_batch_transition(from: BatchStatus, to: BatchStatus) -> bool {
        use BatchStatus::{
            Accepted, AwaitingDecision, Completed, Draft, Rejected, ReportCreated, Returned,
            SentToPaymentSystem,
        };

        matches!(
            (from, to),
            (Draft, ReportCreated)
                | (ReportCreated, AwaitingDecision | Draft)
                | (AwaitingDecision, Accepted | Rejected | Returned)
                | (Returned, Draft)
                | (Accepted, SentToPaymentSystem)
                | (Rejected | SentToPaymentSystem, Completed)
        )
    }

    /// True if `actor` may edit application fields in `status`.
    #[must_use]
    pub fn is_editable_by(status: ApplicationStatus, actor: Actor) -> bool {
        match actor {
            Actor::Applicant => matches!(
                status,
                ApplicationStatus::Draft | ApplicationStatus::AdditionalInformationNeeded
            ),
            Actor::Handler => matches!(
                status,
                ApplicationStatus::Draft
                    | ApplicationStatus::Received
                    | ApplicationStatus::Handling
                    | ApplicationStatus::AdditionalInformationNeeded
            ),
        }
    }

    /// Fails unless `actor` may edit an application in `status`.
    pub fn ensure_editable(status: ApplicationStatus, actor: Actor) -> Result<(), WorkflowError> {
        if Self::is_editable_by(status, actor) {
            Ok(())
        } else {
            Err(WorkflowError::NotEditable { status, actor })
        }
    }

    /// Validates a status change and lists its side effects.
    ///
    /// # Returns
    /// * `Ok(StatusChange)` if the transition is valid
    /// * `Err(WorkflowError::InvalidTransition)` otherwise
    pub fn transition(
        from: ApplicationStatus,
        to: ApplicationStatus,
        actor: Actor,
        comment: Option<String>,
    ) -> Result<StatusChange, WorkflowError> {
        if !Self::is_valid_transition(from, to, actor) {
            return Err(WorkflowError::InvalidTransition { from, to, actor });
        }

        let mut effects = Vec::new();
        if to == ApplicationStatus::Received {
            effects.push(SideEffect::ValidateSubmission);
            effects.push(SideEffect::CheckAttachments);
            if from == ApplicationStatus::Draft {
                effects.push(SideEffect::RecordSubmission);
            }
        }
        if from.is_decided() && !to.is_decided() {
            effects.push(SideEffect::DetachFromBatch);
        }

        Ok(StatusChange {
            from,
            to,
            actor,
            comment: comment.filter(|c| !c.trim().is_empty()),
            effects,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationStatus::*;

    #[test]
    fn test_applicant_can_only_submit() {
        assert!(WorkflowService::is_valid_transition(Draft, Received, Actor::Applicant));
        assert!(WorkflowService::is_valid_transition(
            AdditionalInformationNeeded,
            Received,
            Actor::Applicant
        ));
        assert!(!WorkflowService::is_valid_transition(Received, Handling, Actor::Applicant));
        assert!(!WorkflowService::is_valid_transition(Handling, Accepted, Actor::Applicant));
    }

    #[test]
    fn test_handler_decides() {
        assert!(WorkflowService::is_valid_transition(Handling, Accepted, Actor::Handler));
        assert!(WorkflowService::is_valid_transition(Handling, Rejected, Actor::Handler));
        assert!(!WorkflowService::is_valid_transition(Received, Accepted, Actor::Handler));
        assert!(!WorkflowService::is_valid_transition(Cancelled, Handling, Actor::Handler));
    }

    #[test]
    fn test_submission_effects() {
        let change = WorkflowService::transition(Draft, Received, Actor::Applicant, None).unwrap();
        assert!(change.requires(SideEffect::ValidateSubmission));
        assert!(change.requires(SideEffect::CheckAttachments));
        assert!(change.requires(SideEffect::RecordSubmission));

        let resubmit = WorkflowService::transition(
            AdditionalInformationNeeded,
            Received,
            Actor::Applicant,
            None,
        )
        .unwrap();
        assert!(resubmit.requires(SideEffect::CheckAttachments));
        assert!(!resubmit.requires(SideEffect::RecordSubmission));
    }

    #[test]
    fn test_reopening_decided_application_detaches_batch() {
        let change =
            WorkflowService::transition(Accepted, Handling, Actor::Handler, Some("recheck".into()))
                .unwrap();
        assert_eq!(change.effects, vec![SideEffect::DetachFromBatch]);
        assert_eq!(change.comment.as_deref(), Some("recheck"));

        let cancelled = WorkflowService::transition(Accepted, Cancelled, Actor::Handler, None).unwrap();
        assert!(cancelled.requires(SideEffect::DetachFromBatch));
    }

    #[test]
    fn test_blank_comment_is_dropped() {
        let change =
            WorkflowService::transition(Received, Handling, Actor::Handler, Some("  ".into()))
                .unwrap();
        assert_eq!(change.comment, None);
        assert!(change.effects.is_empty());
    }

    #[test]
    fn test_invalid_transition_is_reported() {
        let err = WorkflowService::transition(Draft, Accepted, Actor::Handler, None).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                from: Draft,
                to: Accepted,
                actor: Actor::Handler
            }
        ));
    }

    #[test]
    fn test_editable_statuses() {
        assert!(WorkflowService::ensure_editable(Draft, Actor::Applicant).is_ok());
        assert!(WorkflowService::ensure_editable(Received, Actor::Applicant).is_err());
        assert!(WorkflowService::ensure_editable(Handling, Actor::Handler).is_ok());
        assert!(WorkflowService::ensure_editable(Accepted, Actor::Handler).is_err());
    }

    #[test]
    fn test_batch_transitions() {
        use BatchStatus as B;
        assert!(WorkflowService::is_valid_batch_transition(B::Draft, B::ReportCreated));
        assert!(WorkflowService::is_valid_batch_transition(B::ReportCreated, B::Draft));
        assert!(WorkflowService::is_valid_batch_transition(B::AwaitingDecision, B::Returned));
        assert!(WorkflowService::is_valid_batch_transition(B::Accepted, B::SentToPaymentSystem));
        assert!(WorkflowService::is_valid_batch_transition(B::Rejected, B::Completed));
        assert!(!WorkflowService::is_valid_batch_transition(B::Draft, B::Accepted));
        assert!(!WorkflowService::is_valid_batch_transition(B::Rejected, B::SentToPaymentSystem));
        assert!(!WorkflowService::is_valid_batch_transition(B::Completed, B::Draft));
    }
}

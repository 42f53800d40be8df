//! Property-based tests for WorkflowService.

use proptest::prelude::*;

use crate::application::ApplicationStatus;
use crate::batch::BatchStatus;
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{Actor, SideEffect};

fn arb_status() -> impl Strategy<Value = ApplicationStatus> {
    prop::sample::select(ApplicationStatus::ALL.to_vec())
}

fn arb_batch_status() -> impl Strategy<Value = BatchStatus> {
    prop::sample::select(BatchStatus::ALL.to_vec())
}

fn arb_actor() -> impl Strategy<Value = Actor> {
    prop_oneof![Just(Actor::Applicant), Just(Actor::Handler)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `transition` agrees with the predicate.
    #[test]
    fn prop_transition_matches_predicate(from in arb_status(), to in arb_status(), actor in arb_actor()) {
        let result = WorkflowService::transition(from, to, actor, None);
        if WorkflowService::is_valid_transition(from, to, actor) {
            let change = result.unwrap();
            prop_assert_eq!(change.from, from);
            prop_assert_eq!(change.to, to);
        } else {
            let is_invalid = matches!(result, Err(WorkflowError::InvalidTransition { .. }));
            prop_assert!(is_invalid);
        }
    }

    /// Applicants can only move applications to received.
    #[test]
    fn prop_applicant_only_submits(from in arb_status(), to in arb_status()) {
        if WorkflowService::is_valid_transition(from, to, Actor::Applicant) {
            prop_assert_eq!(to, ApplicationStatus::Received);
        }
    }

    /// No transition stays in place.
    #[test]
    fn prop_no_self_transition(status in arb_status(), actor in arb_actor(), batch in arb_batch_status()) {
        prop_assert!(!WorkflowService::is_valid_transition(status, status, actor));
        prop_assert!(!WorkflowService::is_valid_batch_transition(batch, batch));
    }

    /// Cancelled applications are final.
    #[test]
    fn prop_cancelled_is_terminal(to in arb_status(), actor in arb_actor()) {
        prop_assert!(!WorkflowService::is_valid_transition(ApplicationStatus::Cancelled, to, actor));
    }

    /// Completed batches are final.
    #[test]
    fn prop_completed_batch_is_terminal(to in arb_batch_status()) {
        prop_assert!(!WorkflowService::is_valid_batch_transition(BatchStatus::Completed, to));
    }

    /// Only changes leaving a decided status detach from the batch.
    #[test]
    fn prop_detach_only_when_leaving_decision(from in arb_status(), to in arb_status()) {
        if let Ok(change) = WorkflowService::transition(from, to, Actor::Handler, None) {
            prop_assert_eq!(
                change.requires(SideEffect::DetachFromBatch),
                from.is_decided() && !to.is_decided()
            );
        }
    }
}

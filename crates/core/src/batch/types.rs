//! Decision batch types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ApplicationStatus;

/// Status of a decision batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Collecting applications.
    Draft,
    /// Decision documents have been exported.
    ReportCreated,
    /// Sent to the decision maker.
    AwaitingDecision,
    /// Decided positively.
    Accepted,
    /// Decided negatively.
    Rejected,
    /// Sent back for corrections.
    Returned,
    /// Included in the payment export.
    SentToPaymentSystem,
    /// Nothing left to do.
    Completed,
}

impl BatchStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Draft,
        Self::ReportCreated,
        Self::AwaitingDecision,
        Self::Accepted,
        Self::Rejected,
        Self::Returned,
        Self::SentToPaymentSystem,
        Self::Completed,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::ReportCreated => "report_created",
            Self::AwaitingDecision => "awaiting_decision",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Returned => "returned",
            Self::SentToPaymentSystem => "sent_to_payment_system",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Membership may change only in draft and returned.
    #[must_use]
    pub const fn applications_can_be_modified(self) -> bool {
        matches!(self, Self::Draft | Self::Returned)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision proposed for, or made on, a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Benefit granted.
    Accepted,
    /// Benefit denied.
    Rejected,
}

impl Decision {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a decision.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Decision matching an application status, if the status is a decision.
    #[must_use]
    pub const fn from_application_status(status: ApplicationStatus) -> Option<Self> {
        match status {
            ApplicationStatus::Accepted => Some(Self::Accepted),
            ApplicationStatus::Rejected => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Application status that members of a batch with this proposal have.
    #[must_use]
    pub const fn application_status(self) -> ApplicationStatus {
        match self {
            Self::Accepted => ApplicationStatus::Accepted,
            Self::Rejected => ApplicationStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who decided and under which law, filled in when the decision arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionFields {
    /// Title of the decision maker.
    pub decision_maker_title: Option<String>,
    /// Name of the decision maker.
    pub decision_maker_name: Option<String>,
    /// Section of the law the decision is based on.
    pub section_of_the_law: Option<String>,
    /// Date of the decision.
    pub decision_date: Option<NaiveDate>,
    /// Expert inspector name.
    pub expert_inspector_name: Option<String>,
    /// Expert inspector title.
    pub expert_inspector_title: Option<String>,
    /// Payment inspector name.
    pub p2p_inspector_name: Option<String>,
    /// Payment inspector email.
    pub p2p_inspector_email: Option<String>,
    /// Payment checker name.
    pub p2p_checker_name: Option<String>,
}

impl DecisionFields {
    /// Copies every field that is set in `other`.
    pub fn apply(&mut self, other: &Self) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field.clone_from(&other.$field);
                })*
            };
        }
        take!(
            decision_maker_title,
            decision_maker_name,
            section_of_the_law,
            decision_date,
            expert_inspector_name,
            expert_inspector_title,
            p2p_inspector_name,
            p2p_inspector_email,
            p2p_checker_name
        );
    }
}

/// A decision batch.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    /// Identifier.
    pub id: Uuid,
    /// Current status.
    pub status: BatchStatus,
    /// Decision every member shares.
    pub proposal_for_decision: Decision,
    /// Handler who created the batch.
    pub handler_id: Option<Uuid>,
    /// Decision details.
    #[serde(flatten)]
    pub decision_fields: DecisionFields,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

impl Batch {
    /// Decision made on the batch, if any.
    #[must_use]
    pub const fn decision(&self) -> Option<Decision> {
        super::BatchService::decision(self.status, self.proposal_for_decision)
    }
}

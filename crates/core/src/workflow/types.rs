//! Workflow domain types for application status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use benefit_shared::Role;

use crate::application::ApplicationStatus;

/// Who requests a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    /// Company representative.
    Applicant,
    /// City handler.
    Handler,
}

impl From<Role> for Actor {
    fn from(role: Role) -> Self {
        match role {
            Role::Applicant => Self::Applicant,
            Role::Handler => Self::Handler,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Applicant => "applicant",
            Self::Handler => "handler",
        })
    }
}

/// Work the caller must do together with a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Run the submission field validation.
    ValidateSubmission,
    /// Verify required attachments and purge invalid ones.
    CheckAttachments,
    /// Record the first submission for the case system.
    RecordSubmission,
    /// Remove the application from its decision batch.
    DetachFromBatch,
}

/// A validated status change with audit data.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    /// Status before the change.
    pub from: ApplicationStatus,
    /// Status after the change.
    pub to: ApplicationStatus,
    /// Who made the change.
    pub actor: Actor,
    /// Optional free text stored in the log entry.
    pub comment: Option<String>,
    /// Work to perform in the same transaction.
    pub effects: Vec<SideEffect>,
    /// When the change was validated.
    pub at: DateTime<Utc>,
}

impl StatusChange {
    /// True if the change requires the given side effect.
    #[must_use]
    pub fn requires(&self, effect: SideEffect) -> bool {
        self.effects.contains(&effect)
    }
}

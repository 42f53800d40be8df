//! Attachment types and data structures.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::Actor;

/// Attachment type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    /// Employment contract.
    EmploymentContract,
    /// Pay subsidy decision from the employment office.
    PaySubsidyDecision,
    /// Commission contract.
    CommissionContract,
    /// Apprenticeship education contract.
    EducationContract,
    /// Helsinki benefit voucher.
    HelsinkiBenefitVoucher,
    /// Employee consent.
    EmployeeConsent,
    /// Whole application on paper.
    FullApplication,
    /// Anything else.
    OtherAttachment,
}

impl AttachmentType {
    /// All attachment types.
    pub const ALL: [Self; 8] = [
        Self::EmploymentContract,
        Self::PaySubsidyDecision,
        Self::CommissionContract,
        Self::EducationContract,
        Self::HelsinkiBenefitVoucher,
        Self::EmployeeConsent,
        Self::FullApplication,
        Self::OtherAttachment,
    ];

    /// Convert to database string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmploymentContract => "employment_contract",
            Self::PaySubsidyDecision => "pay_subsidy_decision",
            Self::CommissionContract => "commission_contract",
            Self::EducationContract => "education_contract",
            Self::HelsinkiBenefitVoucher => "helsinki_benefit_voucher",
            Self::EmployeeConsent => "employee_consent",
            Self::FullApplication => "full_application",
            Self::OtherAttachment => "other_attachment",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: Uuid,
    /// Owning application.
    pub application_id: Uuid,
    /// Attachment type.
    pub attachment_type: AttachmentType,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Object storage key.
    #[serde(skip)]
    pub storage_key: String,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}

/// Record to insert after the file is stored.
#[derive(Debug, Clone)]
pub struct CreateAttachmentInput {
    /// Attachment ID, also part of the storage key.
    pub id: Uuid,
    /// Owning application.
    pub application_id: Uuid,
    /// Attachment type.
    pub attachment_type: AttachmentType,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Object storage key.
    pub storage_key: String,
}

/// Multipart upload, already read into memory.
#[derive(Debug, Clone)]
pub struct UploadInput {
    /// Target application.
    pub application_id: Uuid,
    /// Attachment type.
    pub attachment_type: AttachmentType,
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File content.
    pub content: Bytes,
    /// Who uploads.
    pub actor: Actor,
}

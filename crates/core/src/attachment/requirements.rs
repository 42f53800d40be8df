//! Which attachment types an application needs.

use serde::Serialize;
use uuid::Uuid;

use super::types::{Attachment, AttachmentType};
use crate::application::{ApplicationFields, BenefitType};

/// Types accepted on every application.
pub const ALWAYS_ALLOWED: [AttachmentType; 3] = [
    AttachmentType::EmployeeConsent,
    AttachmentType::FullApplication,
    AttachmentType::OtherAttachment,
];

/// Required and optional attachment types for an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentRequirements {
    /// Must be present before the application can be received.
    pub required: Vec<AttachmentType>,
    /// Accepted but not needed.
    pub optional: Vec<AttachmentType>,
}

impl AttachmentRequirements {
    /// Requirements for the current field values.
    #[must_use]
    pub fn for_fields(fields: &ApplicationFields) -> Self {
        let Some(benefit_type) = fields.benefit_type else {
            return Self::default();
        };

        let mut required = match benefit_type {
            BenefitType::Commission => vec![AttachmentType::CommissionContract],
            BenefitType::Employment | BenefitType::Salary => {
                if fields.apprenticeship_program == Some(true) {
                    vec![
                        AttachmentType::EmploymentContract,
                        AttachmentType::EducationContract,
                    ]
                } else {
                    vec![AttachmentType::EmploymentContract]
                }
            }
        };
        if benefit_type != BenefitType::Commission && fields.pay_subsidy_granted == Some(true) {
            required.push(AttachmentType::PaySubsidyDecision);
        }

        Self {
            required,
            optional: vec![AttachmentType::HelsinkiBenefitVoucher],
        }
    }

    /// True if an attachment of this type may be stored.
    #[must_use]
    pub fn allows(&self, attachment_type: AttachmentType) -> bool {
        ALWAYS_ALLOWED.contains(&attachment_type)
            || self.required.contains(&attachment_type)
            || self.optional.contains(&attachment_type)
    }

    /// Required types not found in `present`.
    #[must_use]
    pub fn missing_required(&self, present: &[AttachmentType]) -> Vec<AttachmentType> {
        self.required
            .iter()
            .copied()
            .filter(|t| !present.contains(t))
            .collect()
    }

    /// Attachments whose type is no longer accepted.
    #[must_use]
    pub fn purge_invalid(&self, attachments: &[Attachment]) -> Vec<Uuid> {
        attachments
            .iter()
            .filter(|a| !self.allows(a.attachment_type))
            .map(|a| a.id)
            .collect()
    }
}

//! Conversions between database models and domain types.

use chrono::Utc;
use sea_orm::{ActiveValue::Set, prelude::DateTimeWithTimeZone};

use benefit_core::application::{
    Address, Application, ApplicationFields, ApplicationStatus, CompanySnapshot, OrganizationType,
};
use benefit_core::attachment::{Attachment, AttachmentType};
use benefit_core::batch::{Batch, BatchStatus, Decision, DecisionFields};
use benefit_shared::Role;

use crate::entities::{
    application_batches, applications, attachments,
    sea_orm_active_enums::{
        ApplicationStatus as DbApplicationStatus, AttachmentType as DbAttachmentType,
        BatchDecision as DbBatchDecision, BatchStatus as DbBatchStatus, UserRole as DbUserRole,
    },
};

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

pub(crate) const fn to_db_application_status(status: ApplicationStatus) -> DbApplicationStatus {
    match status {
        ApplicationStatus::Draft => DbApplicationStatus::Draft,
        ApplicationStatus::Received => DbApplicationStatus::Received,
        ApplicationStatus::Handling => DbApplicationStatus::Handling,
        ApplicationStatus::AdditionalInformationNeeded => {
            DbApplicationStatus::AdditionalInformationNeeded
        }
        ApplicationStatus::Cancelled => DbApplicationStatus::Cancelled,
        ApplicationStatus::Accepted => DbApplicationStatus::Accepted,
        ApplicationStatus::Rejected => DbApplicationStatus::Rejected,
    }
}

pub(crate) const fn from_db_application_status(status: DbApplicationStatus) -> ApplicationStatus {
    match status {
        DbApplicationStatus::Draft => ApplicationStatus::Draft,
        DbApplicationStatus::Received => ApplicationStatus::Received,
        DbApplicationStatus::Handling => ApplicationStatus::Handling,
        DbApplicationStatus::AdditionalInformationNeeded => {
            ApplicationStatus::AdditionalInformationNeeded
        }
        DbApplicationStatus::Cancelled => ApplicationStatus::Cancelled,
        DbApplicationStatus::Accepted => ApplicationStatus::Accepted,
        DbApplicationStatus::Rejected => ApplicationStatus::Rejected,
    }
}

pub(crate) const fn to_db_batch_status(status: BatchStatus) -> DbBatchStatus {
    match status {
        BatchStatus::Draft => DbBatchStatus::Draft,
        BatchStatus::ReportCreated => DbBatchStatus::ReportCreated,
        BatchStatus::AwaitingDecision => DbBatchStatus::AwaitingDecision,
        BatchStatus::Accepted => DbBatchStatus::Accepted,
        BatchStatus::Rejected => DbBatchStatus::Rejected,
        BatchStatus::Returned => DbBatchStatus::Returned,
        BatchStatus::SentToPaymentSystem => DbBatchStatus::SentToPaymentSystem,
        BatchStatus::Completed => DbBatchStatus::Completed,
    }
}

pub(crate) const fn from_db_batch_status(status: DbBatchStatus) -> BatchStatus {
    match status {
        DbBatchStatus::Draft => BatchStatus::Draft,
        DbBatchStatus::ReportCreated => BatchStatus::ReportCreated,
        DbBatchStatus::AwaitingDecision => BatchStatus::AwaitingDecision,
        DbBatchStatus::Accepted => BatchStatus::Accepted,
        DbBatchStatus::Rejected => BatchStatus::Rejected,
        DbBatchStatus::Returned => BatchStatus::Returned,
        DbBatchStatus::SentToPaymentSystem => BatchStatus::SentToPaymentSystem,
        DbBatchStatus::Completed => BatchStatus::Completed,
    }
}

pub(crate) const fn to_db_decision(decision: Decision) -> DbBatchDecision {
    match decision {
        Decision::Accepted => DbBatchDecision::Accepted,
        Decision::Rejected => DbBatchDecision::Rejected,
    }
}

pub(crate) const fn from_db_decision(decision: DbBatchDecision) -> Decision {
    match decision {
        DbBatchDecision::Accepted => Decision::Accepted,
        DbBatchDecision::Rejected => Decision::Rejected,
    }
}

pub(crate) const fn to_db_attachment_type(t: AttachmentType) -> DbAttachmentType {
    match t {
        AttachmentType::EmploymentContract => DbAttachmentType::EmploymentContract,
        AttachmentType::PaySubsidyDecision => DbAttachmentType::PaySubsidyDecision,
        AttachmentType::CommissionContract => DbAttachmentType::CommissionContract,
        AttachmentType::EducationContract => DbAttachmentType::EducationContract,
        AttachmentType::HelsinkiBenefitVoucher => DbAttachmentType::HelsinkiBenefitVoucher,
        AttachmentType::EmployeeConsent => DbAttachmentType::EmployeeConsent,
        AttachmentType::FullApplication => DbAttachmentType::FullApplication,
        AttachmentType::OtherAttachment => DbAttachmentType::OtherAttachment,
    }
}

pub(crate) const fn from_db_attachment_type(t: DbAttachmentType) -> AttachmentType {
    match t {
        DbAttachmentType::EmploymentContract => AttachmentType::EmploymentContract,
        DbAttachmentType::PaySubsidyDecision => AttachmentType::PaySubsidyDecision,
        DbAttachmentType::CommissionContract => AttachmentType::CommissionContract,
        DbAttachmentType::EducationContract => AttachmentType::EducationContract,
        DbAttachmentType::HelsinkiBenefitVoucher => AttachmentType::HelsinkiBenefitVoucher,
        DbAttachmentType::EmployeeConsent => AttachmentType::EmployeeConsent,
        DbAttachmentType::FullApplication => AttachmentType::FullApplication,
        DbAttachmentType::OtherAttachment => AttachmentType::OtherAttachment,
    }
}

pub(crate) const fn to_db_role(role: Role) -> DbUserRole {
    match role {
        Role::Handler => DbUserRole::Handler,
        Role::Applicant => DbUserRole::Applicant,
    }
}

/// Converts an application row. Fails only on a malformed `fields` document.
pub(crate) fn application_to_domain(
    model: applications::Model,
    association_form_codes: &[i32],
) -> Result<Application, String> {
    let fields: ApplicationFields = serde_json::from_value(model.fields)
        .map_err(|e| format!("application {} has malformed fields: {e}", model.id))?;

    Ok(Application {
        id: model.id,
        application_number: model.application_number,
        status: from_db_application_status(model.status),
        company_id: model.company_id,
        organization_type: OrganizationType::resolve(
            model.company_form_code,
            association_form_codes,
        ),
        company: CompanySnapshot {
            name: model.company_name,
            business_id: model.company_business_id,
            company_form_code: model.company_form_code,
            address: Address {
                street_address: model.company_street_address,
                postcode: model.company_postcode,
                city: model.company_city,
            },
        },
        fields,
        handler_id: model.handler_id,
        batch_id: model.batch_id,
        archived: model.archived,
        calculated_benefit_amount: model.calculated_benefit_amount,
        manual_benefit_amount: model.manual_benefit_amount,
        case_id: model.case_id,
        case_guid: model.case_guid,
        created_at: model.created_at.with_timezone(&Utc),
        modified_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn fields_to_json(fields: &ApplicationFields) -> Result<serde_json::Value, String> {
    serde_json::to_value(fields).map_err(|e| e.to_string())
}

pub(crate) fn batch_to_domain(model: application_batches::Model) -> Batch {
    Batch {
        id: model.id,
        status: from_db_batch_status(model.status),
        proposal_for_decision: from_db_decision(model.proposal_for_decision),
        handler_id: model.handler_id,
        decision_fields: DecisionFields {
            decision_maker_title: model.decision_maker_title,
            decision_maker_name: model.decision_maker_name,
            section_of_the_law: model.section_of_the_law,
            decision_date: model.decision_date,
            expert_inspector_name: model.expert_inspector_name,
            expert_inspector_title: model.expert_inspector_title,
            p2p_inspector_name: model.p2p_inspector_name,
            p2p_inspector_email: model.p2p_inspector_email,
            p2p_checker_name: model.p2p_checker_name,
        },
        created_at: model.created_at.with_timezone(&Utc),
        modified_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Writes decision fields onto a batch active model.
pub(crate) fn set_decision_fields(
    active: &mut application_batches::ActiveModel,
    fields: &DecisionFields,
) {
    active.decision_maker_title = Set(fields.decision_maker_title.clone());
    active.decision_maker_name = Set(fields.decision_maker_name.clone());
    active.section_of_the_law = Set(fields.section_of_the_law.clone());
    active.decision_date = Set(fields.decision_date);
    active.expert_inspector_name = Set(fields.expert_inspector_name.clone());
    active.expert_inspector_title = Set(fields.expert_inspector_title.clone());
    active.p2p_inspector_name = Set(fields.p2p_inspector_name.clone());
    active.p2p_inspector_email = Set(fields.p2p_inspector_email.clone());
    active.p2p_checker_name = Set(fields.p2p_checker_name.clone());
}

pub(crate) fn attachment_to_domain(model: attachments::Model) -> Attachment {
    Attachment {
        id: model.id,
        application_id: model.application_id,
        attachment_type: from_db_attachment_type(model.attachment_type),
        file_name: model.file_name,
        content_type: model.content_type,
        file_size: model.file_size,
        storage_key: model.storage_key,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::prelude::Uuid;

    use super::*;

    #[test]
    fn test_status_mappings_are_inverse() {
        for status in ApplicationStatus::ALL {
            assert_eq!(from_db_application_status(to_db_application_status(status)), status);
        }
        for status in BatchStatus::ALL {
            assert_eq!(from_db_batch_status(to_db_batch_status(status)), status);
        }
        for t in AttachmentType::ALL {
            assert_eq!(from_db_attachment_type(to_db_attachment_type(t)), t);
        }
    }

    fn model(fields: serde_json::Value) -> applications::Model {
        applications::Model {
            id: Uuid::new_v4(),
            application_number: 125_000,
            status: DbApplicationStatus::Draft,
            company_id: Uuid::new_v4(),
            company_name: "Yhdistys ry".into(),
            company_business_id: "1234567-8".into(),
            company_form_code: 29,
            company_street_address: "Kaivokatu 1".into(),
            company_postcode: "00100".into(),
            company_city: "Helsinki".into(),
            fields,
            handler_id: None,
            batch_id: None,
            archived: false,
            calculated_benefit_amount: None,
            manual_benefit_amount: None,
            case_id: None,
            case_guid: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_application_from_empty_fields_document() {
        let app = application_to_domain(model(serde_json::json!({})), &[29]).unwrap();
        assert_eq!(app.organization_type, OrganizationType::Association);
        assert_eq!(app.fields, ApplicationFields::default());
        assert_eq!(app.company.address.city, "Helsinki");
    }

    #[test]
    fn test_malformed_fields_are_reported() {
        let err = application_to_domain(model(serde_json::json!({"bases": 5})), &[29]).unwrap_err();
        assert!(err.contains("malformed fields"));
    }
}

//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "handler")]
    Handler,
    #[sea_orm(string_value = "applicant")]
    Applicant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "application_status")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "handling")]
    Handling,
    #[sea_orm(string_value = "additional_information_needed")]
    AdditionalInformationNeeded,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "batch_status")]
pub enum BatchStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "report_created")]
    ReportCreated,
    #[sea_orm(string_value = "awaiting_decision")]
    AwaitingDecision,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "returned")]
    Returned,
    #[sea_orm(string_value = "sent_to_payment_system")]
    SentToPaymentSystem,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "batch_decision")]
pub enum BatchDecision {
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attachment_type")]
pub enum AttachmentType {
    #[sea_orm(string_value = "employment_contract")]
    EmploymentContract,
    #[sea_orm(string_value = "pay_subsidy_decision")]
    PaySubsidyDecision,
    #[sea_orm(string_value = "commission_contract")]
    CommissionContract,
    #[sea_orm(string_value = "education_contract")]
    EducationContract,
    #[sea_orm(string_value = "helsinki_benefit_voucher")]
    HelsinkiBenefitVoucher,
    #[sea_orm(string_value = "employee_consent")]
    EmployeeConsent,
    #[sea_orm(string_value = "full_application")]
    FullApplication,
    #[sea_orm(string_value = "other_attachment")]
    OtherAttachment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "case_system_status")]
pub enum CaseSystemStatus {
    #[sea_orm(string_value = "submitted_but_not_sent")]
    SubmittedButNotSent,
    #[sea_orm(string_value = "request_to_open_case_sent")]
    RequestToOpenCaseSent,
    #[sea_orm(string_value = "case_opened")]
    CaseOpened,
    #[sea_orm(string_value = "decision_proposal_sent")]
    DecisionProposalSent,
    #[sea_orm(string_value = "details_received")]
    DetailsReceived,
}

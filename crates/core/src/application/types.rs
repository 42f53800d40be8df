//! Application domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a benefit application.
///
/// The lifecycle is:
/// - Draft → Received (submitted)
/// - Received → Handling
/// - Handling → AdditionalInformationNeeded | Accepted | Rejected | Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Being filled in by the applicant.
    Draft,
    /// Submitted, waiting for a handler.
    Received,
    /// A handler is processing the application.
    Handling,
    /// Returned to the applicant for more information.
    AdditionalInformationNeeded,
    /// Withdrawn.
    Cancelled,
    /// Proposed for a positive decision.
    Accepted,
    /// Proposed for a negative decision.
    Rejected,
}

impl ApplicationStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Draft,
        Self::Received,
        Self::Handling,
        Self::AdditionalInformationNeeded,
        Self::Cancelled,
        Self::Accepted,
        Self::Rejected,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Received => "received",
            Self::Handling => "handling",
            Self::AdditionalInformationNeeded => "additional_information_needed",
            Self::Cancelled => "cancelled",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// True for accepted and rejected.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of benefit applied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitType {
    /// Flat monthly employment benefit.
    Employment,
    /// Salary benefit proportional to pay costs.
    Salary,
    /// One-off commission benefit.
    Commission,
}

impl BenefitType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employment => "employment",
            Self::Salary => "salary",
            Self::Commission => "commission",
        }
    }

    /// Parses a benefit type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employment" => Some(Self::Employment),
            "salary" => Some(Self::Salary),
            "commission" => Some(Self::Commission),
            _ => None,
        }
    }
}

impl fmt::Display for BenefitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal form of the employer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    /// Company (the default).
    Company,
    /// Registered association.
    Association,
}

impl OrganizationType {
    /// Resolves the organization type from a company form code.
    #[must_use]
    pub fn resolve(company_form_code: i32, association_form_codes: &[i32]) -> Self {
        if association_form_codes.contains(&company_form_code) {
            Self::Association
        } else {
            Self::Company
        }
    }
}

/// Language used in communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Finnish.
    #[default]
    Fi,
    /// Swedish.
    Sv,
    /// English.
    En,
}

impl Language {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fi => "fi",
            Self::Sv => "sv",
            Self::En => "en",
        }
    }

    /// Parses a language code.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fi" => Some(Self::Fi),
            "sv" => Some(Self::Sv),
            "en" => Some(Self::En),
            _ => None,
        }
    }
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street address.
    pub street_address: String,
    /// Postal code.
    pub postcode: String,
    /// City.
    pub city: String,
}

/// Employer data copied into the application when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    /// Company name.
    pub name: String,
    /// Business id (Y-tunnus).
    pub business_id: String,
    /// Company form code from the trade register.
    pub company_form_code: i32,
    /// Registered address.
    pub address: Address,
}

/// One previously granted de minimis aid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeMinimisAid {
    /// Who granted the aid.
    pub granter: String,
    /// Amount in euros.
    pub amount: Decimal,
    /// When the aid was granted.
    pub granted_at: NaiveDate,
}

/// The employee the benefit is applied for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Employee {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Finnish personal identity code.
    pub social_security_number: String,
    /// Phone number.
    pub phone_number: String,
    /// Email.
    pub email: String,
    /// Preferred language.
    pub employee_language: Language,
    /// Job title.
    pub job_title: String,
    /// Gross monthly pay.
    pub monthly_pay: Option<Decimal>,
    /// Vacation money per month.
    pub vacation_money: Option<Decimal>,
    /// Other employer costs per month.
    pub other_expenses: Option<Decimal>,
    /// Weekly working hours.
    pub working_hours: Option<Decimal>,
    /// Applicable collective agreement.
    pub collective_bargaining_agreement: String,
    /// Whether the employee lives in Helsinki.
    pub is_living_in_helsinki: bool,
    /// Commission fee, for commission benefits.
    pub commission_amount: Option<Decimal>,
    /// Description of the commission.
    pub commission_description: String,
}

/// Fields the applicant (or a handler) fills in.
///
/// Everything is optional while the application is a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationFields {
    /// IBAN for the payment.
    pub company_bank_account_number: Option<String>,
    /// Contact person first name.
    pub company_contact_person_first_name: Option<String>,
    /// Contact person last name.
    pub company_contact_person_last_name: Option<String>,
    /// Contact person phone.
    pub company_contact_person_phone_number: Option<String>,
    /// Contact person email.
    pub company_contact_person_email: Option<String>,
    /// Use `alternative_address` for mail.
    pub use_alternative_address: bool,
    /// Mailing address when different from the registered one.
    pub alternative_address: Option<Address>,
    /// Associations only.
    pub association_has_business_activities: Option<bool>,
    /// Employer is in co-operation negotiations.
    pub co_operation_negotiations: Option<bool>,
    /// Description of the negotiations.
    pub co_operation_negotiations_description: Option<String>,
    /// Pay subsidy has been granted for the employment.
    pub pay_subsidy_granted: Option<bool>,
    /// Pay subsidy percent.
    pub pay_subsidy_percent: Option<i32>,
    /// Second pay subsidy percent.
    pub additional_pay_subsidy_percent: Option<i32>,
    /// Apprenticeship employment.
    pub apprenticeship_program: Option<bool>,
    /// Employer has received de minimis aid.
    pub de_minimis_aid: Option<bool>,
    /// Aids received.
    pub de_minimis_aid_set: Vec<DeMinimisAid>,
    /// Benefit applied for.
    pub benefit_type: Option<BenefitType>,
    /// Benefit period start.
    pub start_date: Option<NaiveDate>,
    /// Benefit period end.
    pub end_date: Option<NaiveDate>,
    /// Grounds for the benefit.
    pub bases: Vec<String>,
    /// Language of the application.
    pub applicant_language: Language,
    /// The employee.
    pub employee: Employee,
}

/// A benefit application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    /// Identifier.
    pub id: Uuid,
    /// Sequential number shown to people.
    pub application_number: i32,
    /// Current status.
    pub status: ApplicationStatus,
    /// Employer.
    pub company_id: Uuid,
    /// Employer snapshot.
    pub company: CompanySnapshot,
    /// Resolved from the company form code.
    pub organization_type: OrganizationType,
    /// Filled in fields.
    pub fields: ApplicationFields,
    /// Assigned handler.
    pub handler_id: Option<Uuid>,
    /// Decision batch.
    pub batch_id: Option<Uuid>,
    /// Archived after payment.
    pub archived: bool,
    /// Latest calculator result.
    pub calculated_benefit_amount: Option<Decimal>,
    /// Handler override result.
    pub manual_benefit_amount: Option<Decimal>,
    /// Case id in the case system.
    pub case_id: Option<String>,
    /// Case guid in the case system.
    pub case_guid: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

impl Application {
    /// Manual amount when set, otherwise the calculated amount.
    #[must_use]
    pub fn benefit_amount(&self) -> Option<Decimal> {
        self.manual_benefit_amount.or(self.calculated_benefit_amount)
    }

    /// Address mail should go to.
    #[must_use]
    pub fn effective_address(&self) -> &Address {
        match (&self.fields.alternative_address, self.fields.use_alternative_address) {
            (Some(alternative), true) => alternative,
            _ => &self.company.address,
        }
    }
}

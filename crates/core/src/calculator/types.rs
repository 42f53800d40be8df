//! Calculator input and output types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{Application, BenefitType};
use crate::validation::ValidationErrors;

/// Pay subsidy granted by the employment office for part of the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaySubsidy {
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Subsidy percent of pay.
    pub pay_subsidy_percent: i32,
    /// Working time as percent of full time.
    pub work_time_percent: Decimal,
    /// Granted on grounds of disability or illness.
    #[serde(default)]
    pub disability_or_illness: bool,
}

/// Apprenticeship training compensation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCompensation {
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
    /// Paid per month.
    pub monthly_amount: Decimal,
}

/// Everything the calculator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Benefit being calculated.
    pub benefit_type: BenefitType,
    /// First day of the benefit period.
    pub start_date: Option<NaiveDate>,
    /// Last day of the benefit period.
    pub end_date: Option<NaiveDate>,
    /// Gross monthly pay.
    pub monthly_pay: Decimal,
    /// Monthly share of vacation money.
    pub vacation_money: Decimal,
    /// Other monthly employer costs.
    pub other_expenses: Decimal,
    /// Share of pay costs that may be covered, in percent.
    pub state_aid_max_percentage: Decimal,
    /// Commission amount for commission benefits.
    pub commission_amount: Option<Decimal>,
    /// Handler override of the monthly amount.
    pub override_monthly_benefit_amount: Option<Decimal>,
    /// Reason for the override.
    pub override_monthly_benefit_amount_comment: Option<String>,
    /// Pay subsidies.
    pub pay_subsidies: Vec<PaySubsidy>,
    /// Training compensations.
    pub training_compensations: Vec<TrainingCompensation>,
}

/// Kind of a breakdown row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowType {
    /// Total monthly pay costs.
    SalaryCosts,
    /// Eligible monthly amount.
    StateAidMaxMonthlyEligible,
    /// Pay subsidy per month in a segment.
    PaySubsidyMonthly,
    /// Training compensation per month in a segment.
    TrainingCompensationMonthly,
    /// Salary benefit per month in a segment.
    SalaryBenefitMonthly,
    /// Salary benefit for a segment.
    SalaryBenefitSubTotal,
    /// Employment benefit per month.
    EmploymentBenefitMonthly,
    /// Employment benefit for the period.
    EmploymentBenefitSubTotal,
    /// Commission benefit.
    CommissionTotal,
    /// Override amount for the period.
    ManualOverrideTotal,
    /// Benefit total.
    TotalEur,
    /// Heading.
    Description,
}

impl RowType {
    /// All row types.
    pub const ALL: [Self; 12] = [
        Self::SalaryCosts,
        Self::StateAidMaxMonthlyEligible,
        Self::PaySubsidyMonthly,
        Self::TrainingCompensationMonthly,
        Self::SalaryBenefitMonthly,
        Self::SalaryBenefitSubTotal,
        Self::EmploymentBenefitMonthly,
        Self::EmploymentBenefitSubTotal,
        Self::CommissionTotal,
        Self::ManualOverrideTotal,
        Self::TotalEur,
        Self::Description,
    ];

    /// Database value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SalaryCosts => "salary_costs",
            Self::StateAidMaxMonthlyEligible => "state_aid_max_monthly_eligible",
            Self::PaySubsidyMonthly => "pay_subsidy_monthly",
            Self::TrainingCompensationMonthly => "training_compensation_monthly",
            Self::SalaryBenefitMonthly => "salary_benefit_monthly",
            Self::SalaryBenefitSubTotal => "salary_benefit_sub_total",
            Self::EmploymentBenefitMonthly => "employment_benefit_monthly",
            Self::EmploymentBenefitSubTotal => "employment_benefit_sub_total",
            Self::CommissionTotal => "commission_total",
            Self::ManualOverrideTotal => "manual_override_total",
            Self::TotalEur => "total_eur",
            Self::Description => "description",
        }
    }

    /// Parse a database value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Rows whose amounts add up to the total.
    #[must_use]
    pub const fn is_sub_total(self) -> bool {
        matches!(
            self,
            Self::SalaryBenefitSubTotal
                | Self::EmploymentBenefitSubTotal
                | Self::CommissionTotal
                | Self::ManualOverrideTotal
        )
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRow {
    /// Position in the breakdown.
    pub ordinal: i32,
    /// Kind of row.
    pub row_type: RowType,
    /// Finnish label shown to handlers.
    pub description_fi: String,
    /// Amount in euros. Zero for headings.
    pub amount: Decimal,
    /// Segment start, for per-segment rows.
    pub start_date: Option<NaiveDate>,
    /// Segment end, for per-segment rows.
    pub end_date: Option<NaiveDate>,
}

/// Part of the benefit period with constant subsidy and training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// First day.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
    /// Active pay subsidy.
    pub pay_subsidy: Option<&'a PaySubsidy>,
    /// Active training compensation.
    pub training_compensation: Option<&'a TrainingCompensation>,
}

impl Segment<'_> {
    /// Length in days, both ends included.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Calculator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    /// Breakdown rows in order.
    pub rows: Vec<CalculationRow>,
    /// Derived benefit amount, ignoring any override.
    pub calculated_benefit_amount: Decimal,
    /// Amount from the override, when one is set.
    pub manual_benefit_amount: Option<Decimal>,
    /// Length of the period in months.
    pub duration_in_months_rounded: Decimal,
}

impl CalculationResult {
    /// Amount that will be paid.
    #[must_use]
    pub fn benefit_amount(&self) -> Decimal {
        self.manual_benefit_amount
            .unwrap_or(self.calculated_benefit_amount)
    }
}

/// Handler input for storing a calculation.
///
/// Pay fields left out fall back to the employee data of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CalculationUpdate {
    /// First day of the benefit period.
    pub start_date: Option<NaiveDate>,
    /// Last day of the benefit period.
    pub end_date: Option<NaiveDate>,
    /// Gross monthly pay.
    pub monthly_pay: Option<Decimal>,
    /// Monthly share of vacation money.
    pub vacation_money: Option<Decimal>,
    /// Other monthly employer costs.
    pub other_expenses: Option<Decimal>,
    /// Share of pay costs that may be covered, in percent.
    pub state_aid_max_percentage: Option<Decimal>,
    /// Benefit is granted as de minimis aid.
    pub granted_as_de_minimis_aid: bool,
    /// Employee belongs to the target group.
    pub target_group_check: bool,
    /// Handler override of the monthly amount.
    pub override_monthly_benefit_amount: Option<Decimal>,
    /// Reason for the override.
    pub override_monthly_benefit_amount_comment: Option<String>,
    /// Pay subsidies.
    pub pay_subsidies: Vec<PaySubsidy>,
    /// Training compensations.
    pub training_compensations: Vec<TrainingCompensation>,
}

/// Default share of pay costs the benefit may cover.
pub const DEFAULT_STATE_AID_MAX_PERCENTAGE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

impl CalculationUpdate {
    /// Calculator input for `application`.
    pub fn to_input(&self, application: &Application) -> Result<CalculationInput, ValidationErrors> {
        let fields = &application.fields;
        let employee = &fields.employee;
        let benefit_type = fields.benefit_type.ok_or_else(|| {
            ValidationErrors::single("benefit_type", "Benefit type must be chosen before calculating")
        })?;

        Ok(CalculationInput {
            benefit_type,
            start_date: self.start_date.or(fields.start_date),
            end_date: self.end_date.or(fields.end_date),
            monthly_pay: self.monthly_pay.or(employee.monthly_pay).unwrap_or_default(),
            vacation_money: self.vacation_money.or(employee.vacation_money).unwrap_or_default(),
            other_expenses: self.other_expenses.or(employee.other_expenses).unwrap_or_default(),
            state_aid_max_percentage: self
                .state_aid_max_percentage
                .unwrap_or(DEFAULT_STATE_AID_MAX_PERCENTAGE),
            commission_amount: employee.commission_amount,
            override_monthly_benefit_amount: self.override_monthly_benefit_amount,
            override_monthly_benefit_amount_comment: self
                .override_monthly_benefit_amount_comment
                .clone()
                .filter(|c| !c.trim().is_empty()),
            pay_subsidies: self.pay_subsidies.clone(),
            training_compensations: self.training_compensations.clone(),
        })
    }
}

/// A stored calculation with its breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct Calculation {
    /// Identifier.
    pub id: Uuid,
    /// Application the calculation belongs to.
    pub application_id: Uuid,
    /// Handler who last saved it.
    pub handler_id: Option<Uuid>,
    /// Inputs the breakdown was computed from.
    #[serde(flatten)]
    pub input: CalculationInput,
    /// Benefit is granted as de minimis aid.
    pub granted_as_de_minimis_aid: bool,
    /// Employee belongs to the target group.
    pub target_group_check: bool,
    /// Derived amount.
    pub calculated_benefit_amount: Option<Decimal>,
    /// Length of the period in months.
    pub duration_in_months_rounded: Option<Decimal>,
    /// Breakdown.
    pub rows: Vec<CalculationRow>,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::application::{
        Address, ApplicationFields, ApplicationStatus, CompanySnapshot, Employee, OrganizationType,
    };

    fn application(fields: ApplicationFields) -> Application {
        Application {
            id: Uuid::new_v4(),
            application_number: 125_000,
            status: ApplicationStatus::Handling,
            company_id: Uuid::new_v4(),
            company: CompanySnapshot {
                name: "Acme Oy".into(),
                business_id: "1234567-8".into(),
                company_form_code: 16,
                address: Address::default(),
            },
            organization_type: OrganizationType::Company,
            fields,
            handler_id: None,
            batch_id: None,
            archived: false,
            calculated_benefit_amount: None,
            manual_benefit_amount: None,
            case_id: None,
            case_guid: None,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_falls_back_to_application_fields() {
        let app = application(ApplicationFields {
            benefit_type: Some(BenefitType::Salary),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            employee: Employee {
                monthly_pay: Some(dec!(2500)),
                vacation_money: Some(dec!(100)),
                ..Employee::default()
            },
            ..ApplicationFields::default()
        });
        let update = CalculationUpdate {
            other_expenses: Some(dec!(250)),
            override_monthly_benefit_amount_comment: Some("   ".into()),
            ..CalculationUpdate::default()
        };

        let input = update.to_input(&app).unwrap();
        assert_eq!(input.benefit_type, BenefitType::Salary);
        assert_eq!(input.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(input.monthly_pay, dec!(2500));
        assert_eq!(input.vacation_money, dec!(100));
        assert_eq!(input.other_expenses, dec!(250));
        assert_eq!(input.state_aid_max_percentage, DEFAULT_STATE_AID_MAX_PERCENTAGE);
        assert_eq!(input.override_monthly_benefit_amount_comment, None);
    }

    #[test]
    fn test_update_requires_benefit_type() {
        let app = application(ApplicationFields::default());
        let errors = CalculationUpdate::default().to_input(&app).unwrap_err();
        assert!(errors.has("benefit_type"));
    }
}

//! Business rules for application fields.
//!
//! Draft applications may have any field empty. Rules that compare fields are
//! checked whenever both sides are present; the required-field check only runs
//! when the application is submitted.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;

use super::ssn;
use super::types::{ApplicationFields, BenefitType, DeMinimisAid, Employee, OrganizationType};
use crate::time::start_of_year;
use crate::validation::ValidationErrors;

/// Maximum single and total de minimis aid in euros.
pub const MAX_DE_MINIMIS_AMOUNT: Decimal = Decimal::from_parts(200_000, 0, 0, false, 0);

/// Years back a de minimis grant may be dated.
pub const DE_MINIMIS_YEARS_BACK: i32 = 4;

/// Benefit period upper bound in months (exclusive).
pub const MAX_BENEFIT_MONTHS: u32 = 12;

/// Accepted pay subsidy percentages.
pub const PAY_SUBSIDY_PERCENTS: [i32; 5] = [30, 40, 50, 70, 100];

/// Inputs the rules need besides the fields themselves.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// Today's date.
    pub today: NaiveDate,
    /// Organization type of the employer.
    pub organization_type: OrganizationType,
    /// Minimum weekly working hours.
    pub min_working_hours: Decimal,
}

/// Benefit types the employer may choose from.
#[must_use]
pub fn available_benefit_types(
    organization_type: OrganizationType,
    association_has_business_activities: Option<bool>,
    apprenticeship_program: Option<bool>,
) -> Vec<BenefitType> {
    if organization_type == OrganizationType::Association
        && association_has_business_activities != Some(true)
    {
        return vec![BenefitType::Salary];
    }
    if apprenticeship_program == Some(true) {
        vec![BenefitType::Salary, BenefitType::Employment]
    } else {
        vec![
            BenefitType::Salary,
            BenefitType::Commission,
            BenefitType::Employment,
        ]
    }
}

/// Validates field combinations. Empty fields are accepted.
pub fn validate_fields(fields: &ApplicationFields, ctx: &RuleContext) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    validate_date_range(
        fields.start_date,
        fields.end_date,
        fields.benefit_type,
        ctx.today,
        &mut errors,
    );
    validate_co_operation_negotiations(fields, &mut errors);
    validate_pay_subsidy(fields, &mut errors);
    validate_de_minimis(fields, ctx, &mut errors);

    if ctx.organization_type == OrganizationType::Company
        && fields.association_has_business_activities.is_some()
    {
        errors.add(
            "association_has_business_activities",
            "This field can be set for associations only",
        );
    }

    if let Some(benefit_type) = fields.benefit_type {
        let available = available_benefit_types(
            ctx.organization_type,
            fields.association_has_business_activities,
            fields.apprenticeship_program,
        );
        if !available.contains(&benefit_type) {
            errors.add("benefit_type", "This benefit type can not be selected");
        }
    }

    if let Err(employee_errors) = validate_employee(&fields.employee, ctx.min_working_hours) {
        errors.merge_prefixed("employee", employee_errors);
    }

    errors.into_result()
}

/// Validates everything `validate_fields` does, plus the fields required
/// before an application can leave the draft status.
pub fn validate_for_submission(
    fields: &ApplicationFields,
    ctx: &RuleContext,
) -> Result<(), ValidationErrors> {
    let mut errors = validate_fields(fields, ctx).err().unwrap_or_default();

    let missing_text = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
    let required = [
        ("company_bank_account_number", missing_text(&fields.company_bank_account_number)),
        (
            "company_contact_person_phone_number",
            missing_text(&fields.company_contact_person_phone_number),
        ),
        ("company_contact_person_email", missing_text(&fields.company_contact_person_email)),
        (
            "company_contact_person_first_name",
            missing_text(&fields.company_contact_person_first_name),
        ),
        (
            "company_contact_person_last_name",
            missing_text(&fields.company_contact_person_last_name),
        ),
        ("co_operation_negotiations", fields.co_operation_negotiations.is_none()),
        ("pay_subsidy_granted", fields.pay_subsidy_granted.is_none()),
        ("apprenticeship_program", fields.apprenticeship_program.is_none()),
        ("de_minimis_aid", fields.de_minimis_aid.is_none()),
        ("benefit_type", fields.benefit_type.is_none()),
        ("start_date", fields.start_date.is_none()),
        ("end_date", fields.end_date.is_none()),
        ("bases", fields.bases.is_empty()),
        (
            "association_has_business_activities",
            ctx.organization_type == OrganizationType::Association
                && fields.association_has_business_activities.is_none(),
        ),
    ];

    for (field, missing) in required {
        if missing {
            errors.add(field, "This field is required before submitting the application");
        }
    }

    errors.into_result()
}

/// Checks the benefit period.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    benefit_type: Option<BenefitType>,
    today: NaiveDate,
    errors: &mut ValidationErrors,
) {
    let year_start = start_of_year(today, 0);

    if start.is_some_and(|s| s < year_start) {
        errors.add("start_date", "start_date must be within the current year");
    }
    let Some(end) = end else {
        return;
    };
    if end < year_start {
        errors.add("end_date", "end_date must be within the current year");
    }
    let Some(start) = start else {
        return;
    };
    if end < start {
        errors.add("end_date", "application end_date can not be less than start_date");
        return;
    }

    // Full calendar months count: 2021-02-01..2021-02-28 is one month.
    let one_month_end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)));
    if benefit_type != Some(BenefitType::Commission) && one_month_end.is_some_and(|d| d > end) {
        errors.add("end_date", "minimum duration of the benefit is one month");
    }

    if start
        .checked_add_months(Months::new(MAX_BENEFIT_MONTHS))
        .is_some_and(|limit| limit <= end)
    {
        errors.add("end_date", "maximum duration of the benefit is 12 months");
    }
}

fn validate_co_operation_negotiations(fields: &ApplicationFields, errors: &mut ValidationErrors) {
    let has_description = fields
        .co_operation_negotiations_description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if fields.co_operation_negotiations != Some(true) && has_description {
        errors.add(
            "co_operation_negotiations_description",
            "This application can not have a description for co-operation negotiations",
        );
    }
}

fn validate_pay_subsidy(fields: &ApplicationFields, errors: &mut ValidationErrors) {
    if fields.pay_subsidy_granted == Some(true) {
        if fields.pay_subsidy_percent.is_none() {
            errors.add("pay_subsidy_percent", "Pay subsidy percent required");
        }
    } else {
        if fields.pay_subsidy_percent.is_some() {
            errors.add("pay_subsidy_percent", "This application can not have pay_subsidy_percent");
        }
        if fields.additional_pay_subsidy_percent.is_some() {
            errors.add(
                "additional_pay_subsidy_percent",
                "This application can not have additional_pay_subsidy_percent",
            );
        }
    }

    if fields.pay_subsidy_percent.is_none() && fields.additional_pay_subsidy_percent.is_some() {
        errors.add(
            "additional_pay_subsidy_percent",
            "additional_pay_subsidy_percent requires pay_subsidy_percent",
        );
    }

    for (field, value) in [
        ("pay_subsidy_percent", fields.pay_subsidy_percent),
        ("additional_pay_subsidy_percent", fields.additional_pay_subsidy_percent),
    ] {
        if value.is_some_and(|p| !PAY_SUBSIDY_PERCENTS.contains(&p)) {
            errors.add(field, "Invalid pay subsidy percent");
        }
    }
}

fn validate_de_minimis(fields: &ApplicationFields, ctx: &RuleContext, errors: &mut ValidationErrors) {
    if ctx.organization_type == OrganizationType::Association
        && fields.de_minimis_aid.is_some()
        && fields.association_has_business_activities != Some(true)
    {
        errors.add(
            "de_minimis_aid_set",
            "This application has non-null de_minimis_aid but is applied by an association",
        );
    }

    match fields.de_minimis_aid {
        Some(true) if fields.de_minimis_aid_set.is_empty() => errors.add(
            "de_minimis_aid_set",
            "This application has de_minimis_aid set but does not define any",
        ),
        None | Some(false) if !fields.de_minimis_aid_set.is_empty() => {
            errors.add("de_minimis_aid_set", "This application can not have de minimis aid");
        }
        _ => {}
    }

    for (index, aid) in fields.de_minimis_aid_set.iter().enumerate() {
        validate_de_minimis_aid(aid, ctx.today, index, errors);
    }

    let total = fields
        .de_minimis_aid_set
        .iter()
        .try_fold(Decimal::ZERO, |sum, a| sum.checked_add(a.amount));
    if total.is_none_or(|t| t > MAX_DE_MINIMIS_AMOUNT) {
        errors.add("de_minimis_aid_set", "Total amount of de minimis aid too large");
    }
}

fn validate_de_minimis_aid(aid: &DeMinimisAid, today: NaiveDate, index: usize, errors: &mut ValidationErrors) {
    if aid.granter.trim().is_empty() {
        errors.add(format!("de_minimis_aid_set.{index}.granter"), "This field is required");
    }
    if aid.amount < Decimal::ONE || aid.amount > MAX_DE_MINIMIS_AMOUNT {
        errors.add(
            format!("de_minimis_aid_set.{index}.amount"),
            format!("Amount must be between 1 and {MAX_DE_MINIMIS_AMOUNT}"),
        );
    }
    if aid.granted_at < start_of_year(today, DE_MINIMIS_YEARS_BACK) {
        errors.add(format!("de_minimis_aid_set.{index}.granted_at"), "Grant date too much in past");
    } else if aid.granted_at > today {
        errors.add(
            format!("de_minimis_aid_set.{index}.granted_at"),
            "Grant date can not be in the future",
        );
    }
}

/// Validates employee fields that are present.
pub fn validate_employee(employee: &Employee, min_working_hours: Decimal) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !employee.social_security_number.is_empty() && !ssn::is_valid(&employee.social_security_number) {
        errors.add("social_security_number", "Social security number invalid");
    }
    if employee.working_hours.is_some_and(|h| h < min_working_hours) {
        errors.add(
            "working_hours",
            format!("Working hour must be greater than {min_working_hours} per week"),
        );
    }
    if employee.monthly_pay.is_some_and(|p| p <= Decimal::ZERO) {
        errors.add("monthly_pay", "Monthly pay must be greater than 0");
    }
    for (field, value) in [
        ("vacation_money", employee.vacation_money),
        ("other_expenses", employee.other_expenses),
        ("commission_amount", employee.commission_amount),
    ] {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            errors.add(field, format!("{field} must be a positive number"));
        }
    }

    errors.into_result()
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;

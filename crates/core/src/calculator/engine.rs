//! Benefit calculation.
//!
//! The benefit period is split into segments where the pay subsidy and
//! training compensation stay constant. Each segment is prorated by its
//! length in months and rounded to cents; the total is the sum of the
//! rounded segment amounts.

use std::collections::BTreeSet;

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::CalculationError;
use super::types::{
    CalculationInput, CalculationResult, CalculationRow, PaySubsidy, RowType, Segment,
    TrainingCompensation,
};
use crate::application::BenefitType;
use crate::application::rules::PAY_SUBSIDY_PERCENTS;
use crate::validation::ValidationErrors;

/// Benefit period must be shorter than this many months.
pub const CALCULATION_MAX_MONTHS: u32 = 24;

/// Upper limit of the salary benefit per month.
pub const SALARY_BENEFIT_MAX_MONTHLY: Decimal = Decimal::from_parts(800, 0, 0, false, 0);

/// Employment benefit per month.
pub const EMPLOYMENT_BENEFIT_MONTHLY: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Pay subsidy ceiling per month at 100 percent.
pub const PAY_SUBSIDY_MAX_MONTHLY_FULL: Decimal = Decimal::from_parts(1800, 0, 0, false, 0);

/// Pay subsidy ceiling per month at other percents.
pub const PAY_SUBSIDY_MAX_MONTHLY: Decimal = Decimal::from_parts(1400, 0, 0, false, 0);

/// Largest accepted monthly or one-off euro amount.
pub const MAX_INPUT_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 0);

const DAYS_PER_YEAR: Decimal = Decimal::from_parts(36525, 0, 0, false, 2);
const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Something with an inclusive date range.
trait DateRange {
    fn range(&self) -> (NaiveDate, NaiveDate);
}

impl DateRange for PaySubsidy {
    fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }
}

impl DateRange for TrainingCompensation {
    fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }
}

/// Latest-starting range that covers `day`.
fn active_on<T: DateRange>(ranges: &[T], day: NaiveDate) -> Option<&T> {
    ranges
        .iter()
        .filter(|r| {
            let (start, end) = r.range();
            start <= day && day <= end
        })
        .max_by_key(|r| r.range().0)
}

fn check_max_amount(errors: &mut ValidationErrors, field: impl Into<String>, amount: Decimal) {
    if amount > MAX_INPUT_AMOUNT {
        errors.add(field, format!("Must be at most {MAX_INPUT_AMOUNT}"));
    }
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn finnish_date(date: NaiveDate) -> String {
    date.format("%-d.%-m.%Y").to_string()
}

#[derive(Default)]
struct Rows {
    rows: Vec<CalculationRow>,
    next_ordinal: i32,
}

impl Rows {
    fn push(&mut self, row_type: RowType, description: impl Into<String>, amount: Decimal) {
        self.push_range(row_type, description, amount, None);
    }

    fn push_range(
        &mut self,
        row_type: RowType,
        description: impl Into<String>,
        amount: Decimal,
        range: Option<(NaiveDate, NaiveDate)>,
    ) {
        self.rows.push(CalculationRow {
            ordinal: self.next_ordinal,
            row_type,
            description_fi: description.into(),
            amount,
            start_date: range.map(|r| r.0),
            end_date: range.map(|r| r.1),
        });
        self.next_ordinal += 1;
    }
}

/// Stateless benefit calculator.
pub struct BenefitCalculator;

impl BenefitCalculator {
    /// Months in `days` days, on a 365.25 day year.
    #[must_use]
    pub fn months(days: i64) -> Decimal {
        Decimal::from(days) * MONTHS_PER_YEAR / DAYS_PER_YEAR
    }

    /// Checks the input and returns the benefit period.
    pub fn validate(input: &CalculationInput) -> Result<(NaiveDate, NaiveDate), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if input.start_date.is_none() {
            errors.add("start_date", "Start date is required");
        }
        if input.end_date.is_none() {
            errors.add("end_date", "End date is required");
        }
        if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
            if end < start {
                errors.add("end_date", "End date must not be before start date");
            } else if start
                .checked_add_months(Months::new(CALCULATION_MAX_MONTHS))
                .is_none_or(|limit| limit <= end)
            {
                errors.add(
                    "end_date",
                    format!("Benefit period must be shorter than {CALCULATION_MAX_MONTHS} months"),
                );
            }
        }

        if input.monthly_pay < Decimal::ZERO
            || input.vacation_money < Decimal::ZERO
            || input.other_expenses < Decimal::ZERO
        {
            errors.add("monthly_pay", "Pay costs can not be negative");
        }
        check_max_amount(&mut errors, "monthly_pay", input.monthly_pay);
        check_max_amount(&mut errors, "vacation_money", input.vacation_money);
        check_max_amount(&mut errors, "other_expenses", input.other_expenses);
        if input.state_aid_max_percentage < Decimal::ZERO
            || input.state_aid_max_percentage > Decimal::ONE_HUNDRED
        {
            errors.add("state_aid_max_percentage", "Must be between 0 and 100");
        }
        if input.benefit_type == BenefitType::Commission && input.commission_amount.is_none() {
            errors.add("commission_amount", "Commission amount is required");
        }
        if let Some(amount) = input.commission_amount {
            if amount < Decimal::ZERO {
                errors.add("commission_amount", "Amount can not be negative");
            }
            check_max_amount(&mut errors, "commission_amount", amount);
        }
        if let Some(amount) = input.override_monthly_benefit_amount {
            check_max_amount(&mut errors, "override_monthly_benefit_amount", amount);
        }

        let has_comment = input
            .override_monthly_benefit_amount_comment
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        match input.override_monthly_benefit_amount {
            Some(amount) if amount < Decimal::ZERO => {
                errors.add("override_monthly_benefit_amount", "Override can not be negative");
            }
            Some(_) if !has_comment => {
                errors.add(
                    "override_monthly_benefit_amount_comment",
                    "A reason is required for the override",
                );
            }
            None if has_comment => {
                errors.add(
                    "override_monthly_benefit_amount",
                    "Comment given without an override amount",
                );
            }
            _ => {}
        }

        for (i, subsidy) in input.pay_subsidies.iter().enumerate() {
            if !PAY_SUBSIDY_PERCENTS.contains(&subsidy.pay_subsidy_percent) {
                errors.add(
                    format!("pay_subsidies.{i}.pay_subsidy_percent"),
                    "Invalid pay subsidy percent",
                );
            }
            if subsidy.work_time_percent < Decimal::ONE
                || subsidy.work_time_percent > Decimal::ONE_HUNDRED
            {
                errors.add(
                    format!("pay_subsidies.{i}.work_time_percent"),
                    "Must be between 1 and 100",
                );
            }
            if subsidy.end_date < subsidy.start_date {
                errors.add(
                    format!("pay_subsidies.{i}.end_date"),
                    "End date must not be before start date",
                );
            }
        }
        for (i, training) in input.training_compensations.iter().enumerate() {
            if training.monthly_amount < Decimal::ZERO {
                errors.add(
                    format!("training_compensations.{i}.monthly_amount"),
                    "Amount can not be negative",
                );
            }
            check_max_amount(
                &mut errors,
                format!("training_compensations.{i}.monthly_amount"),
                training.monthly_amount,
            );
            if training.end_date < training.start_date {
                errors.add(
                    format!("training_compensations.{i}.end_date"),
                    "End date must not be before start date",
                );
            }
        }

        errors.into_result()?;
        match (input.start_date, input.end_date) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ValidationErrors::single("start_date", "Start date is required")),
        }
    }

    /// Splits `[start, end]` wherever a subsidy or training range starts or ends.
    #[must_use]
    pub fn segments<'a>(
        start: NaiveDate,
        end: NaiveDate,
        pay_subsidies: &'a [PaySubsidy],
        training_compensations: &'a [TrainingCompensation],
    ) -> Vec<Segment<'a>> {
        if end < start {
            return Vec::new();
        }

        let mut starts = BTreeSet::from([start]);
        let ranges = pay_subsidies
            .iter()
            .map(DateRange::range)
            .chain(training_compensations.iter().map(DateRange::range));
        for (range_start, range_end) in ranges {
            if range_start > start && range_start <= end {
                starts.insert(range_start);
            }
            if let Some(after) = range_end.succ_opt()
                && after > start
                && after <= end
            {
                starts.insert(after);
            }
        }

        let starts: Vec<NaiveDate> = starts.into_iter().collect();
        starts
            .iter()
            .enumerate()
            .map(|(i, &segment_start)| {
                let segment_end = starts
                    .get(i + 1)
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(end);
                Segment {
                    start: segment_start,
                    end: segment_end,
                    pay_subsidy: active_on(pay_subsidies, segment_start),
                    training_compensation: active_on(training_compensations, segment_start),
                }
            })
            .collect()
    }

    /// Pay subsidy per month, limited by the ceiling scaled to working time.
    #[must_use]
    pub fn monthly_pay_subsidy(total_monthly_pay: Decimal, subsidy: &PaySubsidy) -> Decimal {
        let ceiling = if subsidy.pay_subsidy_percent == 100 {
            PAY_SUBSIDY_MAX_MONTHLY_FULL
        } else {
            PAY_SUBSIDY_MAX_MONTHLY
        };
        let share = total_monthly_pay * Decimal::from(subsidy.pay_subsidy_percent)
            / Decimal::ONE_HUNDRED;
        share.min(ceiling * subsidy.work_time_percent / Decimal::ONE_HUNDRED)
    }

    /// Salary benefit per month after subsidy and training compensation.
    #[must_use]
    pub fn monthly_salary_benefit(
        eligible: Decimal,
        pay_subsidy: Decimal,
        training_compensation: Decimal,
    ) -> Decimal {
        (eligible - pay_subsidy - training_compensation)
            .clamp(Decimal::ZERO, SALARY_BENEFIT_MAX_MONTHLY)
    }

    /// Calculates the benefit and its breakdown.
    pub fn calculate(input: &CalculationInput) -> Result<CalculationResult, CalculationError> {
        let (start, end) = Self::validate(input)?;

        let total_monthly_pay = input.monthly_pay + input.vacation_money + input.other_expenses;
        let eligible = total_monthly_pay * input.state_aid_max_percentage / Decimal::ONE_HUNDRED;
        let total_months = Self::months((end - start).num_days() + 1);

        let mut rows = Rows::default();
        let calculated = match input.benefit_type {
            BenefitType::Salary => {
                rows.push(
                    RowType::SalaryCosts,
                    "Palkkauskustannukset yhteensä / kk",
                    round_cents(total_monthly_pay),
                );
                rows.push(
                    RowType::StateAidMaxMonthlyEligible,
                    "Tukeen oikeuttava summa / kk",
                    round_cents(eligible),
                );

                let mut total = Decimal::ZERO;
                for segment in Self::segments(
                    start,
                    end,
                    &input.pay_subsidies,
                    &input.training_compensations,
                ) {
                    let range = Some((segment.start, segment.end));
                    rows.push_range(
                        RowType::Description,
                        format!(
                            "Ajalta {} - {}",
                            finnish_date(segment.start),
                            finnish_date(segment.end)
                        ),
                        Decimal::ZERO,
                        range,
                    );

                    let subsidy = segment.pay_subsidy.map_or(Decimal::ZERO, |s| {
                        Self::monthly_pay_subsidy(total_monthly_pay, s)
                    });
                    if segment.pay_subsidy.is_some() {
                        rows.push_range(
                            RowType::PaySubsidyMonthly,
                            "Palkkatuki / kk",
                            round_cents(subsidy),
                            range,
                        );
                    }

                    let training = segment
                        .training_compensation
                        .map_or(Decimal::ZERO, |t| t.monthly_amount);
                    if segment.training_compensation.is_some() {
                        rows.push_range(
                            RowType::TrainingCompensationMonthly,
                            "Oppisopimuksen koulutuskorvaus / kk",
                            round_cents(training),
                            range,
                        );
                    }

                    let monthly = Self::monthly_salary_benefit(eligible, subsidy, training);
                    rows.push_range(
                        RowType::SalaryBenefitMonthly,
                        "Helsinki-lisä / kk",
                        round_cents(monthly),
                        range,
                    );

                    let sub_total = round_cents(monthly * Self::months(segment.days()));
                    rows.push_range(
                        RowType::SalaryBenefitSubTotal,
                        "Helsinki-lisä ajalta",
                        sub_total,
                        range,
                    );
                    total += sub_total;
                }
                total
            }
            BenefitType::Employment => {
                rows.push(
                    RowType::EmploymentBenefitMonthly,
                    "Työllistämisen Helsinki-lisä / kk",
                    EMPLOYMENT_BENEFIT_MONTHLY,
                );
                let sub_total = round_cents(EMPLOYMENT_BENEFIT_MONTHLY * total_months);
                rows.push_range(
                    RowType::EmploymentBenefitSubTotal,
                    format!("Ajalta {} - {}", finnish_date(start), finnish_date(end)),
                    sub_total,
                    Some((start, end)),
                );
                sub_total
            }
            BenefitType::Commission => {
                let amount = round_cents(input.commission_amount.unwrap_or_default());
                rows.push(
                    RowType::CommissionTotal,
                    "Toimeksiantosopimuksen Helsinki-lisä",
                    amount,
                );
                amount
            }
        };

        let manual = input
            .override_monthly_benefit_amount
            .map(|monthly| round_cents(monthly * total_months));

        let rows = if let Some(manual) = manual {
            let mut rows = Rows::default();
            rows.push_range(
                RowType::ManualOverrideTotal,
                format!(
                    "Käsittelijän syöttämä Helsinki-lisä ajalta {} - {}",
                    finnish_date(start),
                    finnish_date(end)
                ),
                manual,
                Some((start, end)),
            );
            rows.push(RowType::TotalEur, "Yhteensä", manual);
            rows
        } else {
            rows.push(RowType::TotalEur, "Yhteensä", calculated);
            rows
        };

        Ok(CalculationResult {
            rows: rows.rows,
            calculated_benefit_amount: calculated,
            manual_benefit_amount: manual,
            duration_in_months_rounded: round_cents(total_months),
        })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

//! Property tests for the calculator.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::*;
use crate::application::BenefitType;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn day(offset: u64) -> NaiveDate {
    base() + Days::new(offset)
}

prop_compose! {
    fn arb_subsidy()(start in 0_u64..700, len in 0_u64..200, pct in prop::sample::select(vec![30, 40, 50, 70, 100]), work in 1_i64..=100) -> PaySubsidy {
        PaySubsidy {
            start_date: day(start),
            end_date: day(start + len),
            pay_subsidy_percent: pct,
            work_time_percent: Decimal::from(work),
            disability_or_illness: false,
        }
    }
}

prop_compose! {
    fn arb_training()(start in 0_u64..700, len in 0_u64..200, amount in 0_i64..2000) -> TrainingCompensation {
        TrainingCompensation {
            start_date: day(start),
            end_date: day(start + len),
            monthly_amount: Decimal::from(amount),
        }
    }
}

proptest! {
    #[test]
    fn segments_cover_period_without_gaps(
        length in 0_u64..700,
        subsidies in prop::collection::vec(arb_subsidy(), 0..4),
        trainings in prop::collection::vec(arb_training(), 0..3),
    ) {
        let end = day(length);
        let segments = BenefitCalculator::segments(base(), end, &subsidies, &trainings);

        prop_assert!(!segments.is_empty());
        prop_assert_eq!(segments[0].start, base());
        prop_assert_eq!(segments[segments.len() - 1].end, end);
        for pair in segments.windows(2) {
            prop_assert_eq!(pair[0].end.succ_opt(), Some(pair[1].start));
        }
        let days: i64 = segments.iter().map(Segment::days).sum();
        prop_assert_eq!(days, (end - base()).num_days() + 1);
    }

    #[test]
    fn total_is_sum_of_sub_totals(
        length in 0_u64..700,
        pay in 0_i64..6000,
        subsidies in prop::collection::vec(arb_subsidy(), 0..4),
        trainings in prop::collection::vec(arb_training(), 0..3),
    ) {
        let input = CalculationInput {
            benefit_type: BenefitType::Salary,
            start_date: Some(base()),
            end_date: Some(day(length)),
            monthly_pay: Decimal::from(pay),
            vacation_money: Decimal::ZERO,
            other_expenses: Decimal::ZERO,
            state_aid_max_percentage: Decimal::ONE_HUNDRED,
            commission_amount: None,
            override_monthly_benefit_amount: None,
            override_monthly_benefit_amount_comment: None,
            pay_subsidies: subsidies,
            training_compensations: trainings,
        };
        let result = BenefitCalculator::calculate(&input).unwrap();

        let sum: Decimal = result
            .rows
            .iter()
            .filter(|r| r.row_type.is_sub_total())
            .map(|r| r.amount)
            .sum();
        prop_assert_eq!(sum, result.calculated_benefit_amount);

        for row in result.rows.iter().filter(|r| r.row_type == RowType::SalaryBenefitMonthly) {
            prop_assert!(row.amount >= Decimal::ZERO);
            prop_assert!(row.amount <= SALARY_BENEFIT_MAX_MONTHLY);
        }
        let ordinals: Vec<i32> = result.rows.iter().map(|r| r.ordinal).collect();
        prop_assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    }
}

//! Benefit calculator.
//!
//! - `types` - Inputs, breakdown rows, and results
//! - `engine` - Segmentation, proration, and rounding

mod engine;
mod error;
mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{
    BenefitCalculator, CALCULATION_MAX_MONTHS, EMPLOYMENT_BENEFIT_MONTHLY, MAX_INPUT_AMOUNT,
    PAY_SUBSIDY_MAX_MONTHLY, PAY_SUBSIDY_MAX_MONTHLY_FULL, SALARY_BENEFIT_MAX_MONTHLY,
};
pub use error::CalculationError;
pub use types::{
    Calculation, CalculationInput, CalculationResult, CalculationRow, CalculationUpdate,
    DEFAULT_STATE_AID_MAX_PERCENTAGE, PaySubsidy, RowType, Segment, TrainingCompensation,
};

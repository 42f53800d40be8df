//! Benefit calculation repository.
//!
//! Inputs are stored as entered; rows are always recomputed by the
//! calculator before they are written.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use benefit_core::application::BenefitType;
use benefit_core::calculator::{
    BenefitCalculator, Calculation, CalculationError, CalculationInput, CalculationResult,
    CalculationRow, CalculationUpdate, PaySubsidy, RowType, TrainingCompensation,
};
use benefit_core::workflow::{Actor, WorkflowService};

use super::convert::{application_to_domain, now};
use crate::entities::{
    applications, calculation_rows, calculations, pay_subsidies, training_compensations,
};

/// Calculation repository.
#[derive(Debug, Clone)]
pub struct CalculationRepository {
    db: DatabaseConnection,
    association_form_codes: Vec<i32>,
}

impl CalculationRepository {
    /// Creates a new calculation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, association_form_codes: Vec<i32>) -> Self {
        Self {
            db,
            association_form_codes,
        }
    }

    /// Loads the calculation of an application with its breakdown.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationNotFound` if the application does not exist.
    pub async fn get(&self, application_id: Uuid) -> Result<Option<Calculation>, CalculationError> {
        let app_model = applications::Entity::find_by_id(application_id)
            .one(&self.db)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?
            .ok_or(CalculationError::ApplicationNotFound(application_id))?;
        let application = application_to_domain(app_model, &self.association_form_codes)
            .map_err(CalculationError::Database)?;

        let Some(model) = calculations::Entity::find()
            .filter(calculations::Column::ApplicationId.eq(application_id))
            .one(&self.db)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let commission_amount = application.fields.employee.commission_amount;
        load_calculation(&self.db, model, commission_amount)
            .await
            .map(Some)
    }

    /// Stores calculation inputs, recomputes the breakdown, and updates the
    /// benefit amounts of the application.
    ///
    /// # Errors
    ///
    /// - `NotEditable` when a handler can no longer change the application
    /// - `Validation` when the inputs are not valid
    pub async fn save(
        &self,
        application_id: Uuid,
        handler_id: Uuid,
        update: &CalculationUpdate,
    ) -> Result<Calculation, CalculationError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?;

        let app_model = applications::Entity::find_by_id(application_id)
            .one(&txn)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?
            .ok_or(CalculationError::ApplicationNotFound(application_id))?;
        let application = application_to_domain(app_model.clone(), &self.association_form_codes)
            .map_err(CalculationError::Database)?;

        if !WorkflowService::is_editable_by(application.status, Actor::Handler) {
            return Err(CalculationError::NotEditable(application.status));
        }

        let input = update.to_input(&application)?;
        let result = BenefitCalculator::calculate(&input)?;

        let existing = calculations::Entity::find()
            .filter(calculations::Column::ApplicationId.eq(application_id))
            .one(&txn)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?;

        let timestamp = now();
        let (calculation_id, mut active) = match existing {
            Some(model) => (model.id, calculations::ActiveModel::from(model)),
            None => {
                let id = Uuid::new_v4();
                let active = calculations::ActiveModel {
                    id: Set(id),
                    application_id: Set(application_id),
                    created_at: Set(timestamp),
                    ..Default::default()
                };
                (id, active)
            }
        };
        active.benefit_type = Set(input.benefit_type.as_str().to_string());
        active.start_date = Set(input.start_date);
        active.end_date = Set(input.end_date);
        active.monthly_pay = Set(input.monthly_pay);
        active.vacation_money = Set(input.vacation_money);
        active.other_expenses = Set(input.other_expenses);
        active.state_aid_max_percentage = Set(input.state_aid_max_percentage);
        active.granted_as_de_minimis_aid = Set(update.granted_as_de_minimis_aid);
        active.target_group_check = Set(update.target_group_check);
        active.calculated_benefit_amount = Set(Some(result.calculated_benefit_amount));
        active.override_monthly_benefit_amount = Set(input.override_monthly_benefit_amount);
        active.override_monthly_benefit_amount_comment =
            Set(input.override_monthly_benefit_amount_comment.clone());
        active.duration_in_months_rounded = Set(Some(result.duration_in_months_rounded));
        active.handler_id = Set(Some(handler_id));
        active.updated_at = Set(timestamp);
        active
            .save(&txn)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?;

        replace_inputs(&txn, application_id, &input).await?;
        replace_rows(&txn, calculation_id, &result).await?;

        let mut app_active: applications::ActiveModel = app_model.into();
        app_active.calculated_benefit_amount = Set(Some(result.calculated_benefit_amount));
        app_active.manual_benefit_amount = Set(result.manual_benefit_amount);
        app_active.updated_at = Set(timestamp);
        app_active
            .update(&txn)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?;

        tracing::info!(
            %application_id,
            amount = %result.benefit_amount(),
            rows = result.rows.len(),
            "calculation saved"
        );

        Ok(Calculation {
            id: calculation_id,
            application_id,
            handler_id: Some(handler_id),
            input,
            granted_as_de_minimis_aid: update.granted_as_de_minimis_aid,
            target_group_check: update.target_group_check,
            calculated_benefit_amount: Some(result.calculated_benefit_amount),
            duration_in_months_rounded: Some(result.duration_in_months_rounded),
            rows: result.rows,
            modified_at: Utc::now(),
        })
    }
}

async fn replace_inputs<C: ConnectionTrait>(
    conn: &C,
    application_id: Uuid,
    input: &CalculationInput,
) -> Result<(), CalculationError> {
    pay_subsidies::Entity::delete_many()
        .filter(pay_subsidies::Column::ApplicationId.eq(application_id))
        .exec(conn)
        .await
        .map_err(|e| CalculationError::Database(e.to_string()))?;
    training_compensations::Entity::delete_many()
        .filter(training_compensations::Column::ApplicationId.eq(application_id))
        .exec(conn)
        .await
        .map_err(|e| CalculationError::Database(e.to_string()))?;

    if !input.pay_subsidies.is_empty() {
        let models = (1..).zip(&input.pay_subsidies).map(|(ordinal, s)| pay_subsidies::ActiveModel {
            id: Set(Uuid::new_v4()),
            application_id: Set(application_id),
            ordinal: Set(ordinal),
            start_date: Set(s.start_date),
            end_date: Set(s.end_date),
            pay_subsidy_percent: Set(s.pay_subsidy_percent),
            work_time_percent: Set(s.work_time_percent),
            disability_or_illness: Set(s.disability_or_illness),
        });
        pay_subsidies::Entity::insert_many(models)
            .exec(conn)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?;
    }

    if !input.training_compensations.is_empty() {
        let models = (1..)
            .zip(&input.training_compensations)
            .map(|(ordinal, t)| training_compensations::ActiveModel {
                id: Set(Uuid::new_v4()),
                application_id: Set(application_id),
                ordinal: Set(ordinal),
                start_date: Set(t.start_date),
                end_date: Set(t.end_date),
                monthly_amount: Set(t.monthly_amount),
            });
        training_compensations::Entity::insert_many(models)
            .exec(conn)
            .await
            .map_err(|e| CalculationError::Database(e.to_string()))?;
    }

    Ok(())
}

async fn replace_rows<C: ConnectionTrait>(
    conn: &C,
    calculation_id: Uuid,
    result: &CalculationResult,
) -> Result<(), CalculationError> {
    calculation_rows::Entity::delete_many()
        .filter(calculation_rows::Column::CalculationId.eq(calculation_id))
        .exec(conn)
        .await
        .map_err(|e| CalculationError::Database(e.to_string()))?;

    if result.rows.is_empty() {
        return Ok(());
    }

    let models = result.rows.iter().map(|row| calculation_rows::ActiveModel {
        id: Set(Uuid::new_v4()),
        calculation_id: Set(calculation_id),
        ordinal: Set(row.ordinal),
        row_type: Set(row.row_type.as_str().to_string()),
        description_fi: Set(row.description_fi.clone()),
        amount: Set(row.amount),
        start_date: Set(row.start_date),
        end_date: Set(row.end_date),
    });
    calculation_rows::Entity::insert_many(models)
        .exec(conn)
        .await
        .map_err(|e| CalculationError::Database(e.to_string()))?;

    Ok(())
}

async fn load_calculation<C: ConnectionTrait>(
    conn: &C,
    model: calculations::Model,
    commission_amount: Option<Decimal>,
) -> Result<Calculation, CalculationError> {
    let subsidies = pay_subsidies::Entity::find()
        .filter(pay_subsidies::Column::ApplicationId.eq(model.application_id))
        .order_by_asc(pay_subsidies::Column::Ordinal)
        .all(conn)
        .await
        .map_err(|e| CalculationError::Database(e.to_string()))?;
    let trainings = training_compensations::Entity::find()
        .filter(training_compensations::Column::ApplicationId.eq(model.application_id))
        .order_by_asc(training_compensations::Column::Ordinal)
        .all(conn)
        .await
        .map_err(|e| CalculationError::Database(e.to_string()))?;
    let rows = calculation_rows::Entity::find()
        .filter(calculation_rows::Column::CalculationId.eq(model.id))
        .order_by_asc(calculation_rows::Column::Ordinal)
        .all(conn)
        .await
        .map_err(|e| CalculationError::Database(e.to_string()))?;

    let benefit_type = BenefitType::parse(&model.benefit_type).ok_or_else(|| {
        CalculationError::Database(format!("unknown benefit type {}", model.benefit_type))
    })?;
    let rows = rows
        .into_iter()
        .map(|row| {
            let row_type = RowType::parse(&row.row_type).ok_or_else(|| {
                CalculationError::Database(format!("unknown row type {}", row.row_type))
            })?;
            Ok(CalculationRow {
                ordinal: row.ordinal,
                row_type,
                description_fi: row.description_fi,
                amount: row.amount,
                start_date: row.start_date,
                end_date: row.end_date,
            })
        })
        .collect::<Result<Vec<_>, CalculationError>>()?;

    Ok(Calculation {
        id: model.id,
        application_id: model.application_id,
        handler_id: model.handler_id,
        input: CalculationInput {
            benefit_type,
            start_date: model.start_date,
            end_date: model.end_date,
            monthly_pay: model.monthly_pay,
            vacation_money: model.vacation_money,
            other_expenses: model.other_expenses,
            state_aid_max_percentage: model.state_aid_max_percentage,
            commission_amount,
            override_monthly_benefit_amount: model.override_monthly_benefit_amount,
            override_monthly_benefit_amount_comment: model.override_monthly_benefit_amount_comment,
            pay_subsidies: subsidies
                .into_iter()
                .map(|s| PaySubsidy {
                    start_date: s.start_date,
                    end_date: s.end_date,
                    pay_subsidy_percent: s.pay_subsidy_percent,
                    work_time_percent: s.work_time_percent,
                    disability_or_illness: s.disability_or_illness,
                })
                .collect(),
            training_compensations: trainings
                .into_iter()
                .map(|t| TrainingCompensation {
                    start_date: t.start_date,
                    end_date: t.end_date,
                    monthly_amount: t.monthly_amount,
                })
                .collect(),
        },
        granted_as_de_minimis_aid: model.granted_as_de_minimis_aid,
        target_group_check: model.target_group_check,
        calculated_benefit_amount: model.calculated_benefit_amount,
        duration_in_months_rounded: model.duration_in_months_rounded,
        rows,
        modified_at: model.updated_at.with_timezone(&Utc),
    })
}

//! `SeaORM` Entity for calculations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calculations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub application_id: Uuid,
    pub benefit_type: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub vacation_money: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub other_expenses: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub state_aid_max_percentage: Decimal,
    pub granted_as_de_minimis_aid: bool,
    pub target_group_check: bool,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub calculated_benefit_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub override_monthly_benefit_amount: Option<Decimal>,
    pub override_monthly_benefit_amount_comment: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))", nullable)]
    pub duration_in_months_rounded: Option<Decimal>,
    pub handler_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id",
        on_delete = "Cascade"
    )]
    Applications,
    #[sea_orm(has_many = "super::calculation_rows::Entity")]
    CalculationRows,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::calculation_rows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalculationRows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

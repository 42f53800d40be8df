//! `SeaORM` Entity for applications table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ApplicationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub application_number: i32,
    pub status: ApplicationStatus,
    pub company_id: Uuid,
    pub company_name: String,
    pub company_business_id: String,
    pub company_form_code: i32,
    pub company_street_address: String,
    pub company_postcode: String,
    pub company_city: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub fields: Json,
    pub handler_id: Option<Uuid>,
    pub batch_id: Option<Uuid>,
    pub archived: bool,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub calculated_benefit_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub manual_benefit_amount: Option<Decimal>,
    pub case_id: Option<String>,
    pub case_guid: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Companies,
    #[sea_orm(
        belongs_to = "super::application_batches::Entity",
        from = "Column::BatchId",
        to = "super::application_batches::Column::Id"
    )]
    ApplicationBatches,
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
    #[sea_orm(has_one = "super::calculations::Entity")]
    Calculations,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::application_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApplicationBatches.def()
    }
}

impl Related<super::attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::calculations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calculations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

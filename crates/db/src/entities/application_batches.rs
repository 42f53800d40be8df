//! `SeaORM` Entity for application_batches table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BatchDecision, BatchStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub status: BatchStatus,
    pub proposal_for_decision: BatchDecision,
    pub handler_id: Option<Uuid>,
    pub decision_maker_title: Option<String>,
    pub decision_maker_name: Option<String>,
    pub section_of_the_law: Option<String>,
    pub decision_date: Option<Date>,
    pub expert_inspector_name: Option<String>,
    pub expert_inspector_title: Option<String>,
    pub p2p_inspector_name: Option<String>,
    pub p2p_inspector_email: Option<String>,
    pub p2p_checker_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

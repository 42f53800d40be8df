//! `SeaORM` entities.

pub mod prelude;

pub mod application_batches;
pub mod application_log_entries;
pub mod applications;
pub mod attachments;
pub mod audit_log_entries;
pub mod calculation_rows;
pub mod calculations;
pub mod case_system_statuses;
pub mod companies;
pub mod pay_subsidies;
pub mod sea_orm_active_enums;
pub mod training_compensations;
pub mod users;

//! `SeaORM` entity prelude.

pub use super::application_batches::Entity as ApplicationBatches;
pub use super::application_log_entries::Entity as ApplicationLogEntries;
pub use super::applications::Entity as Applications;
pub use super::attachments::Entity as Attachments;
pub use super::audit_log_entries::Entity as AuditLogEntries;
pub use super::calculation_rows::Entity as CalculationRows;
pub use super::calculations::Entity as Calculations;
pub use super::case_system_statuses::Entity as CaseSystemStatuses;
pub use super::companies::Entity as Companies;
pub use super::pay_subsidies::Entity as PaySubsidies;
pub use super::training_compensations::Entity as TrainingCompensations;
pub use super::users::Entity as Users;

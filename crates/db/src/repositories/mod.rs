//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

mod convert;

pub mod application;
pub mod attachment;
pub mod batch;
pub mod calculation;
pub mod case_system;
pub mod company;
pub mod user;

pub use application::{ApplicationFilter, ApplicationRepository};
pub use attachment::AttachmentRepository;
pub use batch::{BatchDetails, BatchRepository, BatchWithApplications};
pub use calculation::CalculationRepository;
pub use case_system::{CaseSystemRepository, OpenedCase};
pub use company::CompanyRepository;
pub use user::UserRepository;

//! Request authentication.

pub mod auth;
pub mod service;

pub use auth::{AuthUser, auth_middleware};
pub use service::{CaseSystemAuth, PaymentRobot};

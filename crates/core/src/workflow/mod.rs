//! Application status workflow.
//!
//! # Modules
//!
//! - `types` - Actor, side effects, and validated status changes
//! - `error` - Workflow-specific error types
//! - `service` - Transition predicates for applications and batches

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowService;
pub use types::{Actor, SideEffect, StatusChange};

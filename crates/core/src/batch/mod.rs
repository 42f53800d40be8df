//! Decision batches.
//!
//! A batch groups accepted or rejected applications that go to the decision
//! maker together. Every member shares the batch's proposal.

mod error;
mod service;
mod types;

pub use error::BatchError;
pub use service::{BatchService, BatchStatusChange};
pub use types::{Batch, BatchStatus, Decision, DecisionFields};

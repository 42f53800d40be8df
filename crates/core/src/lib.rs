//! Core business logic for the benefit backend.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `application` - Application fields, employee checks, de minimis aid
//! - `workflow` - Application and batch status transition guard
//! - `batch` - Decision batch rules
//! - `calculator` - Benefit amount calculation with pay subsidy proration
//! - `attachment` - Attachment requirements and upload handling
//! - `storage` - Object storage for attachment files
//! - `export` - Payment CSV and decision document bundles

pub mod application;
pub mod attachment;
pub mod batch;
pub mod calculator;
pub mod export;
pub mod storage;
pub mod time;
pub mod validation;
pub mod workflow;

pub use validation::ValidationErrors;

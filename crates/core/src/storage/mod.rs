//! Object storage for attachment files using Apache OpenDAL.
//!
//! The backend is chosen by configuration: S3-compatible, Azure Blob, or a
//! local directory. Tests use the in-memory backend.

mod error;
mod service;

pub use error::StorageError;
pub use service::{StorageService, sanitize_filename, storage_key};

//! Application attachments.
//!
//! - `requirements` - Required and optional attachment types per benefit type
//! - `service` - Upload, download, and deletion with storage

mod error;
mod requirements;
mod service;
mod types;

pub use error::AttachmentError;
pub use requirements::{ALWAYS_ALLOWED, AttachmentRequirements};
pub use service::{ALLOWED_CONTENT_TYPES, AttachmentRepository, AttachmentService, MAX_ATTACHMENTS};
pub use types::{Attachment, AttachmentType, CreateAttachmentInput, UploadInput};

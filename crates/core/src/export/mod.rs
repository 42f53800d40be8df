//! Export files.
//!
//! - `payment` - CSV for the payment system
//! - `decision` - HTML decision documents zipped per batch

mod decision;
mod error;
mod payment;

pub use decision::{
    DecisionDocument, application_document, batch_documents, composed_document, zip_documents,
};
pub use error::ExportError;
pub use payment::{PaymentRow, payment_csv};

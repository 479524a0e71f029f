//! Services module for bill-service.

pub mod database;
pub mod export;
pub mod metrics;
pub mod sequence;

pub use database::Database;
pub use export::{render_export, write_export, Export, ExportFormat};
pub use metrics::{get_metrics, init_metrics};
pub use sequence::{next_invoice_number, NextInvoiceNumber};

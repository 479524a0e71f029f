//! HTTP handlers for bill-service.

pub mod export;
pub mod health;
pub mod invoices;

pub use export::{export_csv, export_json};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use invoices::{get_invoice, list_invoices, next_invoice, save_invoice};

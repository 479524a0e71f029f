//! Domain models for bill-service.

mod invoice;

pub use invoice::{ClearOutcome, InvoiceRecord, InvoiceSummary, ListInvoicesFilter, SaveInvoice};

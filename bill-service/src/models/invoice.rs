//! Invoice model for bill-service.

use chrono::{DateTime, Utc};
use serde_json::Value;
use service_core::error::AppError;
use sqlx::types::Json;
use sqlx::FromRow;

/// Stored invoice row: the searchable projection plus the full document.
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRecord {
    pub id: i64,
    pub invoice_no: String,
    pub date: Option<String>,
    pub receiver_name: String,
    pub consignee_name: String,
    pub grand_total: f64,
    pub data: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The denormalized columns of an invoice, in export column order.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct InvoiceSummary {
    pub invoice_no: String,
    pub date: Option<String>,
    pub receiver_name: String,
    pub consignee_name: String,
    pub grand_total: f64,
}

/// Input for the upsert: an invoice document and the projection derived from it.
#[derive(Debug, Clone)]
pub struct SaveInvoice {
    pub invoice_no: String,
    pub date: Option<String>,
    pub receiver_name: String,
    pub consignee_name: String,
    pub grand_total: f64,
    pub document: Value,
}

impl SaveInvoice {
    /// Derive the projection from a submitted invoice document.
    ///
    /// Only `invoiceNo` is required: a non-empty string or a non-zero number. Missing party names become `""` and a
    /// missing or non-numeric `grandTotal` becomes `0`.
    pub fn from_document(document: Value) -> Result<Self, AppError> {
        let invoice_no = document
            .get("invoiceNo")
            .and_then(invoice_no_text)
            .ok_or_else(|| AppError::ValidationError("invoiceNo required".to_string()))?;

        let date = document.get("date").and_then(scalar_text);
        let receiver_name = party_name(&document, "receiver");
        let consignee_name = party_name(&document, "consignee");
        let grand_total = document.get("grandTotal").map(coerce_total).unwrap_or(0.0);

        Ok(Self {
            invoice_no,
            date,
            receiver_name,
            consignee_name,
            grand_total,
            document,
        })
    }
}

/// Filter for listing invoices. All present conditions must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListInvoicesFilter {
    /// Inclusive `(from, to)` range on the ISO date string.
    pub date_range: Option<(String, String)>,
    /// Substring of the invoice number.
    pub invoice_no: Option<String>,
    /// Substring of either the receiver or the consignee name.
    pub customer_name: Option<String>,
}

/// Result of a bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    AlreadyEmpty,
    Deleted(u64),
}

fn invoice_no_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn party_name(document: &Value, party: &str) -> String {
    document
        .get(party)
        .and_then(|p| p.get("name"))
        .and_then(scalar_text)
        .unwrap_or_default()
}

fn coerce_total(value: &Value) -> f64 {
    let total = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if total.is_finite() {
        total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_projection_from_nested_document() {
        let input = SaveInvoice::from_document(json!({
            "invoiceNo": "INV20240115-001",
            "date": "2024-01-15",
            "receiver": { "name": "Acme, Inc." },
            "consignee": { "name": "Depot" },
            "grandTotal": 1234.5,
            "items": [{ "description": "Bolts", "qty": 10 }]
        }))
        .unwrap();

        assert_eq!(input.invoice_no, "INV20240115-001");
        assert_eq!(input.date.as_deref(), Some("2024-01-15"));
        assert_eq!(input.receiver_name, "Acme, Inc.");
        assert_eq!(input.consignee_name, "Depot");
        assert_eq!(input.grand_total, 1234.5);
    }

    #[test]
    fn missing_invoice_no_is_rejected() {
        let err = SaveInvoice::from_document(json!({ "date": "2024-01-15" })).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m == "invoiceNo required"));
    }

    #[test]
    fn empty_or_null_invoice_no_is_rejected() {
        assert!(SaveInvoice::from_document(json!({ "invoiceNo": "" })).is_err());
        assert!(SaveInvoice::from_document(json!({ "invoiceNo": null })).is_err());
        assert!(SaveInvoice::from_document(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn boolean_or_zero_invoice_no_is_rejected() {
        for value in [json!(false), json!(true), json!(0), json!(0.0), json!(-0.0)] {
            let err = SaveInvoice::from_document(json!({ "invoiceNo": value })).unwrap_err();
            assert!(
                matches!(err, AppError::ValidationError(ref m) if m == "invoiceNo required"),
                "expected rejection for {value}"
            );
        }
    }

    #[test]
    fn numeric_invoice_no_is_accepted_as_text() {
        let input = SaveInvoice::from_document(json!({ "invoiceNo": 42 })).unwrap();
        assert_eq!(input.invoice_no, "42");
    }

    #[test]
    fn missing_parties_default_to_empty() {
        let input = SaveInvoice::from_document(json!({
            "invoiceNo": "X",
            "receiver": {},
        }))
        .unwrap();

        assert_eq!(input.receiver_name, "");
        assert_eq!(input.consignee_name, "");
        assert_eq!(input.date, None);
    }

    #[test]
    fn grand_total_coercion() {
        assert_eq!(coerce_total(&json!("250.75")), 250.75);
        assert_eq!(coerce_total(&json!(" 99 ")), 99.0);
        assert_eq!(coerce_total(&json!("")), 0.0);
        assert_eq!(coerce_total(&json!("twelve")), 0.0);
        assert_eq!(coerce_total(&json!(null)), 0.0);
        assert_eq!(coerce_total(&json!({ "amount": 5 })), 0.0);
        assert_eq!(coerce_total(&json!("inf")), 0.0);
        assert_eq!(coerce_total(&json!(true)), 1.0);
    }
}

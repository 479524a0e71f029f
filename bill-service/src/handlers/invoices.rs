//! Invoice handlers: upsert, list, fetch and number suggestion.

use crate::dtos::{ListInvoicesParams, NextInvoiceParams, SaveInvoiceResponse};
use crate::models::{ListInvoicesFilter, SaveInvoice};
use crate::services::metrics::{record_error, INVOICES_SAVED_TOTAL};
use crate::services::{next_invoice_number, NextInvoiceNumber};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

/// Insert or replace an invoice keyed by its `invoiceNo`.
pub async fn save_invoice(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SaveInvoiceResponse>, AppError> {
    let Json(document) = payload.map_err(|rejection| {
        record_error("validation");
        AppError::BadRequest(anyhow::anyhow!(rejection.body_text()))
    })?;

    let input = SaveInvoice::from_document(document).inspect_err(|e| record_error(e.kind()))?;

    tracing::info!(invoice_no = %input.invoice_no, "Saving invoice");

    state
        .db
        .save_invoice(&input)
        .await
        .inspect_err(|e| record_error(e.kind()))?;

    INVOICES_SAVED_TOTAL.inc();

    Ok(Json(SaveInvoiceResponse { ok: true }))
}

/// List stored invoice documents, optionally filtered.
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListInvoicesParams>,
) -> Result<Json<Vec<Value>>, AppError> {
    let filter = ListInvoicesFilter::from(params);

    let invoices = state
        .db
        .list_invoices(&filter)
        .await
        .inspect_err(|e| record_error(e.kind()))?;

    tracing::debug!(count = invoices.len(), ?filter, "Listed invoices");

    Ok(Json(invoices))
}

/// Fetch one invoice document by exact number.
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_no): Path<String>,
) -> Result<Json<Value>, AppError> {
    let invoice = state
        .db
        .get_invoice(&invoice_no)
        .await
        .inspect_err(|e| record_error(e.kind()))?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Not found")))?;

    Ok(Json(invoice))
}

/// Suggest the next invoice number for a date.
pub async fn next_invoice(
    State(state): State<AppState>,
    Query(params): Query<NextInvoiceParams>,
) -> Result<Json<NextInvoiceNumber>, AppError> {
    let next = next_invoice_number(&state.db, params.date.as_deref())
        .await
        .inspect_err(|e| record_error(e.kind()))?;

    tracing::info!(invoice_no = %next.invoice_no, sequence = next.sequence, "Suggested invoice number");

    Ok(Json(next))
}

//! Next-invoice-number suggestions.
//!
//! Numbers follow `INV<YYYYMMDD>-<seq>`. The suggestion is derived from the
//! numbers already stored for the day and nothing is reserved, so two callers
//! asking for the same date concurrently may be handed the same number.

use crate::services::Database;
use chrono::Utc;
use serde::Serialize;
use service_core::error::AppError;
use tracing::instrument;

/// A suggested invoice number and its numeric sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextInvoiceNumber {
    pub invoice_no: String,
    pub sequence: u64,
}

/// Suggest the next invoice number for `date` (today's UTC date when `None`).
#[instrument(skip(db))]
pub async fn next_invoice_number(
    db: &Database,
    date: Option<&str>,
) -> Result<NextInvoiceNumber, AppError> {
    let date = date
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());

    let prefix = invoice_prefix(&date)?;
    let existing = db.invoice_numbers_with_prefix(&prefix).await?;
    let sequence = max_sequence(&prefix, existing.iter().map(String::as_str)) + 1;

    Ok(NextInvoiceNumber {
        invoice_no: format_invoice_no(&prefix, sequence),
        sequence,
    })
}

/// Build the `INV<YYYYMMDD>-` prefix, accepting `YYYY-MM-DD` or `YYYYMMDD`.
pub fn invoice_prefix(date: &str) -> Result<String, AppError> {
    let compact: String = date.chars().filter(|c| *c != '-').collect();

    if compact.len() != 8 || !compact.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "Invalid date format. Use YYYYMMDD".to_string(),
        ));
    }

    Ok(format!("INV{}-", compact))
}

/// Largest sequence among `numbers` sharing `prefix`, or 0.
///
/// The sequence is the run of digits directly after the prefix, which is
/// matched ignoring ASCII case. Numbers without a sequence, or whose sequence
/// has no successor in `u64`, are skipped.
pub fn max_sequence<'a>(prefix: &str, numbers: impl IntoIterator<Item = &'a str>) -> u64 {
    numbers
        .into_iter()
        .filter_map(|number| strip_prefix_ignore_case(number, prefix))
        .filter_map(leading_number)
        .filter(|sequence| *sequence < u64::MAX)
        .max()
        .unwrap_or(0)
}

fn strip_prefix_ignore_case<'a>(number: &'a str, prefix: &str) -> Option<&'a str> {
    let head = number.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        number.get(prefix.len()..)
    } else {
        None
    }
}

fn leading_number(suffix: &str) -> Option<u64> {
    let end = suffix
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(suffix.len());
    suffix[..end].parse().ok()
}

/// Zero-pad `sequence` to three digits after `prefix`.
pub fn format_invoice_no(prefix: &str, sequence: u64) -> String {
    format!("{}{:03}", prefix, sequence)
}

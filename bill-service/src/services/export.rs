//! CSV and JSON snapshots of the invoice store.
//!
//! HTTP downloads and export files are rendered by the same functions, so
//! both carry identical content for the same data.

use crate::models::InvoiceSummary;
use crate::services::metrics::EXPORTS_TOTAL;
use crate::services::Database;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// CSV column order.
pub const CSV_HEADER: [&str; 5] = [
    "invoiceNo",
    "date",
    "receiverName",
    "consigneeName",
    "grandTotal",
];

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }

    /// File name offered to HTTP clients.
    pub fn download_name(&self) -> String {
        format!("invoices.{}", self.as_str())
    }

    /// File name written by the export command for `date`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("invoices-{}.{}", date.format("%Y-%m-%d"), self.as_str())
    }
}

/// A rendered snapshot.
#[derive(Debug, Clone)]
pub struct Export {
    pub format: ExportFormat,
    pub body: String,
    pub count: usize,
}

/// Render every stored invoice in `format`.
#[instrument(skip(db))]
pub async fn render_export(db: &Database, format: ExportFormat) -> Result<Export, AppError> {
    let (body, count) = match format {
        ExportFormat::Csv => {
            let rows = db.list_summaries().await?;
            (render_csv(&rows), rows.len())
        }
        ExportFormat::Json => {
            let documents = db.list_invoices(&Default::default()).await?;
            (render_json(&documents)?, documents.len())
        }
    };

    Ok(Export {
        format,
        body,
        count,
    })
}

/// Write a snapshot to `<exports_dir>/invoices-<today>.<ext>`.
///
/// The directory is created when absent; an existing file for the same day is
/// overwritten.
#[instrument(skip(db), fields(exports_dir = %exports_dir.display()))]
pub async fn write_export(
    db: &Database,
    format: ExportFormat,
    exports_dir: &Path,
) -> Result<(PathBuf, usize), AppError> {
    let export = render_export(db, format).await?;

    tokio::fs::create_dir_all(exports_dir).await?;
    let path = exports_dir.join(format.file_name(Utc::now().date_naive()));
    tokio::fs::write(&path, export.body.as_bytes()).await?;

    EXPORTS_TOTAL
        .with_label_values(&[format.as_str(), "file"])
        .inc();
    info!(path = %path.display(), count = export.count, "Export written");

    Ok((path, export.count))
}

/// Header line plus one line per row, newline-separated, no trailing newline.
pub fn render_csv(rows: &[InvoiceSummary]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for row in rows {
        let fields = [
            row.invoice_no.clone(),
            row.date.clone().unwrap_or_default(),
            row.receiver_name.clone(),
            row.consignee_name.clone(),
            row.grand_total.to_string(),
        ];
        let line = fields
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    lines.join("\n")
}

/// Pretty-printed JSON array with two-space indentation.
pub fn render_json(documents: &[Value]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(documents)?)
}

/// Double embedded quotes; wrap in quotes when the field contains a comma.
fn escape_field(value: &str) -> String {
    let escaped = value.replace('"', "\"\"");
    if escaped.contains(',') {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

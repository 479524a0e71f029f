//! Out-of-band maintenance of the invoice store: bulk delete and export to
//! files. Used by the `bill-admin` command.

use crate::config::StorageConfig;
use crate::models::ClearOutcome;
use crate::services::{write_export, Database, ExportFormat};
use service_core::error::AppError;
use std::fmt;
use std::path::PathBuf;

/// Result of `clear_invoices`, printable for the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReport {
    MissingDatabase,
    AlreadyEmpty,
    Deleted(u64),
}

impl From<ClearOutcome> for ClearReport {
    fn from(outcome: ClearOutcome) -> Self {
        match outcome {
            ClearOutcome::AlreadyEmpty => ClearReport::AlreadyEmpty,
            ClearOutcome::Deleted(count) => ClearReport::Deleted(count),
        }
    }
}

impl fmt::Display for ClearReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearReport::MissingDatabase => write!(f, "Database file does not exist."),
            ClearReport::AlreadyEmpty => write!(
                f,
                "No invoices found in database. Database is already empty."
            ),
            ClearReport::Deleted(count) => write!(
                f,
                "Found {count} invoice(s) in the database.\n\
                 Successfully deleted {count} invoice(s) from the database."
            ),
        }
    }
}

/// Delete every stored invoice.
///
/// A missing database file is reported, not created.
pub async fn clear_invoices(storage: &StorageConfig) -> Result<ClearReport, AppError> {
    let path = storage.database_path();
    if !tokio::fs::try_exists(&path).await? {
        return Ok(ClearReport::MissingDatabase);
    }

    let db = Database::connect_existing(&path, 1).await?;
    let outcome = match db.run_migrations().await {
        Ok(()) => db.clear_invoices().await,
        Err(e) => Err(e),
    };
    db.close().await;

    Ok(outcome?.into())
}

/// Write all invoices to a dated file in the exports directory.
///
/// Returns the file path and the number of exported invoices.
pub async fn export_invoices(
    storage: &StorageConfig,
    format: ExportFormat,
) -> Result<(PathBuf, usize), AppError> {
    let db = Database::connect(&storage.database_path(), 1).await?;
    let result = match db.run_migrations().await {
        Ok(()) => write_export(&db, format, &storage.exports_dir).await,
        Err(e) => Err(e),
    };
    db.close().await;

    result
}

//! Database service for bill-service.
//!
//! One SQLite file holds the `invoices` table. The pool is opened once at
//! startup and shared through application state.

use crate::models::{ClearOutcome, InvoiceRecord, InvoiceSummary, ListInvoicesFilter, SaveInvoice};
use crate::services::metrics::DB_QUERY_DURATION;
use chrono::Utc;
use serde_json::Value;
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

const ORDER_BY: &str = " ORDER BY date DESC, invoice_no DESC";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite database at `path`.
    ///
    /// The parent directory is created when absent.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn connect(path: &Path, max_connections: u32) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        Self::connect_with(path, max_connections, true).await
    }

    /// Open an existing database file without creating it.
    pub async fn connect_existing(path: &Path, max_connections: u32) -> Result<Self, AppError> {
        Self::connect_with(path, max_connections, false).await
    }

    async fn connect_with(
        path: &Path,
        max_connections: u32,
        create_if_missing: bool,
    ) -> Result<Self, AppError> {
        info!(max_connections = max_connections, "Opening SQLite database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Insert an invoice, or replace the stored one with the same number.
    ///
    /// Row id and `created_at` of an existing row are kept.
    #[instrument(skip(self, input), fields(invoice_no = %input.invoice_no))]
    pub async fn save_invoice(&self, input: &SaveInvoice) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["save_invoice"])
            .start_timer();

        let now = Utc::now();
        let data = serde_json::to_string(&input.document)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (invoice_no, date, receiver_name, consignee_name, grand_total, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(invoice_no) DO UPDATE SET
                date = excluded.date,
                receiver_name = excluded.receiver_name,
                consignee_name = excluded.consignee_name,
                grand_total = excluded.grand_total,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&input.invoice_no)
        .bind(&input.date)
        .bind(&input.receiver_name)
        .bind(&input.consignee_name)
        .bind(input.grand_total)
        .bind(data)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to save invoice: {}", e)))?;

        timer.observe_duration();

        info!("Invoice saved");

        Ok(())
    }

    /// Get the stored document for an exact invoice number.
    #[instrument(skip(self))]
    pub async fn get_invoice(&self, invoice_no: &str) -> Result<Option<Value>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let document = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT data FROM invoices WHERE invoice_no = ?",
        )
        .bind(invoice_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(document.map(|Json(value)| value))
    }

    /// Get the full stored row for an exact invoice number.
    #[instrument(skip(self))]
    pub async fn get_invoice_record(
        &self,
        invoice_no: &str,
    ) -> Result<Option<InvoiceRecord>, AppError> {
        sqlx::query_as::<_, InvoiceRecord>(
            r#"
            SELECT id, invoice_no, date, receiver_name, consignee_name, grand_total, data, created_at, updated_at
            FROM invoices
            WHERE invoice_no = ?
            "#,
        )
        .bind(invoice_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))
    }

    /// List stored documents matching `filter`, newest date first.
    #[instrument(skip(self))]
    pub async fn list_invoices(&self, filter: &ListInvoicesFilter) -> Result<Vec<Value>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT data FROM invoices");
        push_filter(&mut builder, filter);
        builder.push(ORDER_BY);

        let documents = builder
            .build_query_scalar::<Json<Value>>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e))
            })?;

        timer.observe_duration();

        Ok(documents.into_iter().map(|Json(value)| value).collect())
    }

    /// List the projection columns of every invoice, newest date first.
    #[instrument(skip(self))]
    pub async fn list_summaries(&self) -> Result<Vec<InvoiceSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_summaries"])
            .start_timer();

        let summaries = sqlx::query_as::<_, InvoiceSummary>(&format!(
            "SELECT invoice_no, date, receiver_name, consignee_name, grand_total FROM invoices{}",
            ORDER_BY
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(summaries)
    }

    /// Invoice numbers starting with `prefix`.
    #[instrument(skip(self))]
    pub async fn invoice_numbers_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["invoice_numbers_with_prefix"])
            .start_timer();

        let numbers = sqlx::query_scalar::<_, String>(
            r"SELECT invoice_no FROM invoices WHERE invoice_no LIKE ? ESCAPE '\'",
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to scan invoice numbers: {}", e))
        })?;

        timer.observe_duration();

        Ok(numbers)
    }

    /// Count stored invoices.
    pub async fn count_invoices(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e))
            })?;
        Ok(count.max(0) as u64)
    }

    /// Delete every invoice. An empty table is left untouched.
    #[instrument(skip(self))]
    pub async fn clear_invoices(&self) -> Result<ClearOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e))
            })?;

        if count == 0 {
            tx.rollback().await?;
            info!("Invoice table already empty");
            return Ok(ClearOutcome::AlreadyEmpty);
        }

        let result = sqlx::query("DELETE FROM invoices")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoices: {}", e))
            })?;

        tx.commit().await?;

        info!(deleted = result.rows_affected(), "Invoices deleted");

        Ok(ClearOutcome::Deleted(result.rows_affected()))
    }
}

/// Append the WHERE clause for `filter` to `builder`.
fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ListInvoicesFilter) {
    let mut separator = " WHERE ";

    if let Some((from, to)) = &filter.date_range {
        builder
            .push(separator)
            .push("date BETWEEN ")
            .push_bind(from.clone())
            .push(" AND ")
            .push_bind(to.clone());
        separator = " AND ";
    }

    if let Some(invoice_no) = &filter.invoice_no {
        builder
            .push(separator)
            .push("invoice_no LIKE ")
            .push_bind(contains_pattern(invoice_no))
            .push(r" ESCAPE '\'");
        separator = " AND ";
    }

    if let Some(customer) = &filter.customer_name {
        let pattern = contains_pattern(customer);
        builder
            .push(separator)
            .push("(receiver_name LIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR consignee_name LIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

/// Escape LIKE wildcards so `value` matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

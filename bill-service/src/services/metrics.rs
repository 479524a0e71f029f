//! Prometheus metrics for bill-service.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

/// Handle to the `metrics` recorder fed by the HTTP middleware.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Invoices written through the upsert path.
pub static INVOICES_SAVED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "bill_invoices_saved_total",
        "Total number of invoice upserts"
    )
    .expect("Failed to register invoices_saved_total")
});

/// Exports by format (csv, json) and destination (download, file).
pub static EXPORTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bill_exports_total",
        "Total number of invoice exports",
        &["format", "destination"]
    )
    .expect("Failed to register exports_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "bill_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "bill_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics and install the HTTP metrics recorder.
///
/// Safe to call more than once; only the first call installs the recorder.
pub fn init_metrics() {
    Lazy::force(&INVOICES_SAVED_TOTAL);
    Lazy::force(&EXPORTS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);

    if METRICS_HANDLE.get().is_none() {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                let _ = METRICS_HANDLE.set(handle);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to install metrics recorder"),
        }
    }
}

/// Record an error by its kind label.
pub fn record_error(error_type: &str) {
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    output.push_str(
        &encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default(),
    );

    output
}

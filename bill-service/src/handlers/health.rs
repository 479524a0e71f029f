use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Liveness probe.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe: the database must answer.
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        AppError::ServiceUnavailable
    })?;

    Ok((StatusCode::OK, Json(json!({ "status": "ready" }))))
}

/// Prometheus metrics endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

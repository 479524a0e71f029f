//! Export downloads.

use crate::services::metrics::{record_error, EXPORTS_TOTAL};
use crate::services::{render_export, ExportFormat};
use crate::startup::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;

pub async fn export_json(State(state): State<AppState>) -> Result<Response, AppError> {
    download(&state, ExportFormat::Json).await
}

pub async fn export_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    download(&state, ExportFormat::Csv).await
}

async fn download(state: &AppState, format: ExportFormat) -> Result<Response, AppError> {
    let export = render_export(&state.db, format)
        .await
        .inspect_err(|e| record_error(e.kind()))?;

    EXPORTS_TOTAL
        .with_label_values(&[format.as_str(), "download"])
        .inc();
    tracing::info!(format = format.as_str(), count = export.count, "Export downloaded");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.download_name()),
            ),
        ],
        export.body,
    )
        .into_response())
}

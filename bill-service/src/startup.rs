//! Application startup and lifecycle management.
//!
//! Opens the invoice database, applies migrations and serves the HTTP API.

use crate::config::BillConfig;
use crate::handlers;
use crate::services::Database;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted JSON request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: BillConfig,
}

/// Build the HTTP router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/invoices",
            post(handlers::save_invoice).get(handlers::list_invoices),
        )
        .route("/api/invoices/:invoice_no", get(handlers::get_invoice))
        .route("/api/next-invoice", get(handlers::next_invoice))
        .route("/api/export/json", get(handlers::export_json))
        .route("/api/export/csv", get(handlers::export_csv))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: BillConfig) -> Result<Self, AppError> {
        let db_path = config.storage.database_path();
        let db = Database::connect(&db_path, config.storage.max_connections)
            .await
            .map_err(|e| {
                tracing::error!(path = %db_path.display(), error = %e, "Failed to open database");
                e
            })?;

        db.run_migrations().await?;

        let host: IpAddr = config.common.host.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid host '{}': {}",
                config.common.host,
                e
            ))
        })?;

        // Port 0 binds a random port (used by tests)
        let addr = SocketAddr::new(host, config.common.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, database = %db_path.display(), "Bill service ready");

        Ok(Self {
            port,
            listener,
            state: AppState { db, config },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, router(self.state)).await
    }
}

//! service-core: Shared infrastructure for the bill service and its tooling.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use serde;
pub use serde_json;
pub use sqlx;
pub use tokio;
pub use tower;
pub use tower_http;
pub use tracing;

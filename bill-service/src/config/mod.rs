//! Configuration module for bill-service.

use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BillConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the SQLite file; created on first run.
    pub data_dir: PathBuf,
    pub database_file: String,
    /// Directory receiving export files.
    pub exports_dir: PathBuf,
    pub max_connections: u32,
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database_file: "invoices.sqlite".to_string(),
            exports_dir: PathBuf::from("exports"),
            max_connections: 5,
        }
    }
}

impl BillConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "bill-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            storage: StorageConfig::from_env()?,
        })
    }
}

impl StorageConfig {
    /// Read `BILL_*` overrides on top of the defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let max_connections = match env::var("BILL_DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "BILL_DATABASE_MAX_CONNECTIONS must be a positive integer: {}",
                    e
                ))
            })?,
            Err(_) => defaults.max_connections,
        };

        Ok(Self {
            data_dir: env::var("BILL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            database_file: env::var("BILL_DATABASE_FILE").unwrap_or(defaults.database_file),
            exports_dir: env::var("BILL_EXPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.exports_dir),
            max_connections,
        })
    }
}

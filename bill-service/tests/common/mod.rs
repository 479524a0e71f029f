#![allow(dead_code)]

use bill_service::config::{BillConfig, StorageConfig};
use bill_service::services::Database;
use bill_service::startup::Application;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use tempfile::TempDir;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Database,
    pub storage: StorageConfig,
    pub client: reqwest::Client,
    // Keeps the temporary data/exports directories alive for the test.
    _dir: TempDir,
}

/// Storage rooted in a fresh temporary directory.
pub fn temp_storage() -> (TempDir, StorageConfig) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage = StorageConfig {
        data_dir: dir.path().join("data"),
        database_file: "invoices.sqlite".to_string(),
        exports_dir: dir.path().join("exports"),
        max_connections: 5,
    };
    (dir, storage)
}

impl TestApp {
    pub async fn spawn() -> Self {
        let (dir, storage) = temp_storage();

        let config = BillConfig {
            common: CoreConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            service_name: "bill-service-test".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            storage: storage.clone(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            storage,
            client,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// POST an invoice document, asserting success.
    pub async fn save(&self, document: &Value) {
        let response = self
            .client
            .post(self.url("/api/invoices"))
            .json(document)
            .send()
            .await
            .expect("Failed to execute request");
        assert!(
            response.status().is_success(),
            "save failed with {}",
            response.status()
        );
    }

    /// GET a JSON endpoint, returning status and body.
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let body = response.json().await.expect("Failed to parse JSON");
        (status, body)
    }

    /// Invoice numbers returned by a list query, in response order.
    pub async fn list_numbers(&self, path: &str) -> Vec<String> {
        let (status, body) = self.get_json(path).await;
        assert!(status.is_success());
        body.as_array()
            .expect("list returns an array")
            .iter()
            .map(|doc| doc["invoiceNo"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

/// A representative invoice document.
pub fn invoice(invoice_no: &str, date: &str, receiver: &str, consignee: &str, total: f64) -> Value {
    json!({
        "invoiceNo": invoice_no,
        "date": date,
        "receiver": { "name": receiver, "gstin": "27AAAPL1234C1ZV", "address": "12 Market Road" },
        "consignee": { "name": consignee },
        "items": [
            { "description": "Steel bolts", "hsn": "7318", "qty": 100, "rate": 2.5 },
            { "description": "Washers", "hsn": "7318", "qty": 200, "rate": 0.75 }
        ],
        "taxes": { "cgst": 9, "sgst": 9 },
        "grandTotal": total
    })
}

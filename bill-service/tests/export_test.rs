//! Export download and file export integration tests for bill-service.

mod common;

use bill_service::admin::export_invoices;
use bill_service::services::ExportFormat;
use common::{invoice, TestApp};
use reqwest::StatusCode;

async fn download(app: &TestApp, path: &str) -> (reqwest::header::HeaderMap, String) {
    let response = app
        .client
        .get(app.url(path))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    (headers, response.text().await.unwrap())
}

async fn seed(app: &TestApp) {
    app.save(&invoice("INV20240115-001", "2024-01-15", "Acme, Inc.", "Depot", 1234.5))
        .await;
    app.save(&invoice("INV20240116-001", "2024-01-16", "The \"Best\" Co", "", 100.0))
        .await;
}

#[tokio::test]
async fn csv_download_has_attachment_headers_and_rows() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    let (headers, body) = download(&app, "/api/export/csv").await;

    assert_eq!(headers["content-type"], "text/csv");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"invoices.csv\""
    );
    assert_eq!(
        body,
        "invoiceNo,date,receiverName,consigneeName,grandTotal\n\
         INV20240116-001,2024-01-16,The \"\"Best\"\" Co,,100\n\
         INV20240115-001,2024-01-15,\"Acme, Inc.\",Depot,1234.5"
    );
}

#[tokio::test]
async fn csv_download_of_empty_store_is_header_only() {
    let app = TestApp::spawn().await;

    let (_, body) = download(&app, "/api/export/csv").await;

    assert_eq!(body, "invoiceNo,date,receiverName,consigneeName,grandTotal");
}

#[tokio::test]
async fn json_download_is_pretty_array_of_documents() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    let (headers, body) = download(&app, "/api/export/json").await;

    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"invoices.json\""
    );
    assert!(body.starts_with("[\n  {\n    \"invoiceNo\": \"INV20240116-001\""));

    let documents: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[1]["receiver"]["name"], "Acme, Inc.");
}

#[tokio::test]
async fn file_exports_match_downloads() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    for (format, path) in [
        (ExportFormat::Csv, "/api/export/csv"),
        (ExportFormat::Json, "/api/export/json"),
    ] {
        let (file, count) = export_invoices(&app.storage, format)
            .await
            .expect("export succeeds");
        let (_, downloaded) = download(&app, path).await;

        assert_eq!(count, 2);
        assert!(file.starts_with(&app.storage.exports_dir));
        let name = file.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("invoices-"));
        assert!(name.ends_with(&format!(".{}", format.as_str())));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), downloaded);
    }
}

//! Bulk delete integration tests for bill-service.

mod common;

use bill_service::admin::{clear_invoices, ClearReport};
use bill_service::models::{ClearOutcome, SaveInvoice};
use bill_service::services::Database;
use common::{invoice, temp_storage};

async fn seeded_store(count: usize) -> (tempfile::TempDir, bill_service::config::StorageConfig) {
    let (dir, storage) = temp_storage();
    let db = Database::connect(&storage.database_path(), 1)
        .await
        .expect("database opens");
    db.run_migrations().await.expect("migrations apply");

    for seq in 1..=count {
        let document = invoice(&format!("INV20240115-{seq:03}"), "2024-01-15", "Acme", "", 10.0);
        let input = SaveInvoice::from_document(document).unwrap();
        db.save_invoice(&input).await.unwrap();
    }

    db.close().await;
    (dir, storage)
}

#[tokio::test]
async fn clear_reports_deleted_then_already_empty() {
    let (_dir, storage) = seeded_store(5).await;

    assert_eq!(clear_invoices(&storage).await.unwrap(), ClearReport::Deleted(5));
    assert_eq!(
        clear_invoices(&storage).await.unwrap(),
        ClearReport::AlreadyEmpty
    );

    let db = Database::connect_existing(&storage.database_path(), 1)
        .await
        .unwrap();
    assert_eq!(db.count_invoices().await.unwrap(), 0);
}

#[tokio::test]
async fn clear_on_empty_store_does_not_error() {
    let (_dir, storage) = seeded_store(0).await;

    assert_eq!(
        clear_invoices(&storage).await.unwrap(),
        ClearReport::AlreadyEmpty
    );
}

#[tokio::test]
async fn clear_without_database_file_creates_nothing() {
    let (_dir, storage) = temp_storage();

    assert_eq!(
        clear_invoices(&storage).await.unwrap(),
        ClearReport::MissingDatabase
    );
    assert!(!storage.database_path().exists());
}

#[tokio::test]
async fn store_level_clear_outcomes() {
    let (_dir, storage) = seeded_store(2).await;
    let db = Database::connect_existing(&storage.database_path(), 1)
        .await
        .unwrap();

    assert_eq!(db.clear_invoices().await.unwrap(), ClearOutcome::Deleted(2));
    assert_eq!(db.clear_invoices().await.unwrap(), ClearOutcome::AlreadyEmpty);
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use bill_service::admin::{clear_invoices, export_invoices};
use bill_service::config::StorageConfig;
use bill_service::services::ExportFormat;
use clap::{Parser, Subcommand};
use service_core::observability::init_cli_tracing;

#[derive(Parser)]
#[command(
    name = "bill-admin",
    about = "Maintenance commands for the bill-service invoice store",
    version
)]
struct Cli {
    #[arg(long, global = true, help = "Directory holding invoices.sqlite")]
    data_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory receiving export files")]
    exports_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete every stored invoice (irreversible)
    Clear,
    /// Write invoices-<date>.csv with the searchable columns
    ExportCsv,
    /// Write invoices-<date>.json with the full documents
    ExportJson,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_cli_tracing("warn");

    let cli = Cli::parse();

    let mut storage = StorageConfig::from_env().context("failed to read storage configuration")?;
    if let Some(data_dir) = cli.data_dir {
        storage.data_dir = data_dir;
    }
    if let Some(exports_dir) = cli.exports_dir {
        storage.exports_dir = exports_dir;
    }

    match cli.command {
        Commands::Clear => {
            let report = clear_invoices(&storage)
                .await
                .context("failed to clear invoices")?;
            println!("{report}");
        }
        Commands::ExportCsv => export(&storage, ExportFormat::Csv).await?,
        Commands::ExportJson => export(&storage, ExportFormat::Json).await?,
    }

    Ok(())
}

async fn export(storage: &StorageConfig, format: ExportFormat) -> Result<()> {
    let (path, count) = export_invoices(storage, format)
        .await
        .with_context(|| format!("failed to export invoices as {}", format.as_str()))?;
    println!("Exported {} invoices to {}", count, path.display());
    Ok(())
}

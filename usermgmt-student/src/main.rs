//! Student batch validator - command-line entry point
//!
//! Reads a JSON array of student records, validates it against the
//! SQLite database and prints the outcome as JSON. With `--apply` the
//! accepted records are written as well.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usermgmt_common::config::{resolve_database_path, resolve_log_level, TomlConfig};
use usermgmt_common::db::init_database;
use usermgmt_student::db::SqliteStudentUpserter;
use usermgmt_student::{
    Repositories, StudentImportService, StudentRecord, ValidationManager, ValidationSettings,
};

/// Command-line arguments for usermgmt-student
#[derive(Parser, Debug)]
#[command(name = "usermgmt-student")]
#[command(about = "Validate and import batches of student records")]
#[command(version)]
struct Args {
    /// JSON file holding an array of student records
    #[arg(short, long)]
    batch: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Batch comes from the order flow
    #[arg(long)]
    order_flow: bool,

    /// Username is a separate mandatory identifier
    #[arg(long)]
    enable_username: bool,

    /// Reject the whole batch on any error
    #[arg(long)]
    strict: bool,

    /// Write accepted records to the database
    #[arg(long)]
    apply: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let log_level = resolve_log_level(args.log_level.as_deref(), &config);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("usermgmt_student={0},usermgmt_common={0}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut settings = ValidationSettings::from(&config.validation);
    settings.enable_username |= args.enable_username;
    settings.order_flow |= args.order_flow;
    settings.strict |= args.strict;

    let db_path = resolve_database_path(args.db.as_deref(), &config);
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let content = std::fs::read_to_string(&args.batch)
        .with_context(|| format!("Failed to read batch file {}", args.batch.display()))?;
    let records: Vec<StudentRecord> =
        serde_json::from_str(&content).context("Batch file is not a JSON array of students")?;
    info!(records = records.len(), "Loaded batch from {}", args.batch.display());

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let options = settings.options();
    let mode = settings.mode();
    let manager = ValidationManager::new(Repositories::sqlite(pool.clone()), settings);

    let output = if args.apply {
        let service = StudentImportService::new(manager, Arc::new(SqliteStudentUpserter::new(pool)));
        let report = service.import(records, options, mode, &cancel).await?;
        serde_json::to_string_pretty(&report)?
    } else {
        let outcome = manager.fully_validate(records, options, &cancel).await?;
        serde_json::to_string_pretty(&outcome)?
    };

    println!("{}", output);
    Ok(())
}

/// Cancel the running batch on Ctrl+C
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, cancelling");
        cancel.cancel();
    }
}

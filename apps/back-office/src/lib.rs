//! # Clowee Back Office
//!
//! Operator CLI over the franchise ledger.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AppConfig::load ──► env (CLOWEE_*), platform data dir              │
//! │  2. init_tracing    ──► EnvFilter, stderr writer                        │
//! │  3. Database::new   ──► SQLite pool + embedded migrations               │
//! │  4. dispatch        ──► commands::* ──► emit (text | JSON)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{agreement, emit, franchise, invoice, sale};
use crate::config::{AppConfig, ConfigError, DEFAULT_LOG_FILTER};
use crate::error::CliError;
use clowee_db::migrations::migration_status;
use clowee_db::{Database, DbConfig};

/// Installs the stderr log subscriber. Falls back to the default filter when
/// `filter` does not parse; a second call is a no-op.
pub fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Result of `clowee migrate`.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub embedded: usize,
    pub applied: usize,
}

/// Opens the database, runs one command, and returns its rendered output.
pub async fn run(cli: Cli, config: AppConfig) -> Result<String, CliError> {
    let config = match cli.db {
        Some(path) => config.with_db_path(path),
        None => config,
    };

    ensure_parent_dir(&config.db_path)?;
    info!(path = %config.db_path.display(), "Opening database");

    let db = Database::new(DbConfig::new(&config.db_path).max_connections(config.max_connections)).await?;
    let output = dispatch(&db, cli.command, cli.json).await;
    db.close().await;

    output
}

async fn dispatch(db: &Database, command: Command, json: bool) -> Result<String, CliError> {
    let today = Utc::now().date_naive();
    debug!(?command, "Dispatching");

    match command {
        Command::Migrate => {
            db.run_migrations().await?;
            let (embedded, applied) = migration_status(db.pool()).await?;
            let report = MigrationReport { embedded, applied };
            emit(json, &report, |r| format!("{} of {} migrations applied\n", r.applied, r.embedded))
        }
        Command::Franchises => {
            let rows = franchise::list(db, today).await?;
            emit(json, &rows, |rows| franchise::render(rows))
        }
        Command::AddAgreement {
            franchise,
            effective,
            coin_price,
            doll_price,
            electricity,
            vat,
            franchise_share,
            clowee_share,
            maintenance,
            duration,
            notes,
        } => {
            let added = agreement::add(
                db,
                agreement::AddAgreementArgs {
                    franchise_id: franchise,
                    effective_date: effective,
                    coin_price,
                    doll_price,
                    electricity,
                    vat,
                    franchise_share,
                    clowee_share,
                    maintenance,
                    duration: duration.map(Into::into),
                    notes,
                },
            )
            .await?;
            emit(json, &added, agreement::render)
        }
        Command::RecordSale {
            machine,
            date,
            coins,
            prizes,
            notes,
        } => {
            let recorded = sale::record(
                db,
                sale::RecordSaleArgs {
                    machine_id: machine,
                    date,
                    coins,
                    prizes,
                    notes,
                },
            )
            .await?;
            emit(json, &recorded, sale::render_sale)
        }
        Command::Pay {
            sale: sale_id,
            amount,
            method,
            reference,
            date,
        } => {
            let receipt = sale::pay(
                db,
                sale::PayArgs {
                    sale_id,
                    amount,
                    method: method.into(),
                    reference,
                    paid_on: date.unwrap_or(today),
                },
            )
            .await?;
            emit(json, &receipt, sale::render_receipt)
        }
        Command::Invoice { franchise, from, to } => {
            let built = invoice::build(db, &franchise, from, to).await?;
            emit(json, &built, invoice::render)
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), ConfigError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.exists() {
        return Ok(());
    }

    warn!(dir = %parent.display(), "Creating data directory");
    std::fs::create_dir_all(parent).map_err(|e| ConfigError::DataDir {
        path: parent.display().to_string(),
        reason: e.to_string(),
    })
}

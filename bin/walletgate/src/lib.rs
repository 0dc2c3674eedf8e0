pub mod utility;

pub use walletgate_primitives::error::ApiError;

use crate::utility::background_tasks::spawn_background_tasks;
use crate::utility::db_pool::{create_db_pool, run_migrations};
use crate::utility::logging::setup_logging;
use crate::utility::shutdown::shutdown_signal;
use crate::utility::tasks::load_env;
use eyre::Report;
use std::sync::Arc;
use tracing::info;
use walletgate_core::app_state::AppState;
use walletgate_core::store::PgLedgerStore;
use walletgate_primitives::models::app_state::app_config::AppConfig;

pub async fn run() -> Result<(), Report> {
    // 1. load environment variables
    load_env();

    // 2. initialize logging first (so we can log everything else)
    setup_logging();

    info!("Starting WalletGate...");

    // 3. load and validate configuration
    let config = AppConfig::from_env()?;

    // 4. create database connection pool
    let pool = create_db_pool()?;

    // 5. apply pending schema migrations
    run_migrations(&pool)?;

    // 6. build application state over the PostgreSQL ledger
    let store = PgLedgerStore::new(pool, config.ledger.lock_timeout);
    let state = AppState::new(Arc::new(store), config)?;

    // 7. start alert sweep and subscription housekeeping
    let tasks = spawn_background_tasks(state.clone());

    // 8. wait for Ctrl+C / SIGTERM
    shutdown_signal().await;

    for task in tasks {
        task.abort();
    }

    info!("WalletGate shut down gracefully");
    Ok(())
}

//! TicketHub server — ticket issuance and admission control backend.
//!
//! Main entry point: loads configuration, initializes logging, connects
//! to the database, runs migrations, and starts the HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use tickethub_core::config::AppConfig;
use tickethub_core::error::AppError;
use tickethub_database::connection::DatabasePool;
use tickethub_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let env = std::env::var("TICKETHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TicketHub v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let database = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    run_migrations(database.pool()).await?;
    tracing::info!("Database migrations complete");

    tickethub_api::run_server(config, database.pool().clone()).await
}

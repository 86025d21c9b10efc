//! Albion kill feed server
//!
//! Polls the public game-info API for new kill events, stores them, and pushes
//! the most recent ones to every connected subscriber.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use killfeed_core::processors::{PollScheduler, Poller};
use killfeed_core::source::GameInfoClient;
use killfeed_core::store::PgEventStore;
use killfeed_core::tracking::{LastUpdate, SeenSet};
use server::{build_router, run_server};
use shutdown::shutdown_signal;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Albion kill feed - live kill event relay
#[derive(Parser, Debug)]
#[command(name = "killfeed-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./killfeed-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Override only the listen port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting killfeed-server v{}", env!("CARGO_PKG_VERSION"));

    let loaded_config = ConfigLoader::new(&args.config, args.listen, args.port)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    let store = Arc::new(PgEventStore::new(db_pool.clone()));
    let source = Arc::new(GameInfoClient::new(
        loaded_config.source.base_url.clone(),
        loaded_config.source.request_timeout,
    )?);
    tracing::info!(base_url = %loaded_config.source.base_url, "Polling game-info API");

    // Shared pipeline state: the scheduler writes, handlers read.
    let last_update = LastUpdate::new();
    let poller = Arc::new(Poller::new(
        source,
        store.clone(),
        SeenSet::new(),
        last_update.clone(),
        loaded_config.poller.ingest_concurrency,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = PollScheduler::new(poller, loaded_config.poller);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    let state = AppState::new(store, last_update, loaded_config.stream);
    let router = build_router(state);

    tracing::info!("Starting HTTP server on {}", loaded_config.listen);
    let result = run_server(router, loaded_config.listen, shutdown_signal()).await;

    // Stop polling before the pool goes away.
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_handle.await {
        tracing::error!("Poll scheduler task failed: {}", e);
    }

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! Coinshop Service - HTTP API for the coin merch store
//!
//! This is the main entry point for the coinshop service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinshop_service::{create_router, AppState, ServiceConfig, StoreBackend};
use coinshop_store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    // Load configuration from environment
    let config = ServiceConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Coinshop Service");

    tracing::info!(
        listen_addr = %config.listen_addr,
        store_backend = ?config.store_backend,
        token_ttl_seconds = config.token_ttl_seconds,
        "Service configuration loaded"
    );

    match config.store_backend {
        StoreBackend::Postgres => {
            tracing::info!(max_connections = config.db_max_connections, "Connecting to PostgreSQL");
            let store = PgStore::connect(&config.database_url, config.db_max_connections).await?;
            store.migrate().await?;
            serve(store, config).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - all data is lost on restart");
            serve(MemoryStore::new(), config).await
        }
    }
}

async fn serve<S: Store>(store: S, config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let listen_addr = config.listen_addr.clone();

    // Build app state
    let state = AppState::new(Arc::new(store), config);

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

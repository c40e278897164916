//! Creation Tree server
//!
//! Serves the file tree of multi-file playground creations over HTTP, with
//! Sled persistence for saved creations.

use std::sync::Arc;
use tracing::info;

use creation_tree::api::{router, AppState};
use creation_tree::config::ServerConfig;
use creation_tree::creation::CreationManager;
use creation_tree::storage::CreationStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creation_tree=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    info!("Initializing storage at: {}", config.storage_path);
    let store = CreationStore::open(config.storage())?;
    info!("Storage initialized successfully");

    let state = Arc::new(AppState::new(CreationManager::with_store(store)));
    let app = router(state.clone());

    let addr = config.addr();
    info!("Creation Tree server v{} starting", env!("CARGO_PKG_VERSION"));
    info!("   Listening on: http://{}", addr);
    info!("   Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = state.manager.store() {
        store.flush()?;
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

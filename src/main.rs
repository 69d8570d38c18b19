//! Seek Cache - HTTP facade over the local content cache
//!
//! Serves cached page, link, search and autosuggest lookups and exposes the
//! cache upkeep operations.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seek_cache::api::create_router;
use seek_cache::cache::{FileStore, KeyValueStore, LocalCache, MemoryStore};
use seek_cache::remote::HttpRemote;
use seek_cache::{spawn_sweep_task, AppState, Config};

/// Main entry point for the cache facade.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the storage backend and the remote client
/// 4. Start the background sweep task
/// 5. Serve the Axum router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seek_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Seek Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: api_base={}, port={}, page_budget={}B, sweep_interval={}s",
        config.api_base, config.server_port, config.page_byte_budget, config.sweep_interval
    );

    let backend: Box<dyn KeyValueStore> = match &config.store_path {
        Some(path) => {
            info!("Persisting cache to {}", path);
            Box::new(FileStore::open(path).context("opening cache file")?)
        }
        None => {
            info!("No STORE_PATH set, cache is in-memory only");
            Box::new(MemoryStore::new())
        }
    };
    let cache = LocalCache::from_boxed(backend);
    let remote = HttpRemote::from_config(&config).context("building remote client")?;

    let state = AppState::from_config(&config, cache, Arc::new(remote));

    let sweep_handle = spawn_sweep_task(
        state.client.cache(),
        config.sweep_interval,
        config.page_byte_budget,
    );
    info!("Background sweep task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then aborts the sweep task.
async fn shutdown_signal(sweep_handle: JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweep_handle.abort();
    warn!("Sweep task aborted");
}

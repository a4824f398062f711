mod app;
mod cli;
mod error;
mod handlers;
mod logging;
mod model;
mod state;

use crate::app::App;
use crate::cli::{StorageBackendArg, CLI};
use crate::state::AppState;
use anyhow::Context;
use clap::Parser;
use shortlink_core::Shortener;
use shortlink_shortener::ShortenerService;
use shortlink_storage::{InMemoryStore, RedisStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    logging::init(config.log_format)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        "starting shortlink server"
    );

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(ShortenerService::new(InMemoryStore::new())),
        StorageBackendArg::Redis => {
            let store = RedisStore::connect(&config.redis_url())
                .await
                .with_context(|| format!("cannot reach redis at {}", config.redis_addr))?;
            Arc::new(ShortenerService::new(store))
        }
    };

    let router = App::router(AppState::new(shortener));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

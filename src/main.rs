//! Service entry point for the task downloader.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use taskdl_core::api::{AppState, create_router};
use taskdl_core::{Scheduler, Store, shutdown};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = args.to_config();
    config.validate()?;

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;

    // A snapshot that exists but cannot be loaded is fatal: never start on a partial table.
    let store = Store::open(&config.store_path).await.with_context(|| {
        format!(
            "failed to load task store {}",
            config.store_path.display()
        )
    })?;
    let store = Arc::new(store);

    let scheduler = Arc::new(Scheduler::from_config(Arc::clone(&store), &config)?);
    let cancel = CancellationToken::new();
    scheduler.start(cancel.clone());
    scheduler.resume_pending().await?;

    let app = create_router(AppState::new(Arc::clone(&store), Arc::clone(&scheduler)));
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .context("HTTP server failed");

    // The HTTP layer is the only producer; it has stopped, so the queue may close.
    info!("shutting down");
    cancel.cancel();
    scheduler.stop().await;
    if let Err(e) = store.close().await {
        error!(error = %e, "failed to save task store");
    }
    info!("bye");

    served
}

//! Main entry point for the zipview server.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zipview::{
    CacheStore, Cli, FsBackend, HttpFetcher, KvBackend, MemoryBackend, StoreKind, ZipService,
    server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_directive()))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let backend: Arc<dyn KvBackend> = match cli.store {
        StoreKind::Memory => Arc::new(MemoryBackend::new()),
        StoreKind::Fs => {
            let backend = FsBackend::open(&cli.data_dir)
                .await
                .with_context(|| format!("failed to open {}", cli.data_dir.display()))?;
            Arc::new(backend)
        }
    };
    info!(store = ?cli.store, "cache backend ready");

    let fetcher = HttpFetcher::new(cli.fetch_timeout()).context("failed to build HTTP client")?;
    let service = ZipService::new(CacheStore::new(backend), Arc::new(fetcher));

    server::serve(cli.listen, server::router(service), shutdown_signal())
        .await
        .with_context(|| format!("server on {} failed", cli.listen))?;

    info!("shut down");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

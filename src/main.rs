use patient_tally::offline::{CacheStorage, EmbeddedFetcher, Fetcher, HttpFetcher, OfflineCache};
use patient_tally::{AppState, Config, FileBackend, Store, Tally, router};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let store = Store::new(FileBackend::new(&config.data_dir));
    let tally = Tally::load(&store).await;
    info!(
        "loaded {} sessions from {}",
        tally.ledger.len(),
        config.data_dir.display()
    );

    let fetcher: Arc<dyn Fetcher> = match &config.asset_origin {
        Some(origin) => {
            info!("serving assets from {origin}");
            Arc::new(HttpFetcher::new(origin.clone()))
        }
        None => Arc::new(EmbeddedFetcher),
    };
    let assets = OfflineCache::new(
        &config.cache_version,
        Arc::new(CacheStorage::default()),
        fetcher,
    );
    match assets.install().await {
        Ok(()) => {
            assets.activate().await?;
        }
        Err(err) => warn!("continuing without precached assets: {err}"),
    }

    let app = router(AppState::new(store, tally, assets));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

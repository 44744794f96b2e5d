use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use solardash::adapters::{load_series, DataLoadError, MockSeriesStore};
use solardash::application::SnapshotServer;
use solardash::config::Config;
use solardash::domain::Snapshot;
use solardash::interface::http::create_router;
use solardash::logging;

/// Load a fixture into a fresh store. With `allow_empty`, a failed load
/// leaves the store empty instead of aborting startup.
fn load_store(
    name: &str,
    path: &Path,
    allow_empty: bool,
) -> Result<MockSeriesStore<Snapshot>, DataLoadError> {
    match load_series(path).and_then(MockSeriesStore::from_items) {
        Ok(store) => {
            info!("✓ Loaded {} series: {} snapshots from {}", name, store.len(), path.display());
            Ok(store)
        }
        Err(e) if allow_empty => {
            warn!("⚠ Failed to load {} series from {}: {}. Serving errors.", name, path.display(), e);
            Ok(MockSeriesStore::new())
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    logging::init(&config.log_level);

    info!("🚀 Starting solardash v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    let live = load_store("live", &config.live_path, config.allow_empty)?;
    let history = load_store("history", &config.history_path, config.allow_empty)?;
    let snapshot_server = Arc::new(SnapshotServer::new(live, history));

    // Create HTTP server
    let app = create_router(snapshot_server);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("✓ solardash listening on {}", addr);
    info!("  → Live: http://localhost:{}/api/live", config.port);
    info!("  → History: http://localhost:{}/api/history", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

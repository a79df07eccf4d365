// =============================================================================
// Signal Engine — Main Entry Point
// =============================================================================
//
// Loads the runtime config, seeds the dataset store from `data_dir` when one
// is configured, and serves the REST API until Ctrl+C.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use signal_engine::api;
use signal_engine::app_state::AppState;
use signal_engine::market_data::{load_dataset_dir, DatasetStore};
use signal_engine::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "runtime_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Signal Engine starting up");

    let mut config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env();

    info!(
        bind_addr = %config.bind_addr,
        default_period = %config.default_period,
        scan_concurrency = config.scan_concurrency,
        "Runtime config ready"
    );

    // ── 2. Seed market data ──────────────────────────────────────────────
    let store = Arc::new(DatasetStore::new());
    if let Some(dir) = &config.data_dir {
        match load_dataset_dir(dir, &config.default_period, &store) {
            Ok(count) => info!(dir = %dir, count, "Datasets seeded"),
            Err(e) => warn!(error = %format!("{e:#}"), "Dataset seeding failed, starting empty"),
        }
    }

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, store, Some(PathBuf::from(CONFIG_PATH))));

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
            }
            warn!("Shutdown signal received, stopping gracefully");
            shutdown_state.cancel_scan();
        })
        .await
        .context("API server failed")?;

    if let Err(e) = state.runtime_config.read().save(CONFIG_PATH) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Signal Engine shut down complete.");
    Ok(())
}

//! Chakra balance service: binary entrypoint.
//! Loads settings and engine tables, wires routes and shared state, starts
//! the live sampler, and serves HTTP until shutdown.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use chakra_balance::api::{self, AppState};
use chakra_balance::config::EngineConfig;
use chakra_balance::metrics::Metrics;
use chakra_balance::sampler::spawn_live_sampler;
use chakra_balance::settings::Settings;
use chakra_balance::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let settings = Settings::from_env();

    // Config errors are fatal at startup.
    let (config, _source) = EngineConfig::load_default().context("loading engine config")?;
    let state = AppState::new(Arc::new(config), settings.history_cap);

    // Recorder first, so the sampler's first tick is counted.
    let metrics = if settings.metrics_enabled {
        Some(Metrics::init().context("installing prometheus recorder")?)
    } else {
        None
    };

    let sampler = settings.live_interval.map(|every| {
        info!(target: "sampler", interval_ms = every.as_millis() as u64, "live sampling enabled");
        spawn_live_sampler(state.engine.clone(), state.live.clone(), every)
    });

    let mut app = api::router(state);
    if let Some(metrics) = &metrics {
        app = app.merge(metrics.router());
        info!(target: "api", "/metrics enabled");
    }

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    info!(target: "api", addr = %settings.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    if let Some(handle) = sampler {
        handle.abort();
    }
    info!(target: "api", "shut down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

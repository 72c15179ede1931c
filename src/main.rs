//! weight-tracker server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use weight_tracker::app_state::AppState;
use weight_tracker::config::{LogFormat, TrackerConfig};
use weight_tracker::persistence::PostgresStore;
use weight_tracker::{build_app, in_memory_state, service_over};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = TrackerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        backdate_policy = %config.backdate_policy,
        persistence = config.persistence_enabled,
        "starting weight-tracker"
    );

    // Build service layer over the configured store
    let app_state = if config.persistence_enabled {
        let store = Arc::new(
            PostgresStore::connect(&config)
                .await
                .context("failed to initialise postgres store")?,
        );
        AppState::new(service_over(Arc::clone(&store) as _, store, &config))
    } else {
        tracing::warn!("persistence disabled, using in-memory store");
        in_memory_state(&config)
    };

    // Sweep idle per-animal locks
    let service = Arc::clone(&app_state.weight_service);
    let interval_secs = config.lock_prune_interval_secs.max(1);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            service.prune_locks().await;
        }
    });

    let app = build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

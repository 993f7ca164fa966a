//! Cumulative L2 Delta - feed replay service
//!
//! Replays a recorded depth/bar feed through the configured indicator,
//! forwards plotted values to the chart renderer and serves health and
//! metrics endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use l2_delta::{AppState, Config, FeedReplayer, Metrics, Publisher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting Cumulative L2 Delta");

    let config = Arc::new(Config::load()?);
    info!(
        feed = %config.feed_path,
        indicator = %config.indicator,
        display_name = config.indicator.display_name(),
        "Configuration loaded"
    );

    let registry = prometheus::Registry::new();
    let metrics = Metrics::new(&registry)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        metrics: metrics.clone(),
        registry,
    });

    // Start health check server
    let health_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state).await {
            warn!(error = %e, "Health server error");
        }
    });

    let publisher = Publisher::new(&config.ipc_socket_path).await?;
    let (tx, rx) = mpsc::unbounded_channel();
    let forwarder = tokio::spawn(async move { publisher.run(rx).await });

    let summary = FeedReplayer::new(&config.feed_path, config.indicator, metrics, tx)
        .with_pace(Duration::from_millis(config.replay_pace_ms))
        .run()
        .await?;

    let forwarded = forwarder.await??;
    info!(
        dispatched = summary.records_dispatched,
        rejected = summary.records_rejected,
        forwarded,
        "Shutting down"
    );

    Ok(())
}

/// Start HTTP server for health checks and metrics
async fn start_health_server(state: Arc<AppState>) -> anyhow::Result<()> {
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.health_port));
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!(addr = %addr, "Starting health check server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "component": "l2-delta",
        "indicator": state.config.indicator.to_string(),
        "values_published": state.metrics.values_published(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, StatusCode> {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&state.registry.gather(), &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

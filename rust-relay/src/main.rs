//! LineRelay Web Server - webhook relay with signature verification.
//!
//! This binary provides a thin web server that:
//! - Receives LINE webhooks on `/webhook`
//! - Verifies the HMAC-SHA256 signature against the raw body bytes
//! - Forwards verified payloads to every configured downstream endpoint
//! - Returns 202 once all forwards have settled

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linerelay::web::{router, AppState};
use linerelay::{Config, Forwarder};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    // Load configuration; a missing channel secret refuses startup
    let config = Config::from_env()?;
    info!(
        port = config.port,
        forward_endpoints = config.forward_endpoints.len(),
        forward_timeout_ms = config.forward_timeout_ms,
        "config_loaded"
    );

    // Shared HTTP client for all outbound forwards
    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    let forwarder = Forwarder::new(
        client,
        config.forward_endpoints.clone(),
        Duration::from_millis(config.forward_timeout_ms),
    );

    let port = config.port;
    let state = AppState::new(config, forwarder);

    let app = router(state).layer(TraceLayer::new_for_http());

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_shutting_down");
}

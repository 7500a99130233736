//! WhatsApp auto-responder web server.
//!
//! This binary:
//! - Answers the provider's webhook subscription handshake
//! - Receives inbound message notifications
//! - Replies to each message with a keyword-selected canned text
//! - Always acknowledges notifications with 200 OK

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wabot::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Local runs keep secrets in .env; deployed runs use the real environment
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "dotenv_loaded"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "dotenv_load_failed"),
    }

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        meta_token_set = config.meta_token.is_some(),
        phone_id_set = config.phone_id.is_some(),
        verify_token_set = config.verify_token.is_some(),
        graph_api_base_url = %config.graph_api_base_url,
        graph_api_version = %config.graph_api_version,
        request_timeout_ms = config.request_timeout_ms,
        max_body_bytes = config.max_body_bytes,
        "config_loaded"
    );

    let port = config.port;
    let state = AppState::new(config);
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_install_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_install_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}

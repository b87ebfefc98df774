//! Moderation callback web server.
//!
//! Receives moderation callbacks, authenticates them, and publishes the
//! verified actions to RabbitMQ for the host application to apply.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use modcallback::moderation::MemoryEntityMapping;
use modcallback::store::open_store;
use modcallback::util::SystemClock;
use modcallback::web::{router, AppState};
use modcallback::{
    Config, Credentials, ModerationHandler, Publisher, QueueDispatcher, SignatureVerifier,
    TracingSink,
};

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

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        site_url = %config.site_url,
        store_persistent = config.store_path.is_some(),
        nonce_window_secs = config.nonce_window_secs,
        entity_map_configured = config.entity_map_path.is_some(),
        "config_loaded"
    );

    let store = open_store(config.store_path.as_deref()).context("Failed to open store")?;

    match (&config.public_key, &config.private_key) {
        (Some(public_key), Some(private_key)) => {
            Credentials::new(public_key.as_str(), private_key.as_str())
                .save(store.as_ref())
                .context("Failed to save credentials")?;
            info!("credentials_saved");
        }
        (None, None) => {}
        _ => warn!("credentials_incomplete_not_saved"),
    }

    let mapping = match &config.entity_map_path {
        Some(path) => MemoryEntityMapping::from_json_file(path)
            .with_context(|| format!("Failed to load entity map {}", path.display()))?,
        None => {
            warn!("entity_map_not_configured");
            MemoryEntityMapping::new()
        }
    };

    // Create RabbitMQ publisher
    let publisher = Publisher::new(config.cloudamqp_url.clone());
    info!("rabbitmq_publisher_created");

    let sink = Arc::new(TracingSink);
    let verifier = SignatureVerifier::new(
        &config.site_url,
        store,
        Arc::new(SystemClock),
        config.nonce_window_secs,
        sink.clone(),
    );
    let handler = ModerationHandler::new(
        Arc::new(mapping),
        verifier,
        Arc::new(QueueDispatcher::new(publisher.clone())),
        sink,
    );

    let app = router(AppState::new(handler));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Close publisher connection
    publisher.close().await;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_failed");
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

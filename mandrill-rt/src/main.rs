//! mandrill-rt - receives Mandrill inbound webhooks and forwards each message
//! to the RT mail gateway.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mandrill_rt::web::{self, AppState};
use mandrill_rt::{Config, EventProcessor, RoutingTable, RtGateway};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "mandrill_rt_starting");
    info!(
        config = %config.config.display(),
        listen = %config.listen,
        gateway_url = %config.gateway_url,
        request_timeout_ms = config.request_timeout_ms,
        max_body_bytes = config.max_body_bytes,
        "config_loaded"
    );

    let table = RoutingTable::load(&config.config).unwrap_or_else(|e| {
        error!(
            path = %config.config.display(),
            error = %e,
            "routing_table_load_failed"
        );
        RoutingTable::default()
    });

    let client = Client::builder()
        .user_agent(concat!("mandrill-rt/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let gateway = RtGateway::new(client, config.gateway_url.clone(), config.request_timeout());
    let processor = EventProcessor::new(Arc::new(table), gateway);
    let app = web::router(AppState::new(processor), config.max_body_bytes);

    let listener = TcpListener::bind(config.listen)
        .await
        .context("Failed to bind to address")?;

    info!(address = %config.listen, "web_server_listening");

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

    info!("web_server_shutting_down");
}

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use devtrack_core::{ConfigStorage, FileConfigStorage, TrackerConfig};
use devtrack_providers::{
    AddressResolver, CoordinateResolver, DemoProvider, DeviceProvider, NominatimResolver,
};
use devtrack_server::{FileLogSink, StreamServer, TrackerEngine};
use devtrack_web::{create_router, WebState};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_CONFIG_PATH: &str = "DEVTRACK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "devtrack.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,devtrack_server=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Devtrack server starting...");

    // Configuration
    let config_path =
        std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let storage = Arc::new(FileConfigStorage::new(&config_path));
    let mut config = storage
        .load_settings()
        .with_context(|| format!("loading settings from {config_path}"))?;
    config
        .apply_overrides(|key| std::env::var(key).ok())
        .context("applying environment overrides")?;

    tracing::info!(
        poll_interval_secs = config.poll_interval_seconds,
        log_path = %config.log_path.display(),
        "Configuration loaded"
    );

    // Collaborators
    let provider: Arc<dyn DeviceProvider> = Arc::new(DemoProvider::new(config.demo.devices));
    let resolver: Arc<dyn AddressResolver> = if config.resolver.enabled {
        Arc::new(NominatimResolver::new(&config.resolver).context("building address resolver")?)
    } else {
        Arc::new(CoordinateResolver)
    };
    let sink = Arc::new(FileLogSink::new(&config.log_path));

    let engine = Arc::new(TrackerEngine::new(&config, provider.clone(), resolver, sink));

    // Spawn WebSocket stream server
    let stream_server = StreamServer::new(config.ws_bind_addr, engine.hub());
    let ws_handle = tokio::spawn(async move {
        if let Err(e) = stream_server.run().await {
            tracing::error!("WebSocket server error: {}", e);
        }
    });

    // Start HTTP API server
    let http_addr = config.http_bind_addr;
    let state = Arc::new(WebState::new(&engine, provider, config.clone(), storage));
    let http_handle = tokio::spawn(async move {
        if let Err(e) = start_http_server(http_addr, state).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // The poller runs once per process
    engine.start().await;

    tracing::info!("Devtrack server ready");
    tracing::info!("   Stream:    ws://localhost:{}/stream", config.ws_bind_addr.port());
    tracing::info!("   HTTP API:  http://localhost:{}/api", config.http_bind_addr.port());

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = ws_handle => {
            tracing::warn!("WebSocket server stopped");
        }
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
    }

    engine.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Start the HTTP API server
async fn start_http_server(addr: SocketAddr, state: Arc<WebState>) -> anyhow::Result<()> {
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

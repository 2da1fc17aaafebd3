//! HTTP route handlers.
//!
//! Everything lives under `/api`:
//! - `/api` - discovery document
//! - `/api/devices` - device state snapshot and device commands
//! - `/api/statistics` - engine counters
//! - `/api/settings` - persisted configuration
//! - `/api/notifications` - provider notifications

pub mod config;
pub mod devices;
pub mod notifications;
pub mod statistics;

use crate::AppState;
use axum::{extract::State, response::Json, routing::get, Router};
use devtrack_protocol::DiscoveryResponse;
use tower_http::cors::CorsLayer;

/// Create the main Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(discovery_handler))
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(devices::routes())
        .merge(statistics::routes())
        .merge(config::routes())
        .merge(notifications::routes())
}

/// Handler for `/api` discovery endpoint.
async fn discovery_handler(State(state): State<AppState>) -> Json<DiscoveryResponse> {
    let settings = state.settings.read().await;
    Json(DiscoveryResponse::new(
        "localhost",
        settings.http_bind_addr.port(),
        settings.ws_bind_addr.port(),
    ))
}

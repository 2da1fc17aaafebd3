//! Settings routes.
//!
//! ### `GET /api/settings`
//! Returns the current settings.
//!
//! ### `PUT /api/settings`
//! Validates and persists new settings. The running engine keeps its
//! settings; the new ones apply on restart.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use devtrack_core::TrackerConfig;
use tracing::{error, info};

use crate::AppState;

/// Create settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(put_settings))
}

/// GET /api/settings
async fn get_settings(State(state): State<AppState>) -> Json<TrackerConfig> {
    Json(state.settings.read().await.clone())
}

/// PUT /api/settings
async fn put_settings(
    State(state): State<AppState>,
    Json(new_settings): Json<TrackerConfig>,
) -> Response {
    if let Err(e) = new_settings.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    let mut settings = state.settings.write().await;
    if let Err(e) = state.storage.save_settings(&new_settings) {
        error!(error = %e, "Failed to persist settings");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    *settings = new_settings;
    info!("Settings saved, changes apply on restart");
    Json(settings.clone()).into_response()
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use devtrack_core::ConfigStorage;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_defaults() {
        let app = app();

        let (status, json) = send(&app.router, "GET", "/api/settings", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["pollIntervalSeconds"], 60);
        assert_eq!(json["logPath"], "device_locations.log");
        assert_eq!(json["resolver"]["enabled"], true);
    }

    #[tokio::test]
    async fn test_put_persists() {
        let app = app();
        let body = json!({ "pollIntervalSeconds": 120, "logPath": "/tmp/devices.log" });

        let (status, json) = send(&app.router, "PUT", "/api/settings", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["pollIntervalSeconds"], 120);
        // Omitted fields fall back to defaults
        assert_eq!(json["heartbeatSeconds"], 60);

        let saved = app.state.storage.load_settings().unwrap();
        assert_eq!(saved.poll_interval_seconds, 120);

        let (_, json) = send(&app.router, "GET", "/api/settings", None).await;
        assert_eq!(json["logPath"], "/tmp/devices.log");
    }

    #[tokio::test]
    async fn test_put_rejects_zero_interval() {
        let app = app();

        let (status, _) = send(
            &app.router,
            "PUT",
            "/api/settings",
            Some(json!({ "pollIntervalSeconds": 0 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!app.dir.path().join("devtrack.json").exists());
    }
}

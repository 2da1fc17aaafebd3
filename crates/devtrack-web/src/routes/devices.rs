//! Device routes.
//!
//! # Endpoints
//!
//! ### `GET /api/devices`
//! Every entry of the device state store, ordered by device id.
//!
//! ### `GET /api/devices/:id`
//! One entry, 404 when the device has never been reported.
//!
//! ### `POST /api/devices/:id/play_sound`
//! ### `POST /api/devices/:id/lost_mode`
//! ### `POST /api/devices/:id/erase`
//! Forward a command to the provider. The lost mode body is optional:
//!
//! ```json
//! { "message": "This device has been lost.", "phoneNumber": "", "passcode": "1234" }
//! ```
//!
//! Command responses are `{ "status": "success" | "error", "message": "..." }`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use devtrack_core::{DeviceId, DeviceState, DeviceStateStore};
use devtrack_providers::{LostModeRequest, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::AppState;

/// Outcome of a device command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
}

impl CommandResponse {
    fn success(message: &str) -> Response {
        Json(Self {
            status: "success".to_string(),
            message: message.to_string(),
        })
        .into_response()
    }

    fn failure(device_id: &DeviceId, error: ProviderError) -> Response {
        warn!(device = %device_id, error = %error, "Device command failed");
        let status = match error {
            ProviderError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(Self {
            status: "error".to_string(),
            message: error.to_string(),
        });
        (status, body).into_response()
    }
}

/// Create device routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list_devices))
        .route("/devices/:id", get(get_device))
        .route("/devices/:id/play_sound", post(play_sound))
        .route("/devices/:id/lost_mode", post(lost_mode))
        .route("/devices/:id/erase", post(erase))
}

/// GET /api/devices
async fn list_devices(State(state): State<AppState>) -> Json<Vec<DeviceState>> {
    Json(state.store.read().await.snapshot())
}

/// GET /api/devices/:id
async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeviceState>, StatusCode> {
    let device_id = DeviceId::new(id);
    let store = state.store.read().await;
    let location = store.get(&device_id).cloned().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(DeviceState {
        device_id,
        location,
    }))
}

/// POST /api/devices/:id/play_sound
async fn play_sound(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let device_id = DeviceId::new(id);
    match state.provider.play_sound(&device_id).await {
        Ok(()) => {
            info!(device = %device_id, "Sound played");
            CommandResponse::success("Sound played on device.")
        }
        Err(e) => CommandResponse::failure(&device_id, e),
    }
}

/// POST /api/devices/:id/lost_mode
async fn lost_mode(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Option<Json<LostModeRequest>>,
) -> Response {
    let device_id = DeviceId::new(id);
    let request = request.map(|Json(r)| r).unwrap_or_default();
    match state.provider.enable_lost_mode(&device_id, &request).await {
        Ok(()) => {
            info!(device = %device_id, "Lost mode enabled");
            CommandResponse::success("Device put in lost mode.")
        }
        Err(e) => CommandResponse::failure(&device_id, e),
    }
}

/// POST /api/devices/:id/erase
async fn erase(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let device_id = DeviceId::new(id);
    match state.provider.erase(&device_id).await {
        Ok(()) => {
            info!(device = %device_id, "Erase requested");
            CommandResponse::success("Device erased.")
        }
        Err(e) => CommandResponse::failure(&device_id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::*;
    use chrono::{TimeZone, Utc};
    use devtrack_core::{LocationObservation, ResolvedLocation};
    use devtrack_providers::DemoProvider;
    use serde_json::json;
    use std::sync::Arc;

    async fn seed(app: &TestApp, id: &str, lat: f64) {
        let ts = Utc.with_ymd_and_hms(2024, 1, 17, 10, 30, 0).unwrap();
        app.state.store.write().await.set(
            DeviceId::new(id),
            ResolvedLocation::new(LocationObservation::new(lat, 20.0, ts), "Main St"),
        );
    }

    #[tokio::test]
    async fn test_list_devices() {
        let app = app();
        seed(&app, "b", 2.0).await;
        seed(&app, "a", 1.0).await;

        let (status, json) = send(&app.router, "GET", "/api/devices", None).await;

        assert_eq!(status, StatusCode::OK);
        let devices = json.as_array().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0]["deviceId"], "a");
        assert_eq!(devices[0]["location"]["latitude"], 1.0);
        assert_eq!(devices[0]["location"]["address"], "Main St");
    }

    #[tokio::test]
    async fn test_get_device() {
        let app = app();
        seed(&app, "a", 1.0).await;

        let (status, json) = send(&app.router, "GET", "/api/devices/a", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["deviceId"], "a");

        let (status, _) = send(&app.router, "GET", "/api/devices/zz", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_play_sound() {
        let app = app();

        let (status, json) =
            send(&app.router, "POST", "/api/devices/demo-1/play_sound", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Sound played on device.");
    }

    #[tokio::test]
    async fn test_lost_mode_with_and_without_body() {
        let provider = Arc::new(DemoProvider::new(2));
        let app = app_with(provider.clone());

        let (status, _) = send(&app.router, "POST", "/api/devices/demo-1/lost_mode", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(provider.is_lost(&DeviceId::new("demo-1")).await);

        let body = json!({ "message": "Call me", "phoneNumber": "555-0100" });
        let (status, json) =
            send(&app.router, "POST", "/api/devices/demo-2/lost_mode", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Device put in lost mode.");
        assert!(provider.is_lost(&DeviceId::new("demo-2")).await);
    }

    #[tokio::test]
    async fn test_command_for_unknown_device() {
        let app = app();

        let (status, json) = send(&app.router, "POST", "/api/devices/nope/erase", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Device not found: nope");
    }
}

//! Provider notifications.
//!
//! ### `GET /api/notifications`
//!
//! ```json
//! { "notifications": [ { "title": "...", "message": "...", "date": "2024-01-17T10:30:00Z" } ] }
//! ```
//!
//! A provider failure answers 500 with `{ "error": "..." }`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use devtrack_providers::Notification;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/notifications", get(get_notifications))
}

async fn get_notifications(State(state): State<AppState>) -> Response {
    match state.provider.notifications().await {
        Ok(notifications) => Json(NotificationList { notifications }).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch notifications");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

//! Engine statistics.
//!
//! ### `GET /api/statistics`
//!
//! ```json
//! {
//!   "cyclesCompleted": 12,
//!   "cycleFailures": 0,
//!   "deviceFailures": 1,
//!   "changesNotified": 30,
//!   "logWriteFailures": 0,
//!   "subscribers": 2,
//!   "uptime": 725,
//!   "lastCycleAt": "2024-01-17T10:30:00Z"
//! }
//! ```

use axum::{extract::State, response::Json, routing::get, Router};
use devtrack_core::StatisticsSnapshot;

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/statistics", get(get_statistics))
}

async fn get_statistics(State(state): State<AppState>) -> Json<StatisticsSnapshot> {
    Json(state.stats.snapshot())
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use chrono::Utc;

    #[tokio::test]
    async fn test_statistics() {
        let app = app();
        app.state.stats.record_cycle_completed(Utc::now());
        app.state.stats.record_change();
        app.state.stats.record_device_failure();

        let (status, json) = send(&app.router, "GET", "/api/statistics", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cyclesCompleted"], 1);
        assert_eq!(json["changesNotified"], 1);
        assert_eq!(json["deviceFailures"], 1);
        assert!(json["lastCycleAt"].is_string());
    }
}

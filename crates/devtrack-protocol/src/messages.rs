//! Stream event types.
//!
//! Every message a subscriber receives is a [`StreamEvent`], serialized as a
//! tagged JSON object:
//!
//! ```json
//! { "type": "status", "data": { "message": "Starting device poll..." } }
//! { "type": "device_update", "data": { "deviceId": "...", "name": "...", "type": "iPhone", "location": { ... } } }
//! { "type": "log", "data": { ... same payload as device_update ... } }
//! { "type": "error", "data": { "message": "..." } }
//! ```
//!
//! A `hello` event is sent once to each subscriber right after it connects.

use devtrack_core::ChangeEvent;
use serde::{Deserialize, Serialize};

/// Message sent on connect before any broadcast event.
pub const HELLO_MESSAGE: &str = "Connected";

/// Status message emitted when a poll cycle starts.
pub const CYCLE_START_MESSAGE: &str = "Starting device poll...";

/// Status message emitted when a poll cycle finishes.
pub const CYCLE_END_MESSAGE: &str = "Device poll completed.";

/// Status message emitted when a poll cycle ends early.
pub const CYCLE_ABORTED_MESSAGE: &str = "Device poll aborted.";

/// Status message emitted before re-establishing the provider session.
pub const REAUTHENTICATING_MESSAGE: &str = "Provider session expired, reauthenticating...";

/// Event delivered to stream subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Greeting sent only to the newly connected subscriber.
    Hello { message: String },

    /// Poll cycle progress.
    Status { message: String },

    /// A device location changed significantly.
    DeviceUpdate(ChangeEvent),

    /// The same change, as recorded in the location log.
    Log(ChangeEvent),

    /// A failure during polling.
    Error { message: String },
}

impl StreamEvent {
    pub fn hello() -> Self {
        StreamEvent::Hello {
            message: HELLO_MESSAGE.to_string(),
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        StreamEvent::Status {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    /// Event kind as it appears in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Hello { .. } => "hello",
            StreamEvent::Status { .. } => "status",
            StreamEvent::DeviceUpdate(_) => "device_update",
            StreamEvent::Log(_) => "log",
            StreamEvent::Error { .. } => "error",
        }
    }
}

// ============================================================================
// Discovery Endpoint
// ============================================================================

/// Discovery response for the REST root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub endpoints: DiscoveryEndpoints,
    pub server: ServerInfo,
}

/// Endpoints advertised in discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryEndpoints {
    pub http: String,
    pub stream: String,
}

/// Server identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub id: String,
    pub version: String,
}

impl DiscoveryResponse {
    /// Create a discovery response for the given host and ports.
    pub fn new(host: &str, http_port: u16, ws_port: u16) -> Self {
        Self {
            endpoints: DiscoveryEndpoints {
                http: format!("http://{}:{}/api", host, http_port),
                stream: format!("ws://{}:{}/stream", host, ws_port),
            },
            server: ServerInfo {
                id: "devtrack-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

//! WebSocket message codec.
//!
//! Stream events travel as JSON text frames.

use crate::messages::StreamEvent;
use thiserror::Error;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON (de)serialization failed.
    #[error("Failed to serialize message: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Encode a stream event to JSON for WebSocket transmission.
pub fn encode_stream_event(event: &StreamEvent) -> Result<String, CodecError> {
    serde_json::to_string(event).map_err(CodecError::from)
}

/// Decode a stream event received over WebSocket.
pub fn decode_stream_event(text: &str) -> Result<StreamEvent, CodecError> {
    serde_json::from_str(text).map_err(CodecError::from)
}

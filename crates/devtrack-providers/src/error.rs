//! Provider error types.

use devtrack_core::DeviceId;
use thiserror::Error;

/// Errors surfaced by a device provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The session is missing, expired or was rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The provider does not know this device.
    #[error("Device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// The provider does not implement this operation.
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// A single request failed.
    #[error("Request failed: {0}")]
    Request(String),
}

impl ProviderError {
    /// Whether the failure affects every device rather than one query.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            ProviderError::Unavailable(_) | ProviderError::Authentication(_)
        )
    }
}

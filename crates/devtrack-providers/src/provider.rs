//! Device provider capability.
//!
//! A provider is the external device-account service: it owns the session,
//! lists the current roster and answers location queries. Commands that
//! only forward a single action to a device (play sound, lost mode, erase)
//! default to [`ProviderError::Unsupported`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devtrack_core::{Device, DeviceId, LocationObservation};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// External device-account service consumed by the poll scheduler.
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Whether the current session is still trusted.
    async fn is_session_valid(&self) -> bool;

    /// Establish a fresh session.
    async fn reauthenticate(&self) -> Result<(), ProviderError>;

    /// Current device roster. Membership may change between calls.
    async fn list_devices(&self) -> Result<Vec<Device>, ProviderError>;

    /// Current location of one device, `None` when it has no fix.
    async fn query_location(
        &self,
        device_id: &DeviceId,
    ) -> Result<Option<LocationObservation>, ProviderError>;

    /// Play a sound on the device.
    async fn play_sound(&self, device_id: &DeviceId) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported("play_sound"))
    }

    /// Put the device into lost mode.
    async fn enable_lost_mode(
        &self,
        device_id: &DeviceId,
        request: &LostModeRequest,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported("lost_mode"))
    }

    /// Remotely erase the device.
    async fn erase(&self, device_id: &DeviceId) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported("erase"))
    }

    /// Push notifications held by the account.
    async fn notifications(&self) -> Result<Vec<Notification>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Parameters for lost mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LostModeRequest {
    /// Message shown on the device's lock screen.
    pub message: String,

    /// Contact number shown alongside the message.
    pub phone_number: String,

    /// Passcode that unlocks the device.
    pub passcode: String,
}

impl Default for LostModeRequest {
    fn default() -> Self {
        Self {
            message: "This device has been lost.".to_string(),
            phone_number: String::new(),
            passcode: "1234".to_string(),
        }
    }
}

/// A push notification from the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

impl Notification {
    /// Build a notification, filling in placeholders for missing text.
    pub fn new(title: Option<String>, message: Option<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.unwrap_or_else(|| "No title".to_string()),
            message: message.unwrap_or_else(|| "No message".to_string()),
            date,
        }
    }
}

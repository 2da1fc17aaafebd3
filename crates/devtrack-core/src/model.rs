//! Device tracking data model types.
//!
//! These types describe what flows through the engine:
//! - Devices as reported by the provider roster
//! - Raw location observations from a single poll
//! - Resolved locations (observation plus address) kept in the store
//! - Change events delivered to subscribers and the location log

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque device identity assigned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A device in the provider's roster.
///
/// The roster is fetched fresh every poll cycle, so a `Device` is never
/// mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Provider-assigned identity
    pub id: DeviceId,

    /// Display name (e.g., "Alice's iPhone")
    pub name: String,

    /// Device class label (e.g., "iPhone", "MacBookPro")
    pub device_class: String,
}

impl Device {
    pub fn new(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        device_class: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_class: device_class.into(),
        }
    }
}

/// A location fix reported by the provider for one device in one poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationObservation {
    pub latitude: f64,
    pub longitude: f64,

    /// Observation time, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
}

impl LocationObservation {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }

    /// Whether the coordinates differ from `other` at all (no tolerance).
    pub fn position_differs(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude != latitude || self.longitude != longitude
    }
}

/// An accepted observation together with its human-readable address.
///
/// The address is either the resolver's answer or one of its failure
/// sentinels; a failed lookup never prevents a location from being stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    #[serde(flatten)]
    pub observation: LocationObservation,

    pub address: String,
}

impl ResolvedLocation {
    pub fn new(observation: LocationObservation, address: impl Into<String>) -> Self {
        Self {
            observation,
            address: address.into(),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.observation.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.observation.longitude
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.observation.timestamp
    }
}

/// A significant location change, delivered to subscribers and the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub device_id: DeviceId,

    pub name: String,

    #[serde(rename = "type")]
    pub device_type: String,

    pub location: ResolvedLocation,
}

impl ChangeEvent {
    pub fn new(device: &Device, location: ResolvedLocation) -> Self {
        Self {
            device_id: device.id.clone(),
            name: device.name.clone(),
            device_type: device.device_class.clone(),
            location,
        }
    }
}

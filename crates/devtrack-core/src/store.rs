//! Device state store.
//!
//! The store keeps the most recently *reported* location for every device
//! that has ever produced a significant observation. It is the only source
//! of truth for change detection.
//!
//! The store itself is a plain data structure; callers that share it between
//! tasks wrap it in a lock (see `devtrack-server`).

use crate::model::{DeviceId, ResolvedLocation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trait for device state storage implementations.
pub trait DeviceStateStore: Send + Sync {
    /// Get the last reported location for a device.
    ///
    /// `None` means the device has never been reported (first sighting).
    fn get(&self, device_id: &DeviceId) -> Option<&ResolvedLocation>;

    /// Record a newly accepted location, replacing any previous entry.
    fn set(&mut self, device_id: DeviceId, location: ResolvedLocation);

    /// Number of devices with a stored location.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out every entry, ordered by device id.
    fn snapshot(&self) -> Vec<DeviceState>;
}

/// One store entry as seen by diagnostic readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    pub device_id: DeviceId,
    pub location: ResolvedLocation,
}

/// In-memory device state store.
///
/// Entries are never removed: a device that drops off the roster simply
/// stops being updated.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    states: HashMap<DeviceId, ResolvedLocation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStateStore for MemoryStore {
    fn get(&self, device_id: &DeviceId) -> Option<&ResolvedLocation> {
        self.states.get(device_id)
    }

    fn set(&mut self, device_id: DeviceId, location: ResolvedLocation) {
        self.states.insert(device_id, location);
    }

    fn len(&self) -> usize {
        self.states.len()
    }

    fn snapshot(&self) -> Vec<DeviceState> {
        let mut entries: Vec<DeviceState> = self
            .states
            .iter()
            .map(|(id, location)| DeviceState {
                device_id: id.clone(),
                location: location.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LocationObservation;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn location(lat: f64, lon: f64, secs: i64) -> ResolvedLocation {
        let ts = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        ResolvedLocation::new(LocationObservation::new(lat, lon, ts), "Somewhere")
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.get(&DeviceId::new("d1")).is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = MemoryStore::new();
        store.set(DeviceId::new("d1"), location(10.0, 20.0, 0));

        let stored = store.get(&DeviceId::new("d1")).unwrap();
        assert_eq!(stored.latitude(), 10.0);
        assert_eq!(stored.longitude(), 20.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_replaces_previous_entry() {
        let mut store = MemoryStore::new();
        store.set(DeviceId::new("d1"), location(10.0, 20.0, 0));
        store.set(DeviceId::new("d1"), location(11.0, 20.0, 5));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&DeviceId::new("d1")), Some(&location(11.0, 20.0, 5)));
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut store = MemoryStore::new();
        store.set(DeviceId::new("zeta"), location(1.0, 1.0, 0));
        store.set(DeviceId::new("alpha"), location(2.0, 2.0, 0));

        let ids: Vec<String> = store
            .snapshot()
            .into_iter()
            .map(|s| s.device_id.to_string())
            .collect();
        assert_eq!(ids, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}

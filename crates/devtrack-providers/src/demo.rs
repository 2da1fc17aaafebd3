//! Simulated device provider.
//!
//! Produces a small roster that exercises every engine path without provider
//! credentials: even-numbered devices drift a little on every query, odd ones
//! stay put (heartbeat only), and every fourth device never has a fix.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use devtrack_core::{Device, DeviceId, LocationObservation};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::ProviderError;
use crate::provider::{DeviceProvider, LostModeRequest, Notification};

const DEVICE_CLASSES: [&str; 3] = ["iPhone", "iPad", "MacBookPro"];

#[derive(Debug, Clone)]
struct SimulatedDevice {
    device: Device,
    latitude: f64,
    longitude: f64,
    moving: bool,
    has_fix: bool,
    lost: bool,
}

/// Provider backed by simulated devices.
pub struct DemoProvider {
    devices: Mutex<HashMap<DeviceId, SimulatedDevice>>,
    order: Vec<DeviceId>,
}

impl DemoProvider {
    pub fn new(count: usize) -> Self {
        let mut devices = HashMap::new();
        let mut order = Vec::with_capacity(count);

        for i in 0..count {
            let id = DeviceId::new(format!("demo-{}", i + 1));
            let class = DEVICE_CLASSES[i % DEVICE_CLASSES.len()];
            let device = Device::new(id.clone(), format!("Demo {} {}", class, i + 1), class);

            devices.insert(
                id.clone(),
                SimulatedDevice {
                    device,
                    latitude: 52.0987654 + i as f64 * 0.01,
                    longitude: 4.9876545 + i as f64 * 0.01,
                    moving: i % 2 == 0,
                    has_fix: i % 4 != 3,
                    lost: false,
                },
            );
            order.push(id);
        }

        Self {
            devices: Mutex::new(devices),
            order,
        }
    }

    /// Whether lost mode was enabled on the device.
    pub async fn is_lost(&self, device_id: &DeviceId) -> bool {
        self.devices
            .lock()
            .await
            .get(device_id)
            .map(|d| d.lost)
            .unwrap_or(false)
    }
}

#[async_trait]
impl DeviceProvider for DemoProvider {
    fn name(&self) -> &str {
        "demo"
    }

    async fn is_session_valid(&self) -> bool {
        true
    }

    async fn reauthenticate(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<Device>, ProviderError> {
        let devices = self.devices.lock().await;
        Ok(self
            .order
            .iter()
            .filter_map(|id| devices.get(id).map(|d| d.device.clone()))
            .collect())
    }

    async fn query_location(
        &self,
        device_id: &DeviceId,
    ) -> Result<Option<LocationObservation>, ProviderError> {
        let mut devices = self.devices.lock().await;
        let sim = devices
            .get_mut(device_id)
            .ok_or_else(|| ProviderError::DeviceNotFound(device_id.clone()))?;

        if !sim.has_fix {
            return Ok(None);
        }

        if sim.moving {
            sim.latitude += 0.00001;
            sim.longitude += 0.00002;
        }

        Ok(Some(LocationObservation::new(
            sim.latitude,
            sim.longitude,
            Utc::now(),
        )))
    }

    async fn play_sound(&self, device_id: &DeviceId) -> Result<(), ProviderError> {
        let devices = self.devices.lock().await;
        let sim = devices
            .get(device_id)
            .ok_or_else(|| ProviderError::DeviceNotFound(device_id.clone()))?;
        info!(device = %device_id, name = %sim.device.name, "Playing sound");
        Ok(())
    }

    async fn enable_lost_mode(
        &self,
        device_id: &DeviceId,
        request: &LostModeRequest,
    ) -> Result<(), ProviderError> {
        let mut devices = self.devices.lock().await;
        let sim = devices
            .get_mut(device_id)
            .ok_or_else(|| ProviderError::DeviceNotFound(device_id.clone()))?;
        sim.lost = true;
        info!(device = %device_id, message = %request.message, "Lost mode enabled");
        Ok(())
    }

    async fn erase(&self, device_id: &DeviceId) -> Result<(), ProviderError> {
        let devices = self.devices.lock().await;
        if !devices.contains_key(device_id) {
            return Err(ProviderError::DeviceNotFound(device_id.clone()));
        }
        info!(device = %device_id, "Erase requested");
        Ok(())
    }

    async fn notifications(&self) -> Result<Vec<Notification>, ProviderError> {
        Ok(vec![Notification::new(
            Some("Demo".to_string()),
            Some(format!("{} simulated devices online", self.order.len())),
            Utc::now(),
        )])
    }
}

//! Poll scheduler.
//!
//! One long-lived loop: run a cycle, sleep for the poll interval, repeat.
//! The first cycle runs immediately and the sleep happens whatever the
//! cycle's outcome.
//!
//! A cycle:
//! 1. publishes a start status
//! 2. makes sure the provider session is valid, reauthenticating if needed
//! 3. fetches the current roster
//! 4. for every device, queries its location, checks significance against
//!    the store, and on a significant change resolves the address, updates
//!    the store, broadcasts the change and appends it to the log
//! 5. publishes an end status
//!
//! A failed device query is reported and skipped. A session or roster
//! failure, including one surfacing from a device query, ends the cycle
//! early; the next cycle still runs on schedule.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use devtrack_core::{
    ChangeDetector, ChangeEvent, Device, DeviceStateStore, EngineStatistics, ResolvedLocation,
};
use devtrack_protocol::{
    StreamEvent, CYCLE_ABORTED_MESSAGE, CYCLE_END_MESSAGE, CYCLE_START_MESSAGE,
    REAUTHENTICATING_MESSAGE,
};
use devtrack_providers::{AddressResolver, DeviceProvider, ProviderError};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::engine::SharedStore;
use crate::hub::BroadcastHub;
use crate::log_sink::LogSink;

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Devices in the roster.
    pub devices: usize,
    /// Significant changes reported.
    pub changes: usize,
    /// Device queries that failed.
    pub failures: usize,
    /// Set when the cycle ended early.
    pub aborted: Option<String>,
}

/// The background polling loop and its collaborators.
#[derive(Clone)]
pub struct PollScheduler {
    provider: Arc<dyn DeviceProvider>,
    resolver: Arc<dyn AddressResolver>,
    store: SharedStore,
    hub: Arc<BroadcastHub>,
    sink: Arc<dyn LogSink>,
    stats: Arc<EngineStatistics>,
    detector: ChangeDetector,
    interval: Duration,
}

impl PollScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn DeviceProvider>,
        resolver: Arc<dyn AddressResolver>,
        store: SharedStore,
        hub: Arc<BroadcastHub>,
        sink: Arc<dyn LogSink>,
        stats: Arc<EngineStatistics>,
        detector: ChangeDetector,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            resolver,
            store,
            hub,
            sink,
            stats,
            detector,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until `shutdown` flips to true or its sender is dropped.
    ///
    /// Shutdown is only observed between cycles.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            provider = self.provider.name(),
            interval_secs = self.interval.as_secs(),
            "Poll scheduler started"
        );

        loop {
            let report = self.run_cycle().await;
            debug!(?report, "Poll cycle finished");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Poll scheduler stopped");
    }

    /// Run one cycle using the current time.
    pub async fn run_cycle(&self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle, judging heartbeats against `now`.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleReport {
        self.hub.publish(StreamEvent::status(CYCLE_START_MESSAGE)).await;

        let mut report = CycleReport::default();
        match self.poll_devices(now, &mut report).await {
            Ok(()) => {
                self.stats.record_cycle_completed(now);
                self.hub.publish(StreamEvent::status(CYCLE_END_MESSAGE)).await;
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "Poll cycle aborted");
                self.stats.record_cycle_failure(now);
                self.hub
                    .publish(StreamEvent::error(format!("Device poll failed: {e}")))
                    .await;
                self.hub.publish(StreamEvent::status(CYCLE_ABORTED_MESSAGE)).await;
                report.aborted = Some(e.to_string());
            }
        }

        report
    }

    /// Cycle body. Errors returned here are cycle-level.
    async fn poll_devices(
        &self,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) -> Result<(), ProviderError> {
        self.ensure_session().await?;

        let devices = self.provider.list_devices().await?;
        report.devices = devices.len();

        for device in &devices {
            match self.poll_device(device, now).await {
                Ok(true) => report.changes += 1,
                Ok(false) => {}
                // A lost session fails every remaining query too
                Err(e) if e.is_session_error() => return Err(e),
                Err(e) => {
                    report.failures += 1;
                    self.stats.record_device_failure();
                    warn!(device = %device.id, name = %device.name, error = %e, "Location query failed");
                    self.hub
                        .publish(StreamEvent::error(format!(
                            "Failed to query location for {} ({}): {}",
                            device.name, device.id, e
                        )))
                        .await;
                }
            }
        }

        Ok(())
    }

    async fn ensure_session(&self) -> Result<(), ProviderError> {
        if self.provider.is_session_valid().await {
            return Ok(());
        }

        warn!(provider = self.provider.name(), "Provider session invalid, reauthenticating");
        self.hub
            .publish(StreamEvent::status(REAUTHENTICATING_MESSAGE))
            .await;
        self.provider.reauthenticate().await
    }

    /// Process one device. Returns whether a change was reported.
    async fn poll_device(&self, device: &Device, now: DateTime<Utc>) -> Result<bool, ProviderError> {
        let Some(observation) = self.provider.query_location(&device.id).await? else {
            debug!(device = %device.id, "No location fix");
            return Ok(false);
        };

        let significance = {
            let store = self.store.read().await;
            self.detector.evaluate(store.get(&device.id), &observation, now)
        };

        if !significance.is_significant() {
            debug!(device = %device.id, "Location unchanged");
            return Ok(false);
        }

        let address = self
            .resolver
            .resolve(observation.latitude, observation.longitude)
            .await;
        let location = ResolvedLocation::new(observation, address);

        self.store
            .write()
            .await
            .set(device.id.clone(), location.clone());

        debug!(device = %device.id, ?significance, "Reporting location change");
        self.notify(ChangeEvent::new(device, location)).await;
        Ok(true)
    }

    /// Broadcast a change and append it to the log.
    async fn notify(&self, event: ChangeEvent) {
        self.stats.record_change();
        self.hub.publish(StreamEvent::DeviceUpdate(event.clone())).await;
        self.hub.publish(StreamEvent::Log(event.clone())).await;

        if let Err(e) = self.sink.append(&event) {
            self.stats.record_log_write_failure();
            warn!(device = %event.device_id, error = %e, "Location log write failed");
            self.hub.publish(StreamEvent::error(e.to_string())).await;
        }
    }
}

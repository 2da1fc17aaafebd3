//! Engine wiring.
//!
//! [`TrackerEngine`] owns the shared state (store, hub, statistics) and the
//! background poller. The poller is started at most once per engine, however
//! many times [`TrackerEngine::start`] is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use devtrack_core::{ChangeDetector, EngineStatistics, MemoryStore, TrackerConfig};
use devtrack_providers::{AddressResolver, DeviceProvider};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::hub::BroadcastHub;
use crate::log_sink::LogSink;
use crate::scheduler::PollScheduler;

/// Device state store shared between the poller and readers.
pub type SharedStore = Arc<RwLock<MemoryStore>>;

pub struct TrackerEngine {
    store: SharedStore,
    hub: Arc<BroadcastHub>,
    stats: Arc<EngineStatistics>,
    scheduler: PollScheduler,
    shutdown_tx: watch::Sender<bool>,
    started: AtomicBool,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl TrackerEngine {
    pub fn new(
        config: &TrackerConfig,
        provider: Arc<dyn DeviceProvider>,
        resolver: Arc<dyn AddressResolver>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let store: SharedStore = Arc::new(RwLock::new(MemoryStore::new()));
        let stats = Arc::new(EngineStatistics::new());
        let hub = Arc::new(BroadcastHub::new(config.subscriber_buffer, stats.clone()));

        let scheduler = PollScheduler::new(
            provider,
            resolver,
            store.clone(),
            hub.clone(),
            sink,
            stats.clone(),
            ChangeDetector::new(config.heartbeat_seconds),
            config.poll_interval(),
        );

        let (shutdown_tx, _) = watch::channel(false);

        Self {
            store,
            hub,
            stats,
            scheduler,
            shutdown_tx,
            started: AtomicBool::new(false),
            poller: Mutex::new(None),
        }
    }

    /// Spawn the poller. Returns false if it was already started.
    pub async fn start(&self) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Poller already started, ignoring");
            return false;
        }

        let scheduler = self.scheduler.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(scheduler.run(shutdown_rx));
        *self.poller.lock().await = Some(handle);

        info!("Tracker engine started");
        true
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Stop the poller after its current cycle and wait for it to exit.
    ///
    /// The engine cannot be started again afterwards.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(handle) = self.poller.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Poller task ended abnormally");
            }
        }
        info!("Tracker engine stopped");
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub fn hub(&self) -> Arc<BroadcastHub> {
        self.hub.clone()
    }

    pub fn statistics(&self) -> Arc<EngineStatistics> {
        self.stats.clone()
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }
}

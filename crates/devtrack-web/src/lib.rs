//! # devtrack-web
//!
//! REST API for the devtrack server.
//!
//! This crate provides:
//! - A discovery document pointing at the REST API and the event stream
//! - Read-only views of the device state store and engine statistics
//! - Settings read/write backed by a [`ConfigStorage`]
//! - Device commands and notifications forwarded to the [`DeviceProvider`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use devtrack_web::{create_router, WebState};
//!
//! let state = WebState::new(&engine, provider, settings, storage);
//! let app = create_router(Arc::new(state));
//!
//! let listener = TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod routes;

pub use routes::create_router;

use std::sync::Arc;

use devtrack_core::{ConfigStorage, EngineStatistics, TrackerConfig};
use devtrack_providers::DeviceProvider;
use devtrack_server::{SharedStore, TrackerEngine};
use tokio::sync::RwLock;

/// Shared state for all route handlers.
pub struct WebState {
    pub store: SharedStore,
    pub stats: Arc<EngineStatistics>,
    pub provider: Arc<dyn DeviceProvider>,
    /// Settings as last loaded or saved. Changes apply on restart.
    pub settings: RwLock<TrackerConfig>,
    pub storage: Arc<dyn ConfigStorage>,
}

impl WebState {
    /// Create state reading from a running engine.
    pub fn new(
        engine: &TrackerEngine,
        provider: Arc<dyn DeviceProvider>,
        settings: TrackerConfig,
        storage: Arc<dyn ConfigStorage>,
    ) -> Self {
        Self {
            store: engine.store(),
            stats: engine.statistics(),
            provider,
            settings: RwLock::new(settings),
            storage,
        }
    }
}

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<WebState>;

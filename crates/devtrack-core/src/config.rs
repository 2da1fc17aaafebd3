//! Tracker configuration and its storage.
//!
//! Settings are kept as a camelCase JSON document. Every field has a
//! default, so a missing or partial file still yields a usable config.
//!
//! Storage is abstracted behind [`ConfigStorage`] so the REST layer can read
//! and persist settings without knowing where they live.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detector::DEFAULT_HEARTBEAT_SECS;

/// Environment variable overriding `pollIntervalSeconds`.
pub const ENV_POLL_INTERVAL: &str = "DEVTRACK_POLL_INTERVAL";
/// Environment variable overriding `logPath`.
pub const ENV_LOG_PATH: &str = "DEVTRACK_LOG_PATH";

/// Errors that can occur during configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration.
    ReadError(String),
    /// Failed to write configuration.
    WriteError(String),
    /// Configuration data is invalid.
    InvalidData(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Read error: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "Write error: {}", msg),
            ConfigError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete tracker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    /// Seconds to sleep between poll cycles.
    pub poll_interval_seconds: u64,

    /// Append-only location log file.
    pub log_path: PathBuf,

    /// Seconds after which an unchanged position is reported again.
    pub heartbeat_seconds: u64,

    /// WebSocket stream listener.
    pub ws_bind_addr: SocketAddr,

    /// REST API listener.
    pub http_bind_addr: SocketAddr,

    /// Queued events per subscriber before new events are dropped for it.
    pub subscriber_buffer: usize,

    pub resolver: ResolverSettings,

    pub demo: DemoSettings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
            log_path: PathBuf::from("device_locations.log"),
            heartbeat_seconds: DEFAULT_HEARTBEAT_SECS,
            ws_bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            http_bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            subscriber_buffer: 256,
            resolver: ResolverSettings::default(),
            demo: DemoSettings::default(),
        }
    }
}

impl TrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Apply overrides from environment-style variables.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            self.poll_interval_seconds = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidData(format!("{ENV_POLL_INTERVAL} must be seconds, got {raw:?}"))
            })?;
        }
        if let Some(path) = lookup(ENV_LOG_PATH) {
            self.log_path = PathBuf::from(path);
        }
        self.validate()
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidData(
                "pollIntervalSeconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reverse geocoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverSettings {
    /// When disabled, addresses are rendered from the coordinates.
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "devtrack/0.1".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Simulated roster used by the demo provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoSettings {
    pub devices: usize,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self { devices: 3 }
    }
}

/// Abstract configuration storage.
///
/// All methods are synchronous; async wrappers belong to the web layer.
pub trait ConfigStorage: Send + Sync {
    /// Load settings, falling back to defaults when none were saved yet.
    fn load_settings(&self) -> Result<TrackerConfig, ConfigError>;

    /// Persist settings.
    fn save_settings(&self, settings: &TrackerConfig) -> Result<(), ConfigError>;
}

/// JSON file backed configuration storage.
#[derive(Debug, Clone)]
pub struct FileConfigStorage {
    path: PathBuf,
}

impl FileConfigStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStorage for FileConfigStorage {
    fn load_settings(&self) -> Result<TrackerConfig, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TrackerConfig::default())
            }
            Err(e) => {
                return Err(ConfigError::ReadError(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let settings: TrackerConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::InvalidData(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn save_settings(&self, settings: &TrackerConfig) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(format!("{}: {}", parent.display(), e)))?;
        }

        std::fs::write(&self.path, json)
            .map_err(|e| ConfigError::WriteError(format!("{}: {}", self.path.display(), e)))
    }
}

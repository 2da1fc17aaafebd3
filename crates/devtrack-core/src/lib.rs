//! # devtrack-core
//!
//! Core device tracking model and state implementation.
//!
//! This crate provides:
//! - Data model types (Device, LocationObservation, ResolvedLocation, ChangeEvent)
//! - The device state store holding the last reported location per device
//! - The change detector deciding whether an observation is worth reporting
//! - Configuration types and storage
//! - Engine statistics counters
//!
//! This crate is intentionally runtime-agnostic and contains no async code.

pub mod config;
pub mod detector;
pub mod model;
pub mod statistics;
pub mod store;

pub use config::{ConfigError, ConfigStorage, FileConfigStorage, TrackerConfig};
pub use detector::{ChangeDetector, Significance};
pub use model::*;
pub use statistics::{EngineStatistics, StatisticsSnapshot};
pub use store::{DeviceState, DeviceStateStore, MemoryStore};

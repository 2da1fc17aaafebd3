//! # devtrack-server
//!
//! The location polling and change-notification engine:
//! - [`hub::BroadcastHub`] fans events out to every connected subscriber
//! - [`log_sink::FileLogSink`] appends every reported change to a text log
//! - [`scheduler::PollScheduler`] polls the provider and detects changes
//! - [`engine::TrackerEngine`] wires them together and starts the poller once
//! - [`server::StreamServer`] serves the event stream over WebSocket

pub mod engine;
pub mod error;
pub mod hub;
pub mod log_sink;
pub mod scheduler;
pub mod server;

pub use devtrack_core::{ChangeEvent, MemoryStore, TrackerConfig};
pub use devtrack_protocol::StreamEvent;
pub use engine::{SharedStore, TrackerEngine};
pub use error::ServerError;
pub use hub::{BroadcastHub, SubscriberId, Subscription};
pub use log_sink::{FileLogSink, LogSink, LogSinkError};
pub use scheduler::{CycleReport, PollScheduler};
pub use server::StreamServer;

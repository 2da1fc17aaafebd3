//! Append-only location log.
//!
//! One line per reported change:
//!
//! ```text
//! 2024-01-17 10:30:05 - Alice's iPhone (iPhone): Latitude: 10.5, Longitude: 20.25, Address: 1 Main St, Timestamp: 2024-01-17 10:30:00
//! ```
//!
//! The file is opened for every append and closed when the append returns,
//! whether or not the write succeeded. It is never rewritten.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use devtrack_core::ChangeEvent;
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while appending to the log.
#[derive(Debug, Error)]
pub enum LogSinkError {
    #[error("Failed to write location log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistent record of reported changes.
pub trait LogSink: Send + Sync {
    fn append(&self, event: &ChangeEvent) -> Result<(), LogSinkError>;
}

/// Text file log sink.
#[derive(Debug, Clone)]
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> LogSinkError {
        LogSinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LogSink for FileLogSink {
    fn append(&self, event: &ChangeEvent) -> Result<(), LogSinkError> {
        let line = format_log_line(event, &Local::now());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.write_all(line.as_bytes()).map_err(|e| self.io_error(e))
    }
}

/// Render one log line, newline included.
///
/// Both timestamps are shown in `logged_at`'s time zone.
pub fn format_log_line<Tz>(event: &ChangeEvent, logged_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let observed = event
        .location
        .timestamp()
        .with_timezone(&logged_at.timezone());

    format!(
        "{} - {} ({}): Latitude: {}, Longitude: {}, Address: {}, Timestamp: {}\n",
        logged_at.format(TIMESTAMP_FORMAT),
        event.name,
        event.device_type,
        event.location.latitude(),
        event.location.longitude(),
        event.location.address,
        observed.format(TIMESTAMP_FORMAT),
    )
}

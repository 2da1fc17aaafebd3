//! Change detection.
//!
//! Decides whether a fresh observation is worth reporting, given the last
//! reported location for the same device. Policy, evaluated in order:
//!
//! 1. Nothing reported yet for the device: report (first sighting).
//! 2. Latitude or longitude differ at all: report (moved).
//! 3. At least `heartbeat` elapsed since the last report: report (heartbeat).
//! 4. Otherwise the observation is dropped.
//!
//! The decision is pure. Applying it to the store is the caller's job.

use chrono::{DateTime, Utc};

use crate::model::{LocationObservation, ResolvedLocation};

/// Default heartbeat for stationary devices, in seconds.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 60;

/// Why an observation was (or was not) considered significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    FirstSighting,
    Moved,
    Heartbeat,
    Unchanged,
}

impl Significance {
    pub fn is_significant(self) -> bool {
        self != Significance::Unchanged
    }
}

/// Stateless change detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDetector {
    heartbeat_secs: i64,
}

impl ChangeDetector {
    pub fn new(heartbeat_secs: u64) -> Self {
        Self {
            heartbeat_secs: i64::try_from(heartbeat_secs).unwrap_or(i64::MAX),
        }
    }

    /// Classify `candidate` against the previously reported location.
    pub fn evaluate(
        &self,
        previous: Option<&ResolvedLocation>,
        candidate: &LocationObservation,
        now: DateTime<Utc>,
    ) -> Significance {
        let Some(previous) = previous else {
            return Significance::FirstSighting;
        };

        if candidate.position_differs(previous.latitude(), previous.longitude()) {
            return Significance::Moved;
        }

        if (now - previous.timestamp()).num_seconds() >= self.heartbeat_secs {
            return Significance::Heartbeat;
        }

        Significance::Unchanged
    }

    pub fn is_significant(
        &self,
        previous: Option<&ResolvedLocation>,
        candidate: &LocationObservation,
        now: DateTime<Utc>,
    ) -> bool {
        self.evaluate(previous, candidate, now).is_significant()
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn reported(lat: f64, lon: f64, at: i64) -> ResolvedLocation {
        ResolvedLocation::new(LocationObservation::new(lat, lon, t(at)), "Address")
    }

    #[test]
    fn test_first_sighting_is_significant() {
        let detector = ChangeDetector::default();
        let obs = LocationObservation::new(10.0, 20.0, t(0));

        assert_eq!(detector.evaluate(None, &obs, t(0)), Significance::FirstSighting);
    }

    #[test]
    fn test_same_position_within_heartbeat_is_not_significant() {
        let detector = ChangeDetector::default();
        let previous = reported(10.0, 20.0, 0);

        for secs in [0, 1, 30, 59] {
            let obs = LocationObservation::new(10.0, 20.0, t(secs));
            assert_eq!(
                detector.evaluate(Some(&previous), &obs, t(secs)),
                Significance::Unchanged,
                "at {secs}s"
            );
        }
    }

    #[test]
    fn test_heartbeat_after_interval() {
        let detector = ChangeDetector::default();
        let previous = reported(10.0, 20.0, 0);

        for secs in [60, 61, 3600, 86_400 * 2] {
            let obs = LocationObservation::new(10.0, 20.0, t(secs));
            assert_eq!(
                detector.evaluate(Some(&previous), &obs, t(secs)),
                Significance::Heartbeat,
                "at {secs}s"
            );
        }
    }

    #[test]
    fn test_any_position_change_is_significant() {
        let detector = ChangeDetector::default();
        let previous = reported(10.0, 20.0, 0);

        let moved_lat = LocationObservation::new(11.0, 20.0, t(5));
        let moved_lon = LocationObservation::new(10.0, 20.0000001, t(5));

        assert_eq!(detector.evaluate(Some(&previous), &moved_lat, t(5)), Significance::Moved);
        assert_eq!(detector.evaluate(Some(&previous), &moved_lon, t(5)), Significance::Moved);
    }

    #[test]
    fn test_clock_behind_previous_is_not_heartbeat() {
        let detector = ChangeDetector::default();
        let previous = reported(10.0, 20.0, 120);
        let obs = LocationObservation::new(10.0, 20.0, t(0));

        assert!(!detector.is_significant(Some(&previous), &obs, t(0)));
    }

    #[test]
    fn test_custom_heartbeat() {
        let detector = ChangeDetector::new(10);
        let previous = reported(10.0, 20.0, 0);
        let obs = LocationObservation::new(10.0, 20.0, t(10));

        assert!(detector.is_significant(Some(&previous), &obs, t(10)));
        assert!(!detector.is_significant(Some(&previous), &obs, t(9)));
    }
}

// crates/sentinel-core/src/core/time.rs
// ============================================================================
// Module: Sentinel Time Model
// Description: Canonical timestamp representation and injected-clock contract.
// Purpose: Keep the pipeline deterministic under a pinned replay context.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! The pipeline never reads wall-clock time directly. Every component that
//! needs "now" receives a [`Clock`] implementation; in pinned mode this
//! always returns the same timestamp, in live mode it reads the OS clock.
//! Reading time any other way is a determinism violation the test suite is
//! expected to catch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// A UTC instant expressed as milliseconds since the Unix epoch.
///
/// # Invariants
/// - Always UTC; no timezone offset is carried.
/// - Values are supplied explicitly by callers, never derived implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Constructs a timestamp from Unix milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as Unix milliseconds.
    #[must_use]
    pub const fn unix_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC 3339 timestamp string into UTC milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is not a valid RFC 3339 timestamp.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimeParseError> {
        let parsed = OffsetDateTime::parse(value, &Rfc3339)
            .map_err(|err| TimeParseError(err.to_string()))?;
        let millis = parsed.unix_timestamp() * 1000 + i64::from(parsed.millisecond());
        Ok(Self(millis))
    }

    /// Formats the timestamp as an RFC 3339 string (millisecond precision, `Z` suffix).
    #[must_use]
    pub fn to_rfc3339(self) -> String {
        let seconds = self.0.div_euclid(1000);
        let millis = self.0.rem_euclid(1000);
        let base = OffsetDateTime::from_unix_timestamp(seconds).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        let with_millis = base + time::Duration::milliseconds(millis);
        with_millis.format(&Rfc3339).unwrap_or_default()
    }

    /// Returns the number of whole days since the Unix epoch (UTC calendar date).
    #[must_use]
    pub const fn epoch_day(self) -> i64 {
        self.0.div_euclid(86_400_000)
    }

    /// Returns a new timestamp offset by the given number of days.
    #[must_use]
    pub const fn plus_days(self, days: i64) -> Self {
        Self(self.0 + days * 86_400_000)
    }

    /// Returns a new timestamp offset by the given number of hours.
    #[must_use]
    pub const fn plus_hours(self, hours: i64) -> Self {
        Self(self.0 + hours * 3_600_000)
    }

    /// Returns the absolute difference between two timestamps, in hours.
    #[must_use]
    pub fn abs_diff_hours(self, other: Self) -> i64 {
        (self.0 - other.0).abs() / 3_600_000
    }

    /// Formats the UTC calendar date of this instant as `YYYYMMDD`.
    ///
    /// Used to stamp alert ids (§4.9) in both pinned and live modes.
    #[must_use]
    pub fn to_yyyymmdd(self) -> String {
        let seconds = self.0.div_euclid(1000);
        let date = OffsetDateTime::from_unix_timestamp(seconds).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        format!("{:04}{:02}{:02}", date.year(), u8::from(date.month()), date.day())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Error returned when an RFC 3339 timestamp fails to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParseError(String);

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid rfc3339 timestamp: {}", self.0)
    }
}

impl std::error::Error for TimeParseError {}

// ============================================================================
// SECTION: Determinism Context
// ============================================================================

/// Execution mode for the determinism kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeterminismMode {
    /// Deterministic replay under an explicit seed/timestamp/run id.
    Pinned,
    /// Live operation: wall-clock time and random ids.
    Live,
}

/// Pinned replay context threaded through the orchestrator.
///
/// # Invariants
/// - `seed` and `run_id` are stable across replays of the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismContext {
    /// PRNG seed for id generation.
    pub seed: u64,
    /// Pinned "now" for every clock read within the scope.
    pub timestamp_utc: Timestamp,
    /// Run identifier recorded in evidence artifacts.
    pub run_id: String,
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Injected clock. The pipeline core must never call the OS clock directly.
pub trait Clock {
    /// Returns the current instant as seen by this clock.
    fn now(&self) -> Timestamp;

    /// Returns the determinism mode this clock operates under.
    fn mode(&self) -> DeterminismMode;
}

/// Clock that always returns a fixed, pinned timestamp.
#[derive(Debug, Clone, Copy)]
pub struct PinnedClock {
    now: Timestamp,
}

impl PinnedClock {
    /// Creates a pinned clock fixed at the given timestamp.
    #[must_use]
    pub const fn new(now: Timestamp) -> Self {
        Self { now }
    }
}

impl Clock for PinnedClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn mode(&self) -> DeterminismMode {
        DeterminismMode::Pinned
    }
}

/// Clock that reads the OS wall clock on every call.
///
/// This is the only place in the workspace permitted to call
/// [`OffsetDateTime::now_utc`]; every other component receives time through
/// a [`Clock`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = OffsetDateTime::now_utc();
        let millis = now.unix_timestamp() * 1000 + i64::from(now.millisecond());
        Timestamp::from_unix_millis(millis)
    }

    fn mode(&self) -> DeterminismMode {
        DeterminismMode::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_round_trips() {
        let ts = Timestamp::parse_rfc3339("2025-12-29T00:00:00Z").expect("valid timestamp");
        assert_eq!(ts.to_rfc3339(), "2025-12-29T00:00:00Z");
    }

    #[test]
    fn plus_hours_and_diff_agree() {
        let a = Timestamp::parse_rfc3339("2025-12-29T00:00:00Z").expect("valid timestamp");
        let b = a.plus_hours(48);
        assert_eq!(a.abs_diff_hours(b), 48);
    }

    #[test]
    fn pinned_clock_is_stable() {
        let ts = Timestamp::from_unix_millis(1_000);
        let clock = PinnedClock::new(ts);
        assert_eq!(clock.now(), ts);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.mode(), DeterminismMode::Pinned);
    }

    #[test]
    fn to_yyyymmdd_formats_calendar_date() {
        let ts = Timestamp::parse_rfc3339("2025-12-29T08:30:00Z").expect("valid timestamp");
        assert_eq!(ts.to_yyyymmdd(), "20251229");
    }
}

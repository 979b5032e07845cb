// crates/sentinel-broker/src/sink/mod.rs
// ============================================================================
// Module: Sentinel Broker Sinks
// Description: Fetch-outcome recording for operational visibility.
// Purpose: Let a registry report what it fetched, without coupling it to a
//          specific logging backend.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! A fetch against an external feed either produces bytes or fails. The
//! core ingestion pipeline's own logging only covers items once they reach
//! the raw-item store (§4 ambient logging); a [`Sink`] gives the fetch layer
//! the same ambient visibility for the step before that. Per the ambient
//! logging contract, sink failures are never propagated: a broken sink
//! degrades to "no log line", not a failed fetch.

use crate::source::SourceError;

// ============================================================================
// SECTION: Fetch Outcome
// ============================================================================

/// The result of one [`crate::source::Source::fetch`] call, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<'a> {
    /// The fetch succeeded and returned `bytes` bytes of payload.
    Success {
        /// The URI that was fetched.
        uri: &'a str,
        /// Number of bytes returned.
        bytes: usize,
    },
    /// The fetch failed with the given error.
    Failure {
        /// The URI that was attempted.
        uri: &'a str,
        /// The error that caused the failure, rendered to a string so the
        /// sink trait does not need to depend on `SourceError`'s variants.
        error: String,
    },
}

impl<'a> FetchOutcome<'a> {
    /// Builds a success outcome.
    #[must_use]
    pub const fn success(uri: &'a str, bytes: usize) -> Self {
        Self::Success {
            uri,
            bytes,
        }
    }

    /// Builds a failure outcome from a [`SourceError`].
    #[must_use]
    pub fn failure(uri: &'a str, error: &SourceError) -> Self {
        Self::Failure {
            uri,
            error: error.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Records the outcome of a feed fetch for operational visibility.
///
/// Implementations must not panic and must treat their own failures as
/// non-fatal to the caller; there is no error return for this reason.
pub trait Sink: Send + Sync {
    /// Records one fetch outcome.
    fn record(&self, outcome: &FetchOutcome<'_>);
}

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// Records fetch outcomes as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    /// Creates a new log sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Sink for LogSink {
    fn record(&self, outcome: &FetchOutcome<'_>) {
        match outcome {
            FetchOutcome::Success {
                uri,
                bytes,
            } => {
                tracing::info!(uri = %uri, bytes = %bytes, "feed fetch succeeded");
            }
            FetchOutcome::Failure {
                uri,
                error,
            } => {
                tracing::warn!(uri = %uri, error = %error, "feed fetch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sink_does_not_panic_on_success_or_failure() {
        let sink = LogSink::new();
        sink.record(&FetchOutcome::success("https://example.test/feed", 128));
        sink.record(&FetchOutcome::failure(
            "https://example.test/feed",
            &SourceError::Http("connection refused".to_string()),
        ));
    }
}

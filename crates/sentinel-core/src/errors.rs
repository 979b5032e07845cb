// crates/sentinel-core/src/errors.rs
// ============================================================================
// Module: Sentinel Error Taxonomy
// Description: Crate-boundary error enums for the ingestion pipeline (§7).
// Purpose: Give every fallible boundary a typed, non-panicking error path.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! One `thiserror`-derived enum per boundary named in §7: configuration,
//! storage, per-item parsing, and determinism violations. The orchestrator
//! catches only [`ItemParseError`] and unclassified per-item failures at
//! the item boundary; everything else propagates to the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Config Errors
// ============================================================================

/// Malformed or missing configuration, fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read from disk.
    #[error("failed to read config at {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid YAML.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
    /// A required field was missing or failed validation.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidField {
        /// Dotted field path, e.g. `tiers.global[0].trust_tier`.
        field: String,
        /// Human-readable reason.
        reason: String,
    },
}

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Database unavailable or a constraint was violated.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage backend reported an error.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A row expected to exist by id was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"raw item"`.
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },
    /// A status transition was attempted from a terminal state.
    #[error("cannot transition {entity} {id} out of terminal status")]
    TerminalStatus {
        /// Entity kind.
        entity: &'static str,
        /// The id whose status transition was rejected.
        id: String,
    },
}

// ============================================================================
// SECTION: Item Parse Errors
// ============================================================================

/// A single raw item could not be canonicalized; isolates to that item.
#[derive(Debug, Error)]
pub enum ItemParseError {
    /// The raw item's payload was not a JSON object.
    #[error("payload is not a json object")]
    NotAnObject,
    /// A timestamp field could not be parsed as RFC 3339.
    #[error("malformed timestamp in field `{field}`: {source}")]
    MalformedTimestamp {
        /// Field name that failed to parse.
        field: String,
        /// Underlying parse error.
        #[source]
        source: crate::core::time::TimeParseError,
    },
    /// Computing the content hash failed.
    #[error("failed to hash raw item: {0}")]
    Hashing(#[from] crate::core::hashing::HashError),
}

// ============================================================================
// SECTION: Determinism Violations
// ============================================================================

/// An attempt to read wall time or generate a non-seeded id inside a pinned scope.
///
/// Fatal: the test suite relies on this being impossible to suppress.
#[derive(Debug, Error)]
pub enum DeterminismViolation {
    /// A live clock was used while a pinned determinism context was active.
    #[error("wall-clock read attempted inside a pinned determinism scope")]
    WallClockRead,
    /// A live id generator was used while a pinned determinism context was active.
    #[error("non-seeded id generation attempted inside a pinned determinism scope")]
    UnseededIdGeneration,
}

// ============================================================================
// SECTION: Ingest Error
// ============================================================================

/// Top-level error surfaced by the orchestrator for batch-fatal conditions.
///
/// Per-item failures never produce this type; they are recorded in the
/// ingest report and the raw item's own `error` field instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Storage failed in a way that aborts the whole batch.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A pinned-mode invariant was violated.
    #[error(transparent)]
    Determinism(#[from] DeterminismViolation),
}

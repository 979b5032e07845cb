// crates/sentinel-cli/src/errors.rs
// ============================================================================
// Module: Sentinel CLI Errors
// Description: Top-level CLI error type and its exit-code mapping (§6).
// Purpose: Give every fallible command one typed error and a stable exit code.
// Dependencies: thiserror, sentinel-core, sentinel-config, sentinel-store-sqlite
// ============================================================================

//! ## Overview
//! The CLI wraps every lower-layer error in [`CliError`] and maps it to the
//! exit code §6 specifies: `0` on success, `1` on configuration or database
//! error, `2` on a partial ingest (the batch ran, but `errors > 0`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::ExitCode;

use thiserror::Error;

// ============================================================================
// SECTION: Error
// ============================================================================

/// Any failure surfaced by a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] sentinel_core::ConfigError),
    /// The embedded store could not be opened or queried.
    #[error(transparent)]
    Store(#[from] sentinel_store_sqlite::SqliteStoreError),
    /// A storage seam call made directly against the domain crate failed
    /// (e.g. staging a raw item), as opposed to a backend-specific error.
    #[error(transparent)]
    CoreStore(#[from] sentinel_core::errors::StoreError),
    /// The orchestrator aborted the whole batch (not a per-item failure).
    #[error(transparent)]
    Ingest(#[from] sentinel_core::errors::IngestError),
    /// An input file (candidates, CSV fixture) could not be read or parsed.
    #[error("failed to read input at {path}: {reason}")]
    Input {
        /// Path that was attempted.
        path: String,
        /// Human-readable reason.
        reason: String,
    },
    /// A `--since` duration argument did not match `<N>h` or `<N>d`.
    #[error("invalid --since value `{0}`: expected a form like `24h`, `72h`, or `7d`")]
    InvalidSince(String),
}

impl CliError {
    /// Maps this error to the process exit code §6 specifies.
    ///
    /// Every [`CliError`] variant is a configuration or database failure in
    /// the §6 sense; a partial ingest (errors > 0 but the batch completed)
    /// is signaled separately by [`crate::ingest::run`], not through this type.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }
}

// crates/sentinel-cli/src/logging.rs
// ============================================================================
// Module: Sentinel CLI Logging
// Description: Structured logging setup for the CLI binary.
// Purpose: Route every crate's `tracing` calls to a single formatted
//          subscriber; human-readable logs are best-effort only (§7).
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! The pipeline itself never logs decisions into the ingest summary (§7: "the
//! ingest summary is returned structurally; human-readable logs are
//! best-effort only"). This module wires up the one subscriber the `sentinel`
//! binary installs for the whole process.

use tracing_subscriber::EnvFilter;

/// Installs the process-wide `tracing` subscriber.
///
/// Honors `RUST_LOG` when set, defaulting to `info` otherwise. Safe to call
/// exactly once per process; called from [`crate::main`] before any command
/// runs.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// crates/sentinel-config/src/lib.rs
// ============================================================================
// Module: Sentinel Config Library
// Description: Canonical config model, loading, and validation (A1).
// Purpose: Single source of truth for source-config.yaml and quality.yaml semantics.
// Dependencies: sentinel-core, serde, serde_yaml
// ============================================================================

//! ## Overview
//! `sentinel-config` loads and validates the two YAML documents the
//! orchestrator depends on: the source configuration (§6, feed metadata and
//! trust defaults) and the alert-quality configuration (§6, quality-cap
//! thresholds). Both loaders are strict and fail closed: a malformed or
//! out-of-range document is a fatal [`sentinel_core::ConfigError`] at
//! startup, never a silently-defaulted value.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod quality;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use quality::QualityDocument;
pub use quality::load_quality_config;
pub use source::SourceDocument;
pub use source::SourceEntry;
pub use source::load_source_config;

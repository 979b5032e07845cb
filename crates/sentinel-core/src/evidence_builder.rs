// crates/sentinel-core/src/evidence_builder.rs
// ============================================================================
// Module: Sentinel Evidence Builder (C8)
// Description: Assemble the deterministic per-correlation evidence artifact.
// Purpose: Snapshot source, correlation, and diagnostics into an IncidentEvidenceArtifact.
// Dependencies: crate::core::{alert, evidence, event, raw_item, time}
// ============================================================================

//! ## Overview
//! The evidence builder runs strictly after correlation (C7): it needs the
//! alert's final id, correlation key, and diagnostics before it can snapshot
//! anything. It performs no I/O itself; writing the resulting artifact to
//! durable storage is the caller's job via [`crate::interfaces::ArtifactSink`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::alert::Alert;
use crate::core::alert::CorrelationAction;
use crate::core::alert::EvidenceCorrelation;
use crate::core::alert::EvidenceSource;
use crate::core::evidence::IncidentEvidenceArtifact;
use crate::core::hashing::HashError;
use crate::core::raw_item::RawItem;
use crate::core::time::DeterminismContext;
use crate::core::time::DeterminismMode;
use crate::core::time::Timestamp;
use crate::core::event::Event;

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Inputs the evidence builder needs to assemble one artifact.
#[derive(Debug, Clone)]
pub struct EvidenceInputs<'a> {
    /// The alert this correlation produced or updated.
    pub alert: &'a Alert,
    /// The event that triggered this correlation.
    pub event: &'a Event,
    /// The raw item the event was canonicalized from.
    pub raw_item: &'a RawItem,
    /// Whether this correlation created or updated the alert.
    pub correlation_action: CorrelationAction,
    /// Reasons the correlation engine recorded for this update.
    pub merge_reasons: Vec<String>,
    /// Wall time (per the active clock) this artifact is produced at.
    pub produced_at: Timestamp,
    /// Determinism mode active for this ingest run.
    pub determinism_mode: DeterminismMode,
    /// Pinned determinism context; `Some` only when `determinism_mode` is
    /// [`DeterminismMode::Pinned`].
    pub determinism: Option<DeterminismContext>,
}

fn merge_summary(alert: &Alert, action: CorrelationAction) -> String {
    match action {
        CorrelationAction::Created => {
            format!("Created alert {} under correlation key {}", alert.alert_id, alert.correlation_key)
        }
        CorrelationAction::Updated => format!(
            "Updated alert {} (update #{}) under correlation key {}",
            alert.alert_id, alert.update_count, alert.correlation_key
        ),
    }
}

// ============================================================================
// SECTION: Build
// ============================================================================

/// Assembles the deterministic evidence artifact for one correlation (C8).
///
/// # Errors
///
/// Returns [`HashError`] when the artifact's fields cannot be canonicalized.
pub fn build_evidence(inputs: EvidenceInputs<'_>) -> Result<IncidentEvidenceArtifact, HashError> {
    let source = EvidenceSource {
        id: inputs.event.source_id.clone(),
        tier: inputs.event.tier,
        raw_id: inputs.event.raw_id.clone(),
        url: inputs.raw_item.url.clone(),
        trust_tier: inputs.event.trust_tier,
    };
    let correlation = EvidenceCorrelation {
        key: inputs.alert.correlation_key.clone(),
        action: inputs.correlation_action,
        alert_id: inputs.alert.alert_id.clone(),
    };
    let summary = merge_summary(inputs.alert, inputs.correlation_action);

    IncidentEvidenceArtifact::build(
        inputs.alert.alert_id.clone(),
        inputs.event.event_id.clone(),
        source,
        correlation,
        inputs.alert.diagnostics.clone(),
        summary,
        inputs.merge_reasons,
        inputs.produced_at,
        inputs.determinism_mode,
        inputs.determinism,
    )
}

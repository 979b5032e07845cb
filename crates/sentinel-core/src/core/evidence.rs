// crates/sentinel-core/src/core/evidence.rs
// ============================================================================
// Module: Sentinel Incident Evidence
// Description: Deterministic per-alert-update evidence artifact (C9).
// Purpose: Give every alert correlation a reproducible, content-hashed record.
// Dependencies: serde, serde_json, crate::core::{alert, event, hashing, identifiers, time}
// ============================================================================

//! ## Overview
//! Every time an event correlates into an alert, the evidence builder (C8)
//! assembles an [`IncidentEvidenceArtifact`]: a snapshot of the inputs, the
//! diagnostics that were computed, and the correlation outcome, all wrapped
//! in the same canonical-hash envelope used elsewhere in the crate (C9).
//! The filename is derived, never chosen, so replays land on the same path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::alert::Diagnostics;
use crate::core::alert::EvidenceCorrelation;
use crate::core::alert::EvidenceSource;
use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::AlertId;
use crate::core::identifiers::EventId;
use crate::core::time::DeterminismContext;
use crate::core::time::DeterminismMode;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Incident Evidence Artifact
// ============================================================================

/// A deterministic, content-hashed record of one alert correlation.
///
/// # Invariants
/// - `content_hash` is computed over every field except itself and is
///   stable for equal inputs regardless of field-insertion order.
/// - `filename` is derived solely from `alert_id`, `event_id`, and
///   `correlation.key`; it is never chosen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentEvidenceArtifact {
    /// Alert this artifact was produced for.
    pub alert_id: AlertId,
    /// Event that triggered this artifact.
    pub event_id: EventId,
    /// Snapshot of the triggering event's source metadata.
    pub source: EvidenceSource,
    /// Correlation outcome for this ingest.
    pub correlation: EvidenceCorrelation,
    /// Computed diagnostics for the triggering event.
    pub diagnostics: Diagnostics,
    /// One-line human summary describing why the alert changed.
    pub merge_summary: String,
    /// Ordered list of reasons the scope or classification changed.
    pub merge_reasons: Vec<String>,
    /// Wall time this artifact was produced, per the active [`crate::core::time::Clock`].
    pub produced_at: Timestamp,
    /// Which determinism mode produced this artifact.
    pub determinism_mode: DeterminismMode,
    /// Pinned determinism context (seed, pinned timestamp, run id); present
    /// only when `determinism_mode` is [`DeterminismMode::Pinned`].
    pub determinism: Option<DeterminismContext>,
    /// Content hash of this artifact, computed over every other field.
    pub content_hash: HashDigest,
}

/// Stable projection hashed to produce [`IncidentEvidenceArtifact::content_hash`].
#[derive(Debug, Clone, Serialize)]
struct EvidenceHashProjection<'a> {
    alert_id: &'a AlertId,
    event_id: &'a EventId,
    source: &'a EvidenceSource,
    correlation: &'a EvidenceCorrelation,
    diagnostics: &'a Diagnostics,
    merge_summary: &'a str,
    merge_reasons: &'a [String],
    produced_at: i64,
    determinism_mode: DeterminismMode,
    determinism: &'a Option<DeterminismContext>,
}

impl IncidentEvidenceArtifact {
    /// Assembles an artifact and fills in its `content_hash`.
    ///
    /// `determinism` must be `Some` when `determinism_mode` is
    /// [`DeterminismMode::Pinned`] and `None` in live mode.
    ///
    /// # Errors
    ///
    /// Returns an error when any field cannot be canonicalized.
    #[allow(clippy::too_many_arguments, reason = "each argument is a distinct snapshot field the artifact must carry verbatim")]
    pub fn build(
        alert_id: AlertId,
        event_id: EventId,
        source: EvidenceSource,
        correlation: EvidenceCorrelation,
        diagnostics: Diagnostics,
        merge_summary: String,
        merge_reasons: Vec<String>,
        produced_at: Timestamp,
        determinism_mode: DeterminismMode,
        determinism: Option<DeterminismContext>,
    ) -> Result<Self, HashError> {
        let projection = EvidenceHashProjection {
            alert_id: &alert_id,
            event_id: &event_id,
            source: &source,
            correlation: &correlation,
            diagnostics: &diagnostics,
            merge_summary: &merge_summary,
            merge_reasons: &merge_reasons,
            produced_at: produced_at.unix_millis(),
            determinism_mode,
            determinism: &determinism,
        };
        let content_hash = hash_canonical_json(HashAlgorithm::Sha256, &projection)?;
        Ok(Self {
            alert_id,
            event_id,
            source,
            correlation,
            diagnostics,
            merge_summary,
            merge_reasons,
            produced_at,
            determinism_mode,
            determinism,
            content_hash,
        })
    }

    /// Derives this artifact's filename from its identity fields.
    ///
    /// Any `/` in the correlation key (which may embed facility ids) is
    /// replaced with `_` so the result is always a single path segment.
    #[must_use]
    pub fn filename(&self) -> String {
        let safe_key = self.correlation.key.replace('/', "_").replace('|', "_");
        format!("{}__{}__{}.json", self.alert_id, self.event_id, safe_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alert::CorrelationAction;
    use crate::core::alert::QualityPolicy;
    use crate::core::alert::QualityValidation;
    use crate::core::identifiers::RawItemId;
    use crate::core::identifiers::SourceId;
    use crate::core::raw_item::Tier;

    fn sample_diagnostics() -> Diagnostics {
        Diagnostics {
            link_confidence_facility: 1.0,
            link_confidence_lanes: 0.5,
            link_confidence_shipments: 0.25,
            link_provenance_facility: "PROVIDED".into(),
            shipments_total_linked: 3,
            shipments_truncated: false,
            impact_score: 7,
            impact_score_breakdown: vec!["R1".into(), "R3".into()],
            impact_score_rationale: "R1, R3".into(),
            quality_validation: QualityValidation {
                max_allowed_classification: 2,
                high_impact_factors_count: 2,
                facility_confidence: 1.0,
                facility_provenance: "PROVIDED".into(),
                applied_policy: QualityPolicy::B,
            },
        }
    }

    #[test]
    fn content_hash_is_stable_for_equal_inputs() {
        let determinism = DeterminismContext {
            seed: 1,
            timestamp_utc: Timestamp::from_unix_millis(0),
            run_id: "run-1".into(),
        };
        let build = || {
            IncidentEvidenceArtifact::build(
                AlertId::new("ALERT-1"),
                EventId::new("EVT-1"),
                EvidenceSource {
                    id: SourceId::new("SRC-1"),
                    tier: Tier::Regional,
                    raw_id: RawItemId::new("RAW-1"),
                    url: None,
                    trust_tier: 2,
                },
                EvidenceCorrelation {
                    key: "WEATHER|PLANT-01".into(),
                    action: CorrelationAction::Created,
                    alert_id: AlertId::new("ALERT-1"),
                },
                sample_diagnostics(),
                "Created new alert".into(),
                vec!["initial correlation".into()],
                Timestamp::from_unix_millis(0),
                DeterminismMode::Pinned,
                Some(determinism.clone()),
            )
            .expect("buildable artifact")
        };
        assert_eq!(build().content_hash, build().content_hash);
        assert_eq!(determinism.seed, 1);
    }

    #[test]
    fn live_mode_artifact_carries_no_pinned_context() {
        let artifact = IncidentEvidenceArtifact::build(
            AlertId::new("ALERT-1"),
            EventId::new("EVT-1"),
            EvidenceSource {
                id: SourceId::new("SRC-1"),
                tier: Tier::Regional,
                raw_id: RawItemId::new("RAW-1"),
                url: None,
                trust_tier: 2,
            },
            EvidenceCorrelation {
                key: "WEATHER|PLANT-01".into(),
                action: CorrelationAction::Created,
                alert_id: AlertId::new("ALERT-1"),
            },
            sample_diagnostics(),
            "Created new alert".into(),
            vec!["initial correlation".into()],
            Timestamp::from_unix_millis(0),
            DeterminismMode::Live,
            None,
        )
        .expect("buildable artifact");
        assert_eq!(artifact.determinism_mode, DeterminismMode::Live);
        assert!(artifact.determinism.is_none());
    }

    #[test]
    fn filename_replaces_key_separators() {
        let determinism = DeterminismContext {
            seed: 1,
            timestamp_utc: Timestamp::from_unix_millis(0),
            run_id: "run-1".into(),
        };
        let artifact = IncidentEvidenceArtifact::build(
            AlertId::new("ALERT-1"),
            EventId::new("EVT-1"),
            EvidenceSource {
                id: SourceId::new("SRC-1"),
                tier: Tier::Local,
                raw_id: RawItemId::new("RAW-1"),
                url: None,
                trust_tier: 1,
            },
            EvidenceCorrelation {
                key: "WEATHER|PLANT-01".into(),
                action: CorrelationAction::Updated,
                alert_id: AlertId::new("ALERT-1"),
            },
            sample_diagnostics(),
            "Updated alert".into(),
            vec![],
            Timestamp::from_unix_millis(0),
            DeterminismMode::Pinned,
            Some(determinism),
        )
        .expect("buildable artifact");
        assert_eq!(artifact.filename(), "ALERT-1__EVT-1__WEATHER_PLANT-01.json");
    }
}

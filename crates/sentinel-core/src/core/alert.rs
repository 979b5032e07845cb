// crates/sentinel-core/src/core/alert.rs
// ============================================================================
// Module: Sentinel Alert Model
// Description: Persistent, correlated incident record and its diagnostics.
// Purpose: Hold everything C7/C8 produce and the store persists per alert.
// Dependencies: serde, crate::core::{identifiers, time}
// ============================================================================

//! ## Overview
//! An [`Alert`] is the unit of operator-facing output. Its `scope` grows
//! monotonically as events correlate into it; its `diagnostics` are
//! non-decisional evidence the quality validator and scorer produced along
//! the way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AlertId;
use crate::core::identifiers::EventId;
use crate::core::identifiers::FacilityId;
use crate::core::identifiers::LaneId;
use crate::core::identifiers::RawItemId;
use crate::core::identifiers::ShipmentId;
use crate::core::identifiers::SourceId;
use crate::core::raw_item::Tier;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Classification / Status
// ============================================================================

/// Alert severity, bounded by the quality validator (C6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Classification {
    /// Low severity, informational.
    Interesting = 0,
    /// Medium severity.
    Relevant = 1,
    /// High severity.
    Impactful = 2,
}

impl Classification {
    /// Converts a raw integer class (already clamped to 0-2) to this enum.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Interesting,
            1 => Self::Relevant,
            _ => Self::Impactful,
        }
    }

    /// Returns the numeric classification value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Alert lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    /// Newly created, unresolved.
    Open,
    /// Re-correlated with a new event since creation.
    Updated,
    /// Operator-closed.
    Closed,
}

impl AlertStatus {
    /// Renders the status as its uppercase wire/display form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Updated => "UPDATED",
            Self::Closed => "CLOSED",
        }
    }
}

/// Outcome of the most recent correlation attempt against this alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CorrelationAction {
    /// No existing alert matched; a new row was inserted.
    Created,
    /// An existing alert matched and was merged/updated.
    Updated,
}

// ============================================================================
// SECTION: Scope
// ============================================================================

/// The accumulated network scope of an alert.
///
/// # Invariants
/// - Grows monotonically: every field is a superset of its prior value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertScope {
    /// Facilities linked across every correlated event, in first-seen order.
    pub facilities: Vec<FacilityId>,
    /// Lanes linked across every correlated event, in first-seen order.
    pub lanes: Vec<LaneId>,
    /// Shipments linked across every correlated event, in first-seen order.
    pub shipments: Vec<ShipmentId>,
    /// Maximum observed count of shipments linked by any single event.
    pub shipments_total_linked: usize,
    /// Set when any correlated event hit the shipment cap (§4.3).
    pub shipments_truncated: bool,
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// Applied quality-cap policy variant (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityPolicy {
    /// Policy A: the source floor is authoritative and can exceed the cap.
    A,
    /// Policy B: the quality cap is authoritative; recommended default.
    B,
}

impl QualityPolicy {
    /// Returns the wire-format single-letter label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

/// Quality-validation metadata recorded alongside the impact diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityValidation {
    /// Maximum classification evidence quality justified.
    pub max_allowed_classification: u8,
    /// Count of high-impact factors observed (0-4).
    pub high_impact_factors_count: u8,
    /// Facility link confidence used by the decision ladder.
    pub facility_confidence: f64,
    /// Facility provenance tag used by the decision ladder.
    pub facility_provenance: String,
    /// Which policy (A/B) was applied when composing with the source floor.
    pub applied_policy: QualityPolicy,
}

/// Non-decisional diagnostics assembled by the evidence builder (C8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Facility link confidence.
    pub link_confidence_facility: f64,
    /// Lane link confidence.
    pub link_confidence_lanes: f64,
    /// Shipment link confidence.
    pub link_confidence_shipments: f64,
    /// Facility link provenance tag.
    pub link_provenance_facility: String,
    /// Total shipments matched before the cap.
    pub shipments_total_linked: usize,
    /// Whether the shipment cap truncated the match set.
    pub shipments_truncated: bool,
    /// Impact score, 0-10.
    pub impact_score: i32,
    /// Firing rules, in rule order.
    pub impact_score_breakdown: Vec<String>,
    /// Short joined-breakdown rationale string.
    pub impact_score_rationale: String,
    /// Quality-validation metadata.
    pub quality_validation: QualityValidation,
}

/// Correlation metadata recorded on the alert's evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceCorrelation {
    /// Correlation key this event matched against.
    pub key: String,
    /// Whether this ingest created or updated the alert.
    pub action: CorrelationAction,
    /// Id of the alert this correlation resolved to.
    pub alert_id: AlertId,
}

/// Source metadata recorded on the alert's evidence, when a source id exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSource {
    /// Source identifier.
    pub id: SourceId,
    /// Source tier.
    pub tier: Tier,
    /// Originating raw item id.
    pub raw_id: RawItemId,
    /// Source URL, when known.
    pub url: Option<String>,
    /// Source trust tier.
    pub trust_tier: u8,
}

// ============================================================================
// SECTION: Recommended Actions / Impact Assessment
// ============================================================================

/// A recommended operator follow-up action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertAction {
    /// Stable action identifier, e.g. `"ACT-VERIFY"`.
    pub id: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Role expected to own the action.
    pub owner_role: String,
    /// Recommended completion window, in hours.
    pub due_within_hours: u32,
}

/// Qualitative impact notes carried alongside the numeric impact score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertImpactAssessment {
    /// Free-text qualitative impact snippets (raw text, truncated).
    pub qualitative_impact: Vec<String>,
}

// ============================================================================
// SECTION: Alert
// ============================================================================

/// A correlated, persistent incident record.
///
/// # Invariants
/// - `first_seen` never changes after creation.
/// - `last_seen` is non-decreasing.
/// - `update_count` increments exactly once per correlated ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Stable alert identifier, preserved across updates.
    pub alert_id: AlertId,
    /// Risk type label (usually the event type).
    pub risk_type: String,
    /// Current classification, 0-2.
    pub classification: Classification,
    /// Alert lifecycle status.
    pub status: AlertStatus,
    /// Human-readable summary.
    pub summary: String,
    /// Id of the most recent correlated event.
    pub root_event_id: EventId,
    /// Correlation key this alert was filed under.
    pub correlation_key: String,
    /// Accumulated network scope.
    pub scope: AlertScope,
    /// Qualitative impact assessment.
    pub impact_assessment: AlertImpactAssessment,
    /// Recommended operator actions.
    pub recommended_actions: Vec<AlertAction>,
    /// Human-readable reasoning trail for the current classification.
    pub reasoning: Vec<String>,
    /// Impact score from the most recent correlated event.
    pub impact_score: i32,
    /// Diagnostics from the most recent correlated event.
    pub diagnostics: Diagnostics,
    /// First time any event correlated into this alert.
    pub first_seen: Timestamp,
    /// Most recent time an event correlated into this alert.
    pub last_seen: Timestamp,
    /// Number of times an event has correlated into this alert.
    pub update_count: u32,
    /// Tier of the most recently correlated event's source.
    pub tier: Tier,
    /// Source id of the most recently correlated event.
    pub source_id: Option<SourceId>,
    /// Trust tier of the most recently correlated event's source.
    pub trust_tier: u8,
    /// Correlation outcome of the most recent ingest.
    pub correlation_action: CorrelationAction,
    /// Path (relative to the evidence directory) of the latest incident artifact.
    pub incident_evidence_path: String,
    /// Content hash of the latest incident artifact.
    pub incident_evidence_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_round_trips_through_u8() {
        for raw in 0u8..=2 {
            assert_eq!(Classification::from_u8(raw).as_u8(), raw);
        }
    }

    #[test]
    fn classification_caps_at_impactful() {
        assert_eq!(Classification::from_u8(9), Classification::Impactful);
    }
}

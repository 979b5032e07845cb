// crates/sentinel-core/src/correlation.rs
// ============================================================================
// Module: Sentinel Correlation Engine (C7)
// Description: Upsert a linked, scored, quality-capped event into an alert.
// Purpose: Build the correlation key, merge scope monotonically, and persist.
// Dependencies: crate::core::{alert, event, identifiers, idgen, time}, crate::interfaces
// ============================================================================

//! ## Overview
//! Correlation keys are `{risk_bucket}|{first_facility_or_NONE}|{first_lane_or_NONE}`
//! (§4.6); `first_facility`/`first_lane` are the lexicographically smallest
//! linked id, which is exactly what iterating the event's sorted `BTreeSet`
//! yields. An unmatched key creates a new alert; a match merges scope and
//! refreshes the classification, summary, and diagnostics in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::alert::Alert;
use crate::core::alert::AlertAction;
use crate::core::alert::AlertImpactAssessment;
use crate::core::alert::AlertScope;
use crate::core::alert::AlertStatus;
use crate::core::alert::Classification;
use crate::core::alert::CorrelationAction;
use crate::core::alert::Diagnostics;
use crate::core::event::Event;
use crate::core::event::EventType;
use crate::core::identifiers::AlertId;
use crate::core::identifiers::FacilityId;
use crate::core::identifiers::LaneId;
use crate::core::identifiers::ShipmentId;
use crate::core::idgen::IdGenerator;
use crate::core::time::Clock;
use crate::core::time::Timestamp;
use crate::errors::StoreError;
use crate::interfaces::AlertStore;

/// Correlation lookback window, in days (§4.6).
pub const CORRELATION_WINDOW_DAYS: i64 = 7;

// ============================================================================
// SECTION: Correlation Key
// ============================================================================

fn risk_bucket(event: &Event) -> String {
    if event.event_type != EventType::Other {
        return event.event_type.as_str().to_string();
    }
    let text = event.uppercased_text();
    if text.contains("SPILL") || text.contains("LEAK") {
        "SPILL".to_string()
    } else if text.contains("STRIKE") || text.contains("WALKOUT") {
        "STRIKE".to_string()
    } else if text.contains("CLOSURE") || text.contains("CLOSED") || text.contains("SHUTDOWN") {
        "CLOSURE".to_string()
    } else {
        "GENERAL".to_string()
    }
}

/// Builds the correlation key for an event (§4.6).
///
/// `first_facility`/`first_lane` are each the lexicographically smallest
/// linked id, or the literal `"NONE"` when nothing was linked.
#[must_use]
pub fn build_correlation_key(event: &Event) -> String {
    let bucket = risk_bucket(event);
    let first_facility = event.facilities.iter().next().map_or_else(|| "NONE".to_string(), FacilityId::to_string);
    let first_lane = event.lanes.iter().next().map_or_else(|| "NONE".to_string(), LaneId::to_string);
    format!("{bucket}|{first_facility}|{first_lane}")
}

// ============================================================================
// SECTION: Scope Merge
// ============================================================================

fn union_preserve_order<T: Clone + PartialEq>(existing: &[T], incoming: impl Iterator<Item = T>) -> (Vec<T>, bool) {
    let mut out = existing.to_vec();
    let mut grew = false;
    for item in incoming {
        if !out.contains(&item) {
            out.push(item);
            grew = true;
        }
    }
    (out, grew)
}

fn merge_scope(existing: &AlertScope, event: &Event, reasons: &mut Vec<String>) -> AlertScope {
    let (facilities, facilities_grew) = union_preserve_order(&existing.facilities, event.facilities.iter().cloned());
    let (lanes, lanes_grew) = union_preserve_order(&existing.lanes, event.lanes.iter().cloned());
    let (shipments, shipments_grew) = union_preserve_order(&existing.shipments, event.shipments.iter().cloned());
    if facilities_grew || lanes_grew || shipments_grew {
        reasons.push("scope expanded with newly linked network entities".to_string());
    }
    AlertScope {
        facilities,
        lanes,
        shipments,
        shipments_total_linked: existing.shipments_total_linked.max(event.shipments_total_linked),
        shipments_truncated: existing.shipments_truncated || event.shipments_truncated,
    }
}

// ============================================================================
// SECTION: Alert Assembly Helpers
// ============================================================================

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

fn summarize(event: &Event) -> String {
    let snippet = truncate_chars(event.title.trim(), 140);
    if snippet.is_empty() {
        format!("{} event", event.event_type.as_str())
    } else {
        format!("{}: {snippet}", event.event_type.as_str())
    }
}

fn build_impact_assessment(event: &Event) -> AlertImpactAssessment {
    let snippet = truncate_chars(event.raw_text.trim(), 280);
    AlertImpactAssessment {
        qualitative_impact: if snippet.is_empty() { Vec::new() } else { vec![snippet] },
    }
}

fn default_actions(classification: Classification) -> Vec<AlertAction> {
    let mut actions = vec![AlertAction {
        id: "ACT-VERIFY".to_string(),
        description: "Verify event details with the responsible operator".to_string(),
        owner_role: "operations-analyst".to_string(),
        due_within_hours: 24,
    }];
    if classification == Classification::Impactful {
        actions.push(AlertAction {
            id: "ACT-ESCALATE".to_string(),
            description: "Escalate to the supply-chain risk lead for immediate review".to_string(),
            owner_role: "risk-lead".to_string(),
            due_within_hours: 4,
        });
    }
    actions
}

// ============================================================================
// SECTION: Correlation Outcome
// ============================================================================

/// Result of correlating an event against the alert store.
#[derive(Debug, Clone)]
pub struct CorrelationOutcome {
    /// The created or updated alert, as persisted.
    pub alert: Alert,
    /// Whether this correlation created a new alert or updated an existing one.
    pub action: CorrelationAction,
    /// Ordered reasons describing what changed during this correlation.
    pub merge_reasons: Vec<String>,
}

// ============================================================================
// SECTION: Correlate
// ============================================================================

/// Correlates a linked, scored, quality-capped event into an alert (C7).
///
/// Looks up an existing alert under the event's correlation key within
/// [`CORRELATION_WINDOW_DAYS`]; creates one if none matched, or merges scope
/// and refreshes classification/diagnostics in place otherwise. Persists the
/// result via `store` before returning.
///
/// # Errors
///
/// Returns [`StoreError`] when the backend lookup or write fails.
#[allow(clippy::too_many_arguments, reason = "correlation needs every scored/classified field from the caller; bundling them would just move the sprawl into a struct")]
pub fn correlate(
    event: &Event,
    classification: Classification,
    impact_score: i32,
    diagnostics: Diagnostics,
    reasoning: Vec<String>,
    store: &dyn AlertStore,
    clock: &dyn Clock,
    id_generator: &mut dyn IdGenerator,
    observed_at: Timestamp,
) -> Result<CorrelationOutcome, StoreError> {
    let key = build_correlation_key(event);
    let now = clock.now();

    match store.find_recent_alert_by_key(&key, CORRELATION_WINDOW_DAYS, now)? {
        None => {
            let alert_id = AlertId::new(id_generator.generate("ALERT", &now.to_yyyymmdd()));
            let merge_reasons = vec![format!("created new alert under correlation key {key}")];
            let alert = Alert {
                alert_id,
                risk_type: event.event_type.as_str().to_string(),
                classification,
                status: AlertStatus::Open,
                summary: summarize(event),
                root_event_id: event.event_id.clone(),
                correlation_key: key,
                scope: AlertScope {
                    facilities: event.facilities.iter().cloned().collect(),
                    lanes: event.lanes.iter().cloned().collect(),
                    shipments: event.shipments.iter().cloned().collect(),
                    shipments_total_linked: event.shipments_total_linked,
                    shipments_truncated: event.shipments_truncated,
                },
                impact_assessment: build_impact_assessment(event),
                recommended_actions: default_actions(classification),
                reasoning,
                impact_score,
                diagnostics,
                first_seen: observed_at,
                last_seen: observed_at,
                update_count: 1,
                tier: event.tier,
                source_id: Some(event.source_id.clone()),
                trust_tier: event.trust_tier,
                correlation_action: CorrelationAction::Created,
                incident_evidence_path: String::new(),
                incident_evidence_hash: String::new(),
            };
            store.insert_alert(&alert)?;
            Ok(CorrelationOutcome {
                alert,
                action: CorrelationAction::Created,
                merge_reasons,
            })
        }
        Some(mut existing) => {
            let mut merge_reasons = Vec::new();
            existing.scope = merge_scope(&existing.scope, event, &mut merge_reasons);
            existing.summary = summarize(event);
            existing.classification = classification;
            existing.root_event_id = event.event_id.clone();
            existing.impact_assessment = build_impact_assessment(event);
            existing.recommended_actions = default_actions(classification);
            existing.reasoning = reasoning;
            existing.impact_score = impact_score;
            existing.diagnostics = diagnostics;
            existing.tier = event.tier;
            existing.source_id = Some(event.source_id.clone());
            existing.trust_tier = event.trust_tier;
            existing.last_seen = observed_at;
            existing.update_count += 1;
            existing.status = AlertStatus::Updated;
            existing.correlation_action = CorrelationAction::Updated;
            merge_reasons.push(format!("merged into existing alert {}", existing.alert_id));
            store.update_alert(&existing)?;
            Ok(CorrelationOutcome {
                alert: existing,
                action: CorrelationAction::Updated,
                merge_reasons,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::FacilityProvenance;
    use crate::core::event::LinkConfidence;
    use crate::core::identifiers::EventId;
    use crate::core::identifiers::RawItemId;
    use crate::core::identifiers::SourceId;
    use crate::core::raw_item::Tier;
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    fn sample_event(facility: Option<&str>) -> Event {
        let mut facilities = BTreeSet::new();
        if let Some(id) = facility {
            facilities.insert(FacilityId::new(id));
        }
        Event {
            event_id: EventId::new("EVT-1"),
            source_id: SourceId::new("SRC-1"),
            raw_id: RawItemId::new("RAW-1"),
            tier: Tier::Regional,
            trust_tier: 2,
            classification_floor: 0,
            weighting_bias: 0,
            event_type: EventType::Spill,
            title: "Chemical spill at PLANT-01".into(),
            raw_text: "A chemical spill was reported at PLANT-01 overnight.".into(),
            location_hint: None,
            facilities,
            lanes: BTreeSet::new(),
            shipments: BTreeSet::new(),
            link_confidence: LinkConfidence::default(),
            link_provenance: FacilityProvenance::FacilityIdExact,
            linking_notes: Vec::new(),
            shipments_total_linked: 0,
            shipments_truncated: false,
            extensions: BTreeMap::new(),
        }
    }

    #[test]
    fn correlation_key_uses_lexicographically_smallest_facility() {
        let mut event = sample_event(None);
        event.facilities.insert(FacilityId::new("PLANT-02"));
        event.facilities.insert(FacilityId::new("PLANT-01"));
        assert_eq!(build_correlation_key(&event), "SPILL|PLANT-01|NONE");
    }

    #[test]
    fn correlation_key_uses_none_when_nothing_linked() {
        let event = sample_event(None);
        assert_eq!(build_correlation_key(&event), "SPILL|NONE|NONE");
    }

    #[test]
    fn correlation_key_falls_back_to_keyword_inference_for_other_type() {
        let mut event = sample_event(Some("PLANT-01"));
        event.event_type = EventType::Other;
        event.title = "Unplanned shutdown reported".into();
        event.raw_text = String::new();
        assert_eq!(build_correlation_key(&event), "CLOSURE|PLANT-01|NONE");
    }

    #[test]
    fn merge_scope_preserves_first_seen_order_and_dedupes() {
        let existing = AlertScope {
            facilities: vec![FacilityId::new("PLANT-01")],
            lanes: vec![],
            shipments: vec![],
            shipments_total_linked: 1,
            shipments_truncated: false,
        };
        let mut event = sample_event(Some("PLANT-01"));
        event.facilities.insert(FacilityId::new("PLANT-02"));
        let mut reasons = Vec::new();
        let merged = merge_scope(&existing, &event, &mut reasons);
        assert_eq!(
            merged.facilities,
            vec![FacilityId::new("PLANT-01"), FacilityId::new("PLANT-02")]
        );
        assert!(!reasons.is_empty());
    }
}

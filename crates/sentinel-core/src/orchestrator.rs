// crates/sentinel-core/src/orchestrator.rs
// ============================================================================
// Module: Sentinel Pipeline Orchestrator (C10)
// Description: Drive one ingest batch end-to-end (C3 -> C4 -> C5 -> C6 -> C7 -> C8).
// Purpose: Isolate per-item failures; enforce the active determinism mode.
// Dependencies: thiserror, crate::{canonicalize, correlation, errors, evidence_builder,
//                interfaces, linker, quality, scorer}, crate::core::*
// ============================================================================

//! ## Overview
//! The orchestrator is the only place that sequences the full pipeline. It
//! pulls eligible raw items from the [`crate::interfaces::RawItemStore`], runs
//! each one through canonicalization, linking, scoring, quality validation,
//! correlation, and evidence building, then records the outcome. A failure in
//! any single item is caught and isolated: the item is marked `FAILED` and
//! the batch continues (§4.8). Only a failure to fetch the batch itself, or a
//! determinism-mode mismatch, aborts the whole ingest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::canonicalize::CanonicalizeError;
use crate::canonicalize::SourceConfig;
use crate::canonicalize::canonicalize;
use crate::core::alert::Classification;
use crate::core::alert::Diagnostics;
use crate::core::alert::QualityValidation;
use crate::core::identifiers::AlertId;
use crate::core::identifiers::SourceId;
use crate::core::inventory::Inventory;
use crate::core::raw_item::RawItem;
use crate::core::raw_item::RawItemStatus;
use crate::core::raw_item::Tier;
use crate::core::time::Clock;
use crate::core::time::DeterminismContext;
use crate::core::time::DeterminismMode;
use crate::core::time::Timestamp;
use crate::core::idgen::IdGenerator;
use crate::correlation::correlate;
use crate::errors::DeterminismViolation;
use crate::errors::IngestError;
use crate::errors::StoreError;
use crate::evidence_builder::EvidenceInputs;
use crate::evidence_builder::build_evidence;
use crate::interfaces::AlertStore;
use crate::interfaces::ArtifactSink;
use crate::interfaces::EventStore;
use crate::interfaces::RawItemStore;
use crate::linker::LinkerConfig;
use crate::linker::link;
use crate::quality::QualityConfig;
use crate::quality::compose_classification;
use crate::quality::validate_quality;
use crate::scorer::classification_from_score;
use crate::scorer::score_impact;

// ============================================================================
// SECTION: Per-Item Error
// ============================================================================

/// Any failure that can occur while processing a single raw item.
///
/// Caught at the orchestrator's item boundary and converted into a `FAILED`
/// raw-item status; never propagated out of [`Orchestrator::ingest`].
#[derive(Debug, Error)]
enum ProcessError {
    #[error(transparent)]
    Canonicalize(#[from] CanonicalizeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hashing(#[from] crate::core::hashing::HashError),
}

// ============================================================================
// SECTION: Ingest Request / Report
// ============================================================================

/// Selects which staged raw items an ingest run should process.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    /// Maximum number of raw items to process this run.
    pub limit: usize,
    /// Only process items whose source tier admits this floor.
    pub min_tier: Option<Tier>,
    /// Restrict processing to a single configured source.
    pub source_id: Option<SourceId>,
    /// Only process items fetched within this many hours of now.
    pub since_hours: Option<i64>,
}

/// Summary counters for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Raw items pulled and attempted.
    pub processed: usize,
    /// Raw items successfully canonicalized into an event.
    pub events: usize,
    /// Distinct alerts created or updated during this run.
    pub alerts: usize,
    /// Raw items that failed and were marked `FAILED`.
    pub errors: usize,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives one ingest batch against the injected storage and domain seams.
pub struct Orchestrator<'a> {
    raw_item_store: &'a dyn RawItemStore,
    event_store: &'a dyn EventStore,
    alert_store: &'a dyn AlertStore,
    artifact_sink: &'a dyn ArtifactSink,
    inventory: &'a dyn Inventory,
    clock: &'a dyn Clock,
    source_configs: &'a BTreeMap<SourceId, SourceConfig>,
    linker_config: LinkerConfig,
    quality_config: QualityConfig,
    determinism: DeterminismContext,
    determinism_mode: DeterminismMode,
}

impl<'a> Orchestrator<'a> {
    /// Constructs an orchestrator for one ingest run.
    ///
    /// `determinism_mode` fixes the mode (`Pinned`/`Live`) this orchestrator
    /// expects from both `clock` and any [`IdGenerator`] passed to
    /// [`Orchestrator::ingest`]; a mismatch is a [`DeterminismViolation`].
    #[must_use]
    #[allow(clippy::too_many_arguments, reason = "each argument is a distinct storage/domain seam the orchestrator is wired with once at construction")]
    pub fn new(
        raw_item_store: &'a dyn RawItemStore,
        event_store: &'a dyn EventStore,
        alert_store: &'a dyn AlertStore,
        artifact_sink: &'a dyn ArtifactSink,
        inventory: &'a dyn Inventory,
        clock: &'a dyn Clock,
        source_configs: &'a BTreeMap<SourceId, SourceConfig>,
        linker_config: LinkerConfig,
        quality_config: QualityConfig,
        determinism: DeterminismContext,
        determinism_mode: DeterminismMode,
    ) -> Self {
        Self {
            raw_item_store,
            event_store,
            alert_store,
            artifact_sink,
            inventory,
            clock,
            source_configs,
            linker_config,
            quality_config,
            determinism,
            determinism_mode,
        }
    }

    /// Runs one ingest batch (C10).
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Store`] when fetching the batch fails, and
    /// [`IngestError::Determinism`] when the clock or id generator's mode
    /// does not match the orchestrator's configured determinism mode.
    pub fn ingest(&self, request: &IngestRequest, id_generator: &mut dyn IdGenerator) -> Result<IngestReport, IngestError> {
        if self.clock.mode() != self.determinism_mode {
            return Err(IngestError::Determinism(DeterminismViolation::WallClockRead));
        }
        if id_generator.mode() != self.determinism_mode {
            return Err(IngestError::Determinism(DeterminismViolation::UnseededIdGeneration));
        }

        let now = self.clock.now();
        let items = self
            .raw_item_store
            .get_raw_items_for_ingest(request.limit, request.min_tier, request.source_id.as_ref(), request.since_hours, now)
            .map_err(IngestError::Store)?;

        let mut report = IngestReport::default();
        let mut alerts_touched: BTreeSet<AlertId> = BTreeSet::new();

        for item in &items {
            report.processed += 1;
            match self.process_item(item, id_generator, now) {
                Ok(alert_id) => {
                    report.events += 1;
                    alerts_touched.insert(alert_id.clone());
                    tracing::info!(raw_id = %item.raw_id, alert_id = %alert_id, "raw item ingested");
                    self.raw_item_store
                        .mark_raw_item_status(&item.raw_id, RawItemStatus::Normalized, None)
                        .map_err(IngestError::Store)?;
                }
                Err(err) => {
                    report.errors += 1;
                    tracing::error!(raw_id = %item.raw_id, error = %err, "raw item failed to ingest");
                    self.raw_item_store
                        .mark_raw_item_status(&item.raw_id, RawItemStatus::Failed, Some(err.to_string()))
                        .map_err(IngestError::Store)?;
                }
            }
        }

        report.alerts = alerts_touched.len();
        Ok(report)
    }

    fn process_item(&self, item: &RawItem, id_generator: &mut dyn IdGenerator, now: Timestamp) -> Result<AlertId, ProcessError> {
        let source_config = self.source_configs.get(&item.source_id).cloned().unwrap_or_default();

        let (mut event, _event_hash) = canonicalize(item, &source_config, id_generator)?;
        link(&mut event, self.inventory, now, self.linker_config);
        if event.facilities.is_empty() {
            tracing::warn!(raw_id = %item.raw_id, event_id = %event.event_id, "no facility linked for event");
        }

        let score = score_impact(&event, self.inventory, now);
        let score_class = classification_from_score(score.impact_score);
        let quality = validate_quality(&event, &score, &self.quality_config);
        let (final_class, policy, mut reasoning) = compose_classification(
            score_class,
            &quality,
            event.classification_floor,
            self.quality_config.allow_quality_override_floor,
        );
        reasoning.extend(quality.reasoning.clone());

        let diagnostics = Diagnostics {
            link_confidence_facility: event.link_confidence.facility,
            link_confidence_lanes: event.link_confidence.lanes,
            link_confidence_shipments: event.link_confidence.shipments,
            link_provenance_facility: event.link_provenance.as_str().to_string(),
            shipments_total_linked: event.shipments_total_linked,
            shipments_truncated: event.shipments_truncated,
            impact_score: score.impact_score,
            impact_score_breakdown: score.breakdown.clone(),
            impact_score_rationale: score.rationale.clone(),
            quality_validation: QualityValidation {
                max_allowed_classification: quality.max_allowed_class,
                high_impact_factors_count: quality.high_impact_factors_count,
                facility_confidence: quality.facility_confidence,
                facility_provenance: quality.facility_provenance.clone(),
                applied_policy: policy,
            },
        };

        self.event_store.save_event(&event)?;

        let correlation_outcome = correlate(
            &event,
            Classification::from_u8(final_class),
            score.impact_score,
            diagnostics,
            reasoning,
            self.alert_store,
            self.clock,
            id_generator,
            item.fetched_at,
        )?;

        let artifact = build_evidence(EvidenceInputs {
            alert: &correlation_outcome.alert,
            event: &event,
            raw_item: item,
            correlation_action: correlation_outcome.action,
            merge_reasons: correlation_outcome.merge_reasons.clone(),
            produced_at: now,
            determinism_mode: self.determinism_mode,
            determinism: (self.determinism_mode == DeterminismMode::Pinned).then(|| DeterminismContext {
                seed: self.determinism.seed,
                timestamp_utc: now,
                run_id: self.determinism.run_id.clone(),
            }),
        })?;

        self.artifact_sink.write_artifact(&artifact)?;
        self.alert_store
            .record_evidence(&correlation_outcome.alert.alert_id, &artifact.filename(), &artifact.content_hash.value)?;

        Ok(correlation_outcome.alert.alert_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alert::Alert;
    use crate::core::evidence::IncidentEvidenceArtifact;
    use crate::core::event::Event;
    use crate::core::hashing::hash_bytes;
    use crate::core::hashing::HashAlgorithm;
    use crate::core::identifiers::EventId;
    use crate::core::identifiers::FacilityId;
    use crate::core::identifiers::LaneId;
    use crate::core::identifiers::RawItemId;
    use crate::core::identifiers::ShipmentId;
    use crate::core::inventory::Facility;
    use crate::core::inventory::Lane;
    use crate::core::inventory::Shipment;
    use crate::core::inventory::ShipmentStatus;
    use crate::core::time::PinnedClock;
    use crate::core::idgen::PinnedIdGenerator;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MemoryBackend {
        raw_items: RefCell<Vec<RawItem>>,
        events: RefCell<HashMap<String, Event>>,
        alerts: RefCell<HashMap<String, Alert>>,
        artifacts: RefCell<Vec<IncidentEvidenceArtifact>>,
        facility: Facility,
        lane: Lane,
        shipment: Shipment,
    }

    impl RawItemStore for MemoryBackend {
        fn get_raw_items_for_ingest(
            &self,
            limit: usize,
            _min_tier: Option<Tier>,
            _source_id: Option<&SourceId>,
            _since_hours: Option<i64>,
            _now: Timestamp,
        ) -> Result<Vec<RawItem>, StoreError> {
            Ok(self.raw_items.borrow().iter().take(limit).cloned().collect())
        }

        fn mark_raw_item_status(&self, raw_id: &RawItemId, status: RawItemStatus, error: Option<String>) -> Result<(), StoreError> {
            if let Some(item) = self.raw_items.borrow_mut().iter_mut().find(|i| &i.raw_id == raw_id) {
                item.status = status;
                item.error = error;
            }
            Ok(())
        }
    }

    impl EventStore for MemoryBackend {
        fn save_event(&self, event: &Event) -> Result<(), StoreError> {
            self.events.borrow_mut().insert(event.event_id.as_str().to_string(), event.clone());
            Ok(())
        }

        fn get_event(&self, event_id: &EventId) -> Result<Option<Event>, StoreError> {
            Ok(self.events.borrow().get(event_id.as_str()).cloned())
        }
    }

    impl AlertStore for MemoryBackend {
        fn find_recent_alert_by_key(&self, key: &str, _within_days: i64, _now: Timestamp) -> Result<Option<Alert>, StoreError> {
            Ok(self.alerts.borrow().values().find(|a| a.correlation_key == key).cloned())
        }

        fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError> {
            self.alerts.borrow_mut().insert(alert.alert_id.as_str().to_string(), alert.clone());
            Ok(())
        }

        fn update_alert(&self, alert: &Alert) -> Result<(), StoreError> {
            self.alerts.borrow_mut().insert(alert.alert_id.as_str().to_string(), alert.clone());
            Ok(())
        }

        fn record_evidence(&self, alert_id: &AlertId, path: &str, content_hash: &str) -> Result<(), StoreError> {
            if let Some(alert) = self.alerts.borrow_mut().get_mut(alert_id.as_str()) {
                alert.incident_evidence_path = path.to_string();
                alert.incident_evidence_hash = content_hash.to_string();
            }
            Ok(())
        }

        fn get_alert(&self, alert_id: &AlertId) -> Result<Option<Alert>, StoreError> {
            Ok(self.alerts.borrow().get(alert_id.as_str()).cloned())
        }

        fn list_recent_alerts(&self, _since_hours: i64, _now: Timestamp) -> Result<Vec<Alert>, StoreError> {
            Ok(self.alerts.borrow().values().cloned().collect())
        }
    }

    impl ArtifactSink for MemoryBackend {
        fn write_artifact(&self, artifact: &IncidentEvidenceArtifact) -> Result<(), StoreError> {
            self.artifacts.borrow_mut().push(artifact.clone());
            Ok(())
        }
    }

    impl Inventory for MemoryBackend {
        fn facilities_by_city_state(&self, _city: &str, _state_candidates: &[String]) -> Vec<Facility> {
            Vec::new()
        }

        fn facility_by_id(&self, facility_id: &FacilityId) -> Option<Facility> {
            (facility_id == &self.facility.facility_id).then(|| self.facility.clone())
        }

        fn lanes_touching_facility(&self, facility_id: &FacilityId) -> Vec<Lane> {
            if facility_id == &self.facility.facility_id {
                vec![self.lane.clone()]
            } else {
                Vec::new()
            }
        }

        fn shipments_on_lanes(&self, lane_ids: &[LaneId]) -> Vec<Shipment> {
            if lane_ids.contains(&self.lane.lane_id) {
                vec![self.shipment.clone()]
            } else {
                Vec::new()
            }
        }
    }

    fn backend_with_item() -> MemoryBackend {
        let facility_id = FacilityId::new("PLANT-01");
        let lane_id = LaneId::new("LANE-001");
        let shipment_id = ShipmentId::new("SHP-1");
        let payload = serde_json::json!({"body": "A chemical spill was reported at PLANT-01 overnight."});
        let raw_item = RawItem {
            raw_id: RawItemId::new("RAW-1"),
            source_id: SourceId::new("SRC-1"),
            tier: Tier::Regional,
            fetched_at: Timestamp::from_unix_millis(0),
            published_at: None,
            canonical_id: None,
            url: Some("https://example.test/item".into()),
            title: Some("Chemical spill at PLANT-01".into()),
            payload,
            content_hash: hash_bytes(HashAlgorithm::Sha256, b"seed"),
            status: RawItemStatus::New,
            error: None,
        };
        MemoryBackend {
            raw_items: RefCell::new(vec![raw_item]),
            events: RefCell::new(HashMap::new()),
            alerts: RefCell::new(HashMap::new()),
            artifacts: RefCell::new(Vec::new()),
            facility: Facility {
                facility_id: facility_id.clone(),
                city: "Houston".into(),
                state: "TX".into(),
                country: None,
                criticality: 9,
            },
            lane: Lane {
                lane_id: lane_id.clone(),
                origin_facility_id: facility_id.clone(),
                destination_facility_id: facility_id,
                volume: 8,
            },
            shipment: Shipment {
                shipment_id,
                lane_id,
                ship_date: None,
                eta_date: None,
                status: ShipmentStatus::InTransit,
                priority_flag: true,
            },
        }
    }

    #[test]
    fn ingest_processes_item_into_alert_and_artifact() {
        let backend = backend_with_item();
        let clock = PinnedClock::new(Timestamp::from_unix_millis(0));
        let source_configs = BTreeMap::new();
        let determinism = DeterminismContext {
            seed: 1,
            timestamp_utc: Timestamp::from_unix_millis(0),
            run_id: "run-1".into(),
        };
        let orchestrator = Orchestrator::new(
            &backend,
            &backend,
            &backend,
            &backend,
            &backend,
            &clock,
            &source_configs,
            LinkerConfig::default(),
            QualityConfig::default(),
            determinism,
            DeterminismMode::Pinned,
        );
        let mut id_generator = PinnedIdGenerator::new(7);
        let report = orchestrator
            .ingest(&IngestRequest::default(), &mut id_generator)
            .expect("ingest succeeds");

        assert_eq!(report.processed, 1);
        assert_eq!(report.events, 1);
        assert_eq!(report.errors, 0);
        assert_eq!(report.alerts, 1);
        assert_eq!(backend.alerts.borrow().len(), 1);
        assert_eq!(backend.artifacts.borrow().len(), 1);
        let alert = backend.alerts.borrow().values().next().cloned().expect("one alert");
        assert!(!alert.incident_evidence_path.is_empty());
        assert_eq!(backend.raw_items.borrow()[0].status, RawItemStatus::Normalized);
    }

    #[test]
    fn ingest_rejects_mismatched_determinism_mode() {
        let backend = backend_with_item();
        let clock = PinnedClock::new(Timestamp::from_unix_millis(0));
        let source_configs = BTreeMap::new();
        let determinism = DeterminismContext {
            seed: 1,
            timestamp_utc: Timestamp::from_unix_millis(0),
            run_id: "run-1".into(),
        };
        let orchestrator = Orchestrator::new(
            &backend,
            &backend,
            &backend,
            &backend,
            &backend,
            &clock,
            &source_configs,
            LinkerConfig::default(),
            QualityConfig::default(),
            determinism,
            DeterminismMode::Live,
        );
        let mut id_generator = PinnedIdGenerator::new(7);
        let result = orchestrator.ingest(&IngestRequest::default(), &mut id_generator);
        assert!(result.is_err());
    }
}

// crates/sentinel-core/src/interfaces.rs
// ============================================================================
// Module: Sentinel Storage Seams
// Description: Trait contracts the orchestrator (C10) drives persistence through.
// Purpose: Keep the core crate backend-agnostic; sentinel-store-sqlite and
//          test doubles both implement these.
// Dependencies: crate::core::{alert, evidence, identifiers, raw_item, time}, crate::errors
// ============================================================================

//! ## Overview
//! Four seams cover everything the orchestrator touches outside the pure
//! in-memory pipeline: staged raw items, canonicalized events, correlated
//! alerts, and the evidence artifacts C8 produces. None of these traits
//! assume SQLite; an in-memory test double satisfies them just as well.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::alert::Alert;
use crate::core::evidence::IncidentEvidenceArtifact;
use crate::core::event::Event;
use crate::core::identifiers::AlertId;
use crate::core::identifiers::EventId;
use crate::core::identifiers::RawItemId;
use crate::core::identifiers::SourceId;
use crate::core::raw_item::RawItem;
use crate::core::raw_item::RawItemStatus;
use crate::core::raw_item::Tier;
use crate::core::time::Timestamp;
use crate::errors::StoreError;

// ============================================================================
// SECTION: Raw Item Store
// ============================================================================

/// Persists and retrieves staged raw items (C1/C2).
pub trait RawItemStore {
    /// Returns raw items eligible for ingest, oldest `fetched_at` first.
    ///
    /// `min_tier` filters to tiers satisfying [`Tier::admits`]; `source_id`
    /// restricts to one configured source; `since_hours` bounds how far back
    /// `fetched_at` may be, relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    fn get_raw_items_for_ingest(
        &self,
        limit: usize,
        min_tier: Option<Tier>,
        source_id: Option<&SourceId>,
        since_hours: Option<i64>,
        now: Timestamp,
    ) -> Result<Vec<RawItem>, StoreError>;

    /// Transitions a raw item to a terminal (or re-enterable `New`) status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when `raw_id` does not exist, or
    /// [`StoreError::TerminalStatus`] when the item is already terminal and
    /// `status` is not a no-op re-application of the same status.
    fn mark_raw_item_status(
        &self,
        raw_id: &RawItemId,
        status: RawItemStatus,
        error: Option<String>,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Event Store
// ============================================================================

/// Persists canonicalized events (C3).
pub trait EventStore {
    /// Saves (or overwrites) a canonicalized event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    fn save_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Looks up a previously saved event by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    fn get_event(&self, event_id: &EventId) -> Result<Option<Event>, StoreError>;
}

// ============================================================================
// SECTION: Alert Store
// ============================================================================

/// Persists and correlates alerts (C7).
pub trait AlertStore {
    /// Finds the most recent alert filed under `key` within `within_days`
    /// of `now`, if any (§4.6 correlation window).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    fn find_recent_alert_by_key(
        &self,
        key: &str,
        within_days: i64,
        now: Timestamp,
    ) -> Result<Option<Alert>, StoreError>;

    /// Inserts a newly created alert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable or the
    /// alert id already exists.
    fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError>;

    /// Overwrites an existing alert after a correlation merge.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the alert does not exist.
    fn update_alert(&self, alert: &Alert) -> Result<(), StoreError>;

    /// Records the evidence artifact path and content hash for an alert,
    /// without touching any other field or incrementing `update_count`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the alert does not exist.
    fn record_evidence(&self, alert_id: &AlertId, path: &str, content_hash: &str) -> Result<(), StoreError>;

    /// Looks up a single alert by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    fn get_alert(&self, alert_id: &AlertId) -> Result<Option<Alert>, StoreError>;

    /// Lists alerts whose `last_seen` falls within `since_hours` of `now`,
    /// most recent first. Used by the daily brief renderer (A4).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend is unavailable.
    fn list_recent_alerts(&self, since_hours: i64, now: Timestamp) -> Result<Vec<Alert>, StoreError>;
}

// ============================================================================
// SECTION: Artifact Sink
// ============================================================================

/// Writes deterministic evidence artifacts (C9) to durable storage.
pub trait ArtifactSink {
    /// Writes `artifact` under its derived [`IncidentEvidenceArtifact::filename`].
    ///
    /// Implementations must be idempotent: writing the same artifact twice
    /// produces the same bytes at the same path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn write_artifact(&self, artifact: &IncidentEvidenceArtifact) -> Result<(), StoreError>;
}

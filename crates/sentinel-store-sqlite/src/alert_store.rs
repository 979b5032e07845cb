// crates/sentinel-store-sqlite/src/alert_store.rs
// ============================================================================
// Module: SQLite Alert Store
// Description: Implements AlertStore (C7 persistence) over a JSON blob column.
// Purpose: Correlate, upsert, and list alerts; record evidence artifact refs.
// Dependencies: rusqlite, serde_json, sentinel-core
// ============================================================================

//! ## Overview
//! Alerts persist as a canonical-JSON blob in `data`, alongside two indexed
//! columns (`correlation_key`, `last_seen_utc`) that mirror fields already on
//! the blob so correlation lookups (§4.6) and the daily brief window (A4)
//! don't require a full table scan. [`SqliteStore::record_evidence`] is the
//! one write path that touches only the evidence fields on the blob, never
//! `update_count` or `last_seen`, per the trait's documented contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use sentinel_core::core::alert::Alert;
use sentinel_core::core::identifiers::AlertId;
use sentinel_core::core::time::Timestamp;
use sentinel_core::errors::StoreError;
use sentinel_core::interfaces::AlertStore;

use crate::SqliteStore;
use crate::errors::SqliteStoreError;

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

fn row_to_alert(data: &[u8]) -> Result<Alert, SqliteStoreError> {
    serde_json::from_slice(data).map_err(SqliteStoreError::from)
}

// ============================================================================
// SECTION: AlertStore
// ============================================================================

impl AlertStore for SqliteStore {
    fn find_recent_alert_by_key(&self, key: &str, within_days: i64, now: Timestamp) -> Result<Option<Alert>, StoreError> {
        self.find_recent_alert_by_key_inner(key, within_days, now).map_err(StoreError::from)
    }

    fn insert_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.insert_alert_inner(alert).map_err(StoreError::from)
    }

    fn update_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        self.update_alert_inner(alert).map_err(StoreError::from)
    }

    fn record_evidence(&self, alert_id: &AlertId, path: &str, content_hash: &str) -> Result<(), StoreError> {
        self.record_evidence_inner(alert_id, path, content_hash).map_err(StoreError::from)
    }

    fn get_alert(&self, alert_id: &AlertId) -> Result<Option<Alert>, StoreError> {
        self.get_alert_inner(alert_id).map_err(StoreError::from)
    }

    fn list_recent_alerts(&self, since_hours: i64, now: Timestamp) -> Result<Vec<Alert>, StoreError> {
        self.list_recent_alerts_inner(since_hours, now).map_err(StoreError::from)
    }
}

impl SqliteStore {
    fn find_recent_alert_by_key_inner(&self, key: &str, within_days: i64, now: Timestamp) -> Result<Option<Alert>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let cutoff = now.plus_days(-within_days).unix_millis();
        let data: Option<Vec<u8>> = connection
            .query_row(
                "SELECT data FROM alerts
                 WHERE correlation_key = ?1 AND last_seen_utc >= ?2
                 ORDER BY last_seen_utc DESC LIMIT 1",
                params![key, cutoff],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|bytes| row_to_alert(&bytes)).transpose()
    }

    fn insert_alert_inner(&self, alert: &Alert) -> Result<(), SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let data = serde_json::to_vec(alert)?;
        connection.execute(
            "INSERT INTO alerts (alert_id, correlation_key, last_seen_utc, data) VALUES (?1, ?2, ?3, ?4)",
            params![alert.alert_id.as_str(), alert.correlation_key, alert.last_seen.unix_millis(), data],
        )?;
        Ok(())
    }

    fn update_alert_inner(&self, alert: &Alert) -> Result<(), SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let data = serde_json::to_vec(alert)?;
        let changed = connection.execute(
            "UPDATE alerts SET correlation_key = ?1, last_seen_utc = ?2, data = ?3 WHERE alert_id = ?4",
            params![alert.correlation_key, alert.last_seen.unix_millis(), data, alert.alert_id.as_str()],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::Invalid(format!("alert not found: {}", alert.alert_id)));
        }
        Ok(())
    }

    fn record_evidence_inner(&self, alert_id: &AlertId, path: &str, content_hash: &str) -> Result<(), SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let data: Option<Vec<u8>> =
            connection.query_row("SELECT data FROM alerts WHERE alert_id = ?1", params![alert_id.as_str()], |row| row.get(0)).optional()?;
        let Some(data) = data else {
            return Err(SqliteStoreError::Invalid(format!("alert not found: {alert_id}")));
        };
        let mut alert = row_to_alert(&data)?;
        alert.incident_evidence_path = path.to_string();
        alert.incident_evidence_hash = content_hash.to_string();
        let refreshed = serde_json::to_vec(&alert)?;
        connection.execute("UPDATE alerts SET data = ?1 WHERE alert_id = ?2", params![refreshed, alert_id.as_str()])?;
        Ok(())
    }

    fn get_alert_inner(&self, alert_id: &AlertId) -> Result<Option<Alert>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let data: Option<Vec<u8>> =
            connection.query_row("SELECT data FROM alerts WHERE alert_id = ?1", params![alert_id.as_str()], |row| row.get(0)).optional()?;
        data.map(|bytes| row_to_alert(&bytes)).transpose()
    }

    fn list_recent_alerts_inner(&self, since_hours: i64, now: Timestamp) -> Result<Vec<Alert>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let cutoff = now.plus_hours(-since_hours).unix_millis();
        let mut statement = connection.prepare(
            "SELECT data FROM alerts WHERE last_seen_utc >= ?1 ORDER BY last_seen_utc DESC",
        )?;
        let rows = statement.query_map(params![cutoff], |row| row.get::<_, Vec<u8>>(0))?;
        let mut alerts = Vec::new();
        for row in rows {
            alerts.push(row_to_alert(&row?)?);
        }
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use sentinel_core::core::alert::AlertImpactAssessment;
    use sentinel_core::core::alert::AlertScope;
    use sentinel_core::core::alert::AlertStatus;
    use sentinel_core::core::alert::Classification;
    use sentinel_core::core::alert::CorrelationAction;
    use sentinel_core::core::alert::Diagnostics;
    use sentinel_core::core::alert::QualityPolicy;
    use sentinel_core::core::alert::QualityValidation;
    use sentinel_core::core::identifiers::EventId;
    use sentinel_core::core::raw_item::Tier;

    use super::*;
    use crate::SqliteStoreConfig;

    fn sample_alert(alert_id: &str, key: &str, last_seen_millis: i64) -> Alert {
        Alert {
            alert_id: AlertId::new(alert_id),
            risk_type: "SPILL".into(),
            classification: Classification::Relevant,
            status: AlertStatus::Open,
            summary: "Spill at PLANT-01".into(),
            root_event_id: EventId::new("EVT-1"),
            correlation_key: key.into(),
            scope: AlertScope::default(),
            impact_assessment: AlertImpactAssessment::default(),
            recommended_actions: Vec::new(),
            reasoning: Vec::new(),
            impact_score: 5,
            diagnostics: Diagnostics {
                link_confidence_facility: 1.0,
                link_confidence_lanes: 0.0,
                link_confidence_shipments: 0.0,
                link_provenance_facility: "PROVIDED".into(),
                shipments_total_linked: 0,
                shipments_truncated: false,
                impact_score: 5,
                impact_score_breakdown: Vec::new(),
                impact_score_rationale: String::new(),
                quality_validation: QualityValidation {
                    max_allowed_classification: 2,
                    high_impact_factors_count: 0,
                    facility_confidence: 1.0,
                    facility_provenance: "PROVIDED".into(),
                    applied_policy: QualityPolicy::B,
                },
            },
            first_seen: Timestamp::from_unix_millis(last_seen_millis),
            last_seen: Timestamp::from_unix_millis(last_seen_millis),
            update_count: 1,
            tier: Tier::Regional,
            source_id: None,
            trust_tier: 2,
            correlation_action: CorrelationAction::Created,
            incident_evidence_path: String::new(),
            incident_evidence_hash: String::new(),
        }
    }

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(SqliteStoreConfig::new(dir.path().join("sentinel.db"))).expect("store opens");
        (dir, store)
    }

    #[test]
    fn insert_then_get_round_trips() {
        let (_dir, store) = store();
        let alert = sample_alert("ALERT-1", "SPILL|PLANT-01", 0);
        store.insert_alert(&alert).expect("insert");
        let loaded = store.get_alert(&alert.alert_id).expect("get").expect("present");
        assert_eq!(loaded.summary, alert.summary);
    }

    #[test]
    fn find_recent_alert_by_key_respects_window() {
        let (_dir, store) = store();
        let now = Timestamp::from_unix_millis(10 * 86_400_000);
        let alert = sample_alert("ALERT-1", "SPILL|PLANT-01", 0);
        store.insert_alert(&alert).expect("insert");

        let found = store.find_recent_alert_by_key("SPILL|PLANT-01", 30, now).expect("query");
        assert!(found.is_some());

        let missed = store.find_recent_alert_by_key("SPILL|PLANT-01", 5, now).expect("query");
        assert!(missed.is_none());
    }

    #[test]
    fn update_alert_rejects_missing_id() {
        let (_dir, store) = store();
        let alert = sample_alert("ALERT-MISSING", "SPILL|PLANT-01", 0);
        assert!(store.update_alert(&alert).is_err());
    }

    #[test]
    fn record_evidence_leaves_update_count_untouched() {
        let (_dir, store) = store();
        let alert = sample_alert("ALERT-1", "SPILL|PLANT-01", 0);
        store.insert_alert(&alert).expect("insert");
        store.record_evidence(&alert.alert_id, "evidence/ALERT-1.json", "deadbeef").expect("record");
        let loaded = store.get_alert(&alert.alert_id).expect("get").expect("present");
        assert_eq!(loaded.incident_evidence_path, "evidence/ALERT-1.json");
        assert_eq!(loaded.incident_evidence_hash, "deadbeef");
        assert_eq!(loaded.update_count, alert.update_count);
    }

    #[test]
    fn list_recent_alerts_orders_most_recent_first() {
        let (_dir, store) = store();
        let now = Timestamp::from_unix_millis(100_000);
        store.insert_alert(&sample_alert("ALERT-OLD", "SPILL|PLANT-01", 0)).expect("insert old");
        store.insert_alert(&sample_alert("ALERT-NEW", "SPILL|PLANT-02", 90_000)).expect("insert new");

        let alerts = store.list_recent_alerts(24, now).expect("list");
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_id.as_str(), "ALERT-NEW");
    }
}

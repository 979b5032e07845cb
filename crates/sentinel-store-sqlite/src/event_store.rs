// crates/sentinel-store-sqlite/src/event_store.rs
// ============================================================================
// Module: SQLite Event Store
// Description: Implements EventStore (C3 persistence) over a JSON blob column.
// Purpose: Save and look up canonicalized events by id.
// Dependencies: rusqlite, serde_json, sentinel-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use sentinel_core::core::event::Event;
use sentinel_core::core::identifiers::EventId;
use sentinel_core::errors::StoreError;
use sentinel_core::interfaces::EventStore;

use crate::SqliteStore;
use crate::errors::SqliteStoreError;

impl EventStore for SqliteStore {
    fn save_event(&self, event: &Event) -> Result<(), StoreError> {
        self.save_event_inner(event).map_err(StoreError::from)
    }

    fn get_event(&self, event_id: &EventId) -> Result<Option<Event>, StoreError> {
        self.get_event_inner(event_id).map_err(StoreError::from)
    }
}

impl SqliteStore {
    fn save_event_inner(&self, event: &Event) -> Result<(), SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let data = serde_json::to_vec(event)?;
        connection.execute(
            "INSERT INTO events (event_id, source_id, raw_id, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(event_id) DO UPDATE SET source_id = excluded.source_id, raw_id = excluded.raw_id, data = excluded.data",
            params![event.event_id.as_str(), event.source_id.as_str(), event.raw_id.as_str(), data],
        )?;
        Ok(())
    }

    fn get_event_inner(&self, event_id: &EventId) -> Result<Option<Event>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let data: Option<Vec<u8>> =
            connection.query_row("SELECT data FROM events WHERE event_id = ?1", params![event_id.as_str()], |row| row.get(0)).optional()?;
        data.map(|bytes| serde_json::from_slice(&bytes).map_err(SqliteStoreError::from)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    use sentinel_core::core::event::EventType;
    use sentinel_core::core::event::FacilityProvenance;
    use sentinel_core::core::event::LinkConfidence;
    use sentinel_core::core::identifiers::RawItemId;
    use sentinel_core::core::identifiers::SourceId;
    use sentinel_core::core::raw_item::Tier;

    use super::*;
    use crate::SqliteStoreConfig;

    fn sample_event() -> Event {
        Event {
            event_id: EventId::new("EVT-1"),
            source_id: SourceId::new("SRC-1"),
            raw_id: RawItemId::new("RAW-1"),
            tier: Tier::Regional,
            trust_tier: 2,
            classification_floor: 0,
            weighting_bias: 0,
            event_type: EventType::Spill,
            title: "Spill at PLANT-01".into(),
            raw_text: "A spill occurred.".into(),
            location_hint: Some("Houston, TX".into()),
            facilities: BTreeSet::new(),
            lanes: BTreeSet::new(),
            shipments: BTreeSet::new(),
            link_confidence: LinkConfidence::default(),
            link_provenance: FacilityProvenance::None,
            linking_notes: Vec::new(),
            shipments_total_linked: 0,
            shipments_truncated: false,
            extensions: BTreeMap::new(),
        }
    }

    #[test]
    fn save_and_get_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(SqliteStoreConfig::new(dir.path().join("sentinel.db"))).expect("store opens");
        let event = sample_event();
        store.save_event(&event).expect("save");
        let loaded = store.get_event(&event.event_id).expect("get").expect("present");
        assert_eq!(loaded.title, event.title);
    }

    #[test]
    fn save_overwrites_existing_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(SqliteStoreConfig::new(dir.path().join("sentinel.db"))).expect("store opens");
        let mut event = sample_event();
        store.save_event(&event).expect("save");
        event.title = "Updated title".into();
        store.save_event(&event).expect("overwrite");
        let loaded = store.get_event(&event.event_id).expect("get").expect("present");
        assert_eq!(loaded.title, "Updated title");
    }

    #[test]
    fn get_missing_event_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(SqliteStoreConfig::new(dir.path().join("sentinel.db"))).expect("store opens");
        assert!(store.get_event(&EventId::new("MISSING")).expect("get").is_none());
    }
}

// crates/sentinel-store-sqlite/src/raw_item_store.rs
// ============================================================================
// Module: SQLite Raw Item Store
// Description: Persists staged raw items and implements RawItemStore (C1/C2).
// Purpose: Dedupe on (source_id, canonical_id) or (source_id, content_hash)
//          and serve ingest-eligible batches to the orchestrator.
// Dependencies: rusqlite, serde_json, sentinel-core
// ============================================================================

//! ## Overview
//! [`SqliteStore::stage_raw_item`] is the fetch-side entry point (C1/C2): it
//! dedupes against the unique indexes declared in [`crate::schema`] and
//! either inserts a new row or touches `fetched_at` on an existing one,
//! per the raw item invariant. [`RawItemStore`] is the orchestrator-facing
//! read/transition seam and assumes items are already staged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use sentinel_core::core::identifiers::RawItemId;
use sentinel_core::core::identifiers::SourceId;
use sentinel_core::core::idgen::IdGenerator;
use sentinel_core::core::raw_item::RawItem;
use sentinel_core::core::raw_item::RawItemCandidate;
use sentinel_core::core::raw_item::RawItemStatus;
use sentinel_core::core::raw_item::Tier;
use sentinel_core::core::raw_item::content_hash;
use sentinel_core::core::time::Timestamp;
use sentinel_core::errors::StoreError;
use sentinel_core::interfaces::RawItemStore;

use crate::SqliteStore;
use crate::errors::SqliteStoreError;

// ============================================================================
// SECTION: Enum <-> TEXT
// ============================================================================

const fn tier_to_text(tier: Tier) -> &'static str {
    match tier {
        Tier::Local => "local",
        Tier::Regional => "regional",
        Tier::Global => "global",
    }
}

const fn status_to_text(status: RawItemStatus) -> &'static str {
    match status {
        RawItemStatus::New => "NEW",
        RawItemStatus::Normalized => "NORMALIZED",
        RawItemStatus::Failed => "FAILED",
        RawItemStatus::Suppressed => "SUPPRESSED",
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

fn row_to_raw_item(data: &[u8]) -> Result<RawItem, SqliteStoreError> {
    serde_json::from_slice(data).map_err(SqliteStoreError::from)
}

// ============================================================================
// SECTION: Staging (C1/C2)
// ============================================================================

impl SqliteStore {
    /// Stages a fetched candidate, deduping on the raw item invariant (§4.1).
    ///
    /// A re-fetch of an existing item (matched by `(source_id, canonical_id)`
    /// when the candidate carries one, else `(source_id, content_hash)`)
    /// updates only `fetched_at` and returns the existing row unchanged
    /// otherwise; a new candidate is inserted with status `NEW`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when hashing the candidate fails or the
    /// backend is unavailable.
    pub fn stage_raw_item(
        &self,
        candidate: &RawItemCandidate,
        source_id: &SourceId,
        tier: Tier,
        fetched_at: Timestamp,
        id_generator: &mut dyn IdGenerator,
        date_yyyymmdd: &str,
    ) -> Result<RawItem, StoreError> {
        self.stage_raw_item_inner(candidate, source_id, tier, fetched_at, id_generator, date_yyyymmdd)
            .map_err(StoreError::from)
    }

    fn stage_raw_item_inner(
        &self,
        candidate: &RawItemCandidate,
        source_id: &SourceId,
        tier: Tier,
        fetched_at: Timestamp,
        id_generator: &mut dyn IdGenerator,
        date_yyyymmdd: &str,
    ) -> Result<RawItem, SqliteStoreError> {
        let hash = content_hash(candidate).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;

        let existing_raw_id: Option<String> = if let Some(canonical_id) = &candidate.canonical_id {
            connection
                .query_row(
                    "SELECT raw_id FROM raw_items WHERE source_id = ?1 AND canonical_id = ?2",
                    params![source_id.as_str(), canonical_id],
                    |row| row.get(0),
                )
                .optional()?
        } else {
            connection
                .query_row(
                    "SELECT raw_id FROM raw_items WHERE source_id = ?1 AND canonical_id IS NULL AND content_hash = ?2",
                    params![source_id.as_str(), hash.value],
                    |row| row.get(0),
                )
                .optional()?
        };

        if let Some(raw_id) = existing_raw_id {
            connection.execute(
                "UPDATE raw_items SET fetched_at = ?1 WHERE raw_id = ?2",
                params![fetched_at.unix_millis(), raw_id],
            )?;
            let data: Vec<u8> =
                connection.query_row("SELECT data FROM raw_items WHERE raw_id = ?1", params![raw_id], |row| row.get(0))?;
            let mut item = row_to_raw_item(&data)?;
            item.fetched_at = fetched_at;
            let refreshed = serde_json::to_vec(&item)?;
            connection.execute("UPDATE raw_items SET data = ?1 WHERE raw_id = ?2", params![refreshed, raw_id])?;
            return Ok(item);
        }

        let raw_id = RawItemId::new(id_generator.generate("RAW", date_yyyymmdd));
        let item = RawItem {
            raw_id,
            source_id: source_id.clone(),
            tier,
            fetched_at,
            published_at: candidate.published_at_utc,
            canonical_id: candidate.canonical_id.clone(),
            url: candidate.url.clone(),
            title: candidate.title.clone(),
            payload: candidate.payload.clone(),
            content_hash: hash.clone(),
            status: RawItemStatus::New,
            error: None,
        };
        let data = serde_json::to_vec(&item)?;
        connection.execute(
            "INSERT INTO raw_items (raw_id, source_id, tier, fetched_at, canonical_id, content_hash, status, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                item.raw_id.as_str(),
                item.source_id.as_str(),
                tier_to_text(item.tier),
                item.fetched_at.unix_millis(),
                item.canonical_id,
                hash.value,
                status_to_text(item.status),
                data,
            ],
        )?;
        Ok(item)
    }
}

// ============================================================================
// SECTION: RawItemStore
// ============================================================================

impl RawItemStore for SqliteStore {
    fn get_raw_items_for_ingest(
        &self,
        limit: usize,
        min_tier: Option<Tier>,
        source_id: Option<&SourceId>,
        since_hours: Option<i64>,
        now: Timestamp,
    ) -> Result<Vec<RawItem>, StoreError> {
        self.get_raw_items_for_ingest_inner(limit, min_tier, source_id, since_hours, now).map_err(StoreError::from)
    }

    fn mark_raw_item_status(&self, raw_id: &RawItemId, status: RawItemStatus, error: Option<String>) -> Result<(), StoreError> {
        self.mark_raw_item_status_inner(raw_id, status, error).map_err(StoreError::from)
    }
}

impl SqliteStore {
    fn get_raw_items_for_ingest_inner(
        &self,
        limit: usize,
        min_tier: Option<Tier>,
        source_id: Option<&SourceId>,
        since_hours: Option<i64>,
        now: Timestamp,
    ) -> Result<Vec<RawItem>, SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let cutoff = since_hours.map(|hours| now.plus_hours(-hours).unix_millis());
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut statement = connection.prepare(
            "SELECT data FROM raw_items
             WHERE status = 'NEW'
               AND (?1 IS NULL OR source_id = ?1)
               AND (?2 IS NULL OR fetched_at >= ?2)
             ORDER BY fetched_at ASC
             LIMIT ?3",
        )?;
        let rows = statement.query_map(
            params![source_id.map(SourceId::as_str), cutoff, limit_i64],
            |row| row.get::<_, Vec<u8>>(0),
        )?;

        let mut items = Vec::new();
        for row in rows {
            let item = row_to_raw_item(&row?)?;
            if min_tier.is_some_and(|floor| !item.tier.admits(floor)) {
                continue;
            }
            if let Some(cutoff_millis) = cutoff {
                let published_within_window = item.published_at.is_none_or(|published| published.unix_millis() >= cutoff_millis);
                if !published_within_window {
                    continue;
                }
            }
            items.push(item);
        }
        Ok(items)
    }

    fn mark_raw_item_status_inner(&self, raw_id: &RawItemId, status: RawItemStatus, error: Option<String>) -> Result<(), SqliteStoreError> {
        let connection = self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let data: Option<Vec<u8>> =
            connection.query_row("SELECT data FROM raw_items WHERE raw_id = ?1", params![raw_id.as_str()], |row| row.get(0)).optional()?;
        let Some(data) = data else {
            return Err(SqliteStoreError::Invalid(format!("raw item not found: {raw_id}")));
        };
        let mut item = row_to_raw_item(&data)?;
        if item.status.is_terminal() && item.status != status {
            return Err(SqliteStoreError::Invalid(format!("raw item {raw_id} is already in a terminal status")));
        }
        item.status = status;
        item.error = error;
        let refreshed = serde_json::to_vec(&item)?;
        connection.execute(
            "UPDATE raw_items SET status = ?1, data = ?2 WHERE raw_id = ?3",
            params![status_to_text(status), refreshed, raw_id.as_str()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sentinel_core::core::idgen::PinnedIdGenerator;
    use sentinel_core::core::raw_item::RawItemCandidate;

    use super::*;
    use crate::SqliteStoreConfig;

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::new(SqliteStoreConfig::new(dir.path().join("sentinel.db"))).expect("store opens");
        (dir, store)
    }

    fn candidate(canonical_id: Option<&str>) -> RawItemCandidate {
        RawItemCandidate {
            canonical_id: canonical_id.map(str::to_string),
            title: Some("Spill reported".into()),
            url: Some("https://example.test/item".into()),
            published_at_utc: None,
            payload: serde_json::json!({"body": "spill"}),
        }
    }

    #[test]
    fn stage_inserts_then_dedupes_by_canonical_id() {
        let (_dir, store) = store();
        let mut ids = PinnedIdGenerator::new(1);
        let source_id = SourceId::new("SRC-1");
        let first = store.stage_raw_item(&candidate(Some("FEED-1")), &source_id, Tier::Regional, Timestamp::from_unix_millis(0), &mut ids, "20260101").expect("stage");
        let second = store
            .stage_raw_item(&candidate(Some("FEED-1")), &source_id, Tier::Regional, Timestamp::from_unix_millis(1_000), &mut ids, "20260101")
            .expect("restage");
        assert_eq!(first.raw_id, second.raw_id);
        assert_eq!(second.fetched_at, Timestamp::from_unix_millis(1_000));
    }

    #[test]
    fn stage_dedupes_by_content_hash_without_canonical_id() {
        let (_dir, store) = store();
        let mut ids = PinnedIdGenerator::new(2);
        let source_id = SourceId::new("SRC-1");
        let first = store.stage_raw_item(&candidate(None), &source_id, Tier::Local, Timestamp::from_unix_millis(0), &mut ids, "20260101").expect("stage");
        let second = store.stage_raw_item(&candidate(None), &source_id, Tier::Local, Timestamp::from_unix_millis(500), &mut ids, "20260101").expect("restage");
        assert_eq!(first.raw_id, second.raw_id);
    }

    #[test]
    fn get_raw_items_for_ingest_filters_by_tier_and_window() {
        let (_dir, store) = store();
        let mut ids = PinnedIdGenerator::new(3);
        let source_id = SourceId::new("SRC-1");
        store
            .stage_raw_item(&candidate(Some("FEED-LOCAL")), &source_id, Tier::Local, Timestamp::from_unix_millis(0), &mut ids, "20260101")
            .expect("stage local");
        store
            .stage_raw_item(&candidate(Some("FEED-GLOBAL")), &source_id, Tier::Global, Timestamp::from_unix_millis(0), &mut ids, "20260101")
            .expect("stage global");

        let items = store
            .get_raw_items_for_ingest(10, Some(Tier::Regional), None, None, Timestamp::from_unix_millis(0))
            .expect("query");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].tier, Tier::Global);
    }

    #[test]
    fn mark_raw_item_status_rejects_re_entering_terminal_state() {
        let (_dir, store) = store();
        let mut ids = PinnedIdGenerator::new(4);
        let source_id = SourceId::new("SRC-1");
        let item = store
            .stage_raw_item(&candidate(Some("FEED-1")), &source_id, Tier::Regional, Timestamp::from_unix_millis(0), &mut ids, "20260101")
            .expect("stage");
        store.mark_raw_item_status(&item.raw_id, RawItemStatus::Normalized, None).expect("first transition");
        let result = store.mark_raw_item_status(&item.raw_id, RawItemStatus::Failed, Some("boom".into()));
        assert!(result.is_err());
    }

    #[test]
    fn get_raw_items_for_ingest_excludes_stale_published_at_even_within_fetch_window() {
        let (_dir, store) = store();
        let mut ids = PinnedIdGenerator::new(5);
        let source_id = SourceId::new("SRC-1");
        let now = Timestamp::from_unix_millis(10 * 60 * 60 * 1_000);
        let stale_candidate = RawItemCandidate {
            canonical_id: Some("FEED-STALE".into()),
            title: Some("Old advisory republished".into()),
            url: Some("https://example.test/stale".into()),
            published_at_utc: Some(Timestamp::from_unix_millis(0)),
            payload: serde_json::json!({"body": "stale"}),
        };
        store.stage_raw_item(&stale_candidate, &source_id, Tier::Regional, now, &mut ids, "20260101").expect("stage stale");
        store
            .stage_raw_item(&candidate(Some("FEED-FRESH")), &source_id, Tier::Regional, now, &mut ids, "20260101")
            .expect("stage fresh");

        let items = store.get_raw_items_for_ingest(10, None, None, Some(1), now).expect("query");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].canonical_id.as_deref(), Some("FEED-FRESH"));
    }
}

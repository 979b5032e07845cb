// crates/sentinel-core/src/core/raw_item.rs
// ============================================================================
// Module: Sentinel Raw Item Model
// Description: Fetched-document staging records (C1/C2 data model).
// Purpose: Represent an un-canonicalized feed item and its dedupe key.
// Dependencies: serde, serde_json, crate::core::{hashing, identifiers, time}
// ============================================================================

//! ## Overview
//! A [`RawItem`] is the unit of staged persistence between the (external)
//! fetcher and the canonicalizer. Dedupe keys and content hashes are
//! computed here so every store implementation applies the same rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::RawItemId;
use crate::core::identifiers::SourceId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Tier
// ============================================================================

/// Coarse source trust category.
///
/// # Invariants
/// - Ordered `Global > Regional > Local`; see [`Tier::admits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Local-only relevance.
    Local,
    /// Regional relevance.
    Regional,
    /// Global relevance.
    Global,
}

impl Tier {
    /// Returns true when `self` satisfies a `min_tier` filter of `floor`.
    ///
    /// `min_tier = Regional` admits `Global` and `Regional`, not `Local`.
    #[must_use]
    pub const fn admits(self, floor: Self) -> bool {
        self as u8 >= floor as u8
    }
}

// ============================================================================
// SECTION: Raw Item Candidate
// ============================================================================

/// Candidate produced by an (external) adapter, before staging.
///
/// # Invariants
/// - `payload` must be a JSON object; non-object payloads are a structural
///   error surfaced by the canonicalizer (C3), not by the candidate itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItemCandidate {
    /// Feed-assigned stable identifier, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
    /// Candidate title, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Candidate source URL, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Publication timestamp, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at_utc: Option<Timestamp>,
    /// Opaque structured payload as returned by the adapter.
    pub payload: Value,
}

/// Stable projection of a candidate used to compute the content hash.
///
/// # Invariants
/// - Field set and order are part of the content-hash contract: changing
///   this projection changes every future content hash.
#[derive(Debug, Clone, Serialize)]
struct ContentHashProjection<'a> {
    canonical_id: &'a Option<String>,
    title: &'a Option<String>,
    url: &'a Option<String>,
    published_at_utc: Option<i64>,
    payload: &'a Value,
}

/// Computes the content hash (§4.1) for a candidate.
///
/// # Errors
///
/// Returns an error when the candidate cannot be canonicalized (e.g. it
/// contains `NaN`/`Infinity` floats).
pub fn content_hash(candidate: &RawItemCandidate) -> Result<HashDigest, crate::core::hashing::HashError> {
    let projection = ContentHashProjection {
        canonical_id: &candidate.canonical_id,
        title: &candidate.title,
        url: &candidate.url,
        published_at_utc: candidate.published_at_utc.map(Timestamp::unix_millis),
        payload: &candidate.payload,
    };
    hash_canonical_json(HashAlgorithm::Sha256, &projection)
}

// ============================================================================
// SECTION: Raw Item Status
// ============================================================================

/// Lifecycle status of a staged raw item.
///
/// # Invariants
/// - `New` transitions to exactly one terminal state per ingest attempt.
/// - `Normalized`, `Failed`, and `Suppressed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RawItemStatus {
    /// Freshly staged, not yet processed by the orchestrator.
    New,
    /// Successfully canonicalized into an event.
    Normalized,
    /// Canonicalization failed; see the item's error message.
    Failed,
    /// Deliberately excluded from processing (operator action).
    Suppressed,
}

impl RawItemStatus {
    /// Returns true when this status is terminal (cannot be re-entered).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::New)
    }
}

// ============================================================================
// SECTION: Raw Item
// ============================================================================

/// A fetched document staged for canonicalization.
///
/// # Invariants
/// - `(source_id, canonical_id)` is unique when `canonical_id` is `Some`;
///   otherwise `(source_id, content_hash)` is unique.
/// - A re-fetch of an existing item updates only `fetched_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    /// Opaque raw item identifier, assigned on first sighting.
    pub raw_id: RawItemId,
    /// Identifier of the configured source that produced this item.
    pub source_id: SourceId,
    /// Source trust tier at the time of fetch.
    pub tier: Tier,
    /// UTC timestamp when this item was fetched.
    pub fetched_at: Timestamp,
    /// UTC publication timestamp, when known.
    pub published_at: Option<Timestamp>,
    /// Feed-assigned canonical id, when known.
    pub canonical_id: Option<String>,
    /// Source URL, when known.
    pub url: Option<String>,
    /// Candidate title, when known.
    pub title: Option<String>,
    /// Opaque structured payload.
    pub payload: Value,
    /// Content hash of the stable candidate projection.
    pub content_hash: HashDigest,
    /// Current lifecycle status.
    pub status: RawItemStatus,
    /// Error message recorded when `status == Failed`.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_admits_respects_ordering() {
        assert!(Tier::Global.admits(Tier::Regional));
        assert!(!Tier::Local.admits(Tier::Regional));
        assert!(Tier::Regional.admits(Tier::Regional));
    }

    #[test]
    fn content_hash_is_stable_for_equal_candidates() {
        let candidate = RawItemCandidate {
            canonical_id: Some("FEED-1".into()),
            title: Some("Spill".into()),
            url: None,
            published_at_utc: None,
            payload: serde_json::json!({"a": 1}),
        };
        let hash_a = content_hash(&candidate).expect("hashable candidate");
        let hash_b = content_hash(&candidate).expect("hashable candidate");
        assert_eq!(hash_a, hash_b);
    }

    #[test]
    fn content_hash_ignores_field_order_in_payload() {
        let a = RawItemCandidate {
            canonical_id: None,
            title: None,
            url: None,
            published_at_utc: None,
            payload: serde_json::json!({"a": 1, "b": 2}),
        };
        let b = RawItemCandidate {
            canonical_id: None,
            title: None,
            url: None,
            published_at_utc: None,
            payload: serde_json::json!({"b": 2, "a": 1}),
        };
        assert_eq!(
            content_hash(&a).expect("hashable").value,
            content_hash(&b).expect("hashable").value
        );
    }
}

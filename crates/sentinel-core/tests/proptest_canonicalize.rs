// crates/sentinel-core/tests/proptest_canonicalize.rs
// ============================================================================
// Module: Canonicalizer Property-Based Tests
// Description: Property tests for canonicalization determinism and stability.
// Purpose: Detect panics and non-determinism across wide input ranges.
// ============================================================================

//! Property-based tests for the canonicalizer and id generator.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use sentinel_core::canonicalize::SourceConfig;
use sentinel_core::canonicalize::canonicalize;
use sentinel_core::core::hashing::HashAlgorithm;
use sentinel_core::core::hashing::hash_bytes;
use sentinel_core::core::idgen::PinnedIdGenerator;
use sentinel_core::core::identifiers::RawItemId;
use sentinel_core::core::identifiers::SourceId;
use sentinel_core::core::raw_item::RawItem;
use sentinel_core::core::raw_item::RawItemStatus;
use sentinel_core::core::raw_item::Tier;
use sentinel_core::core::time::Timestamp;
use proptest::prelude::*;

fn item_with_body(body: &str, title: &str) -> RawItem {
    RawItem {
        raw_id: RawItemId::new("RAW-1"),
        source_id: SourceId::new("SRC-1"),
        tier: Tier::Regional,
        fetched_at: Timestamp::from_unix_millis(0),
        published_at: None,
        canonical_id: None,
        url: None,
        title: Some(title.to_string()),
        payload: serde_json::json!({ "body": body }),
        content_hash: hash_bytes(HashAlgorithm::Sha256, body.as_bytes()),
        status: RawItemStatus::New,
        error: None,
    }
}

proptest! {
    #[test]
    fn canonicalize_never_panics_on_arbitrary_text(body in ".{0,200}", title in ".{0,80}") {
        let item = item_with_body(&body, &title);
        let source_config = SourceConfig::default();
        let mut id_generator = PinnedIdGenerator::new(1);
        let result = canonicalize(&item, &source_config, &mut id_generator);
        prop_assert!(result.is_ok());
    }

    #[test]
    fn canonicalize_is_deterministic_for_equal_inputs(body in ".{0,200}", title in ".{0,80}", seed in any::<u64>()) {
        let item = item_with_body(&body, &title);
        let source_config = SourceConfig::default();

        let mut gen_a = PinnedIdGenerator::new(seed);
        let (event_a, hash_a) = canonicalize(&item, &source_config, &mut gen_a).expect("canonicalizes");

        let mut gen_b = PinnedIdGenerator::new(seed);
        let (event_b, hash_b) = canonicalize(&item, &source_config, &mut gen_b).expect("canonicalizes");

        prop_assert_eq!(event_a.event_id, event_b.event_id);
        prop_assert_eq!(event_a.event_type, event_b.event_type);
        prop_assert_eq!(hash_a.value, hash_b.value);
    }

    #[test]
    fn canonicalize_never_fabricates_a_location_hint_from_noise(body in "[a-z0-9 ]{0,120}") {
        let item = item_with_body(&body, "");
        let source_config = SourceConfig::default();
        let mut id_generator = PinnedIdGenerator::new(1);
        let (event, _) = canonicalize(&item, &source_config, &mut id_generator).expect("canonicalizes");
        prop_assert!(event.location_hint.is_none());
    }
}

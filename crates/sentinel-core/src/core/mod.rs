// crates/sentinel-core/src/core/mod.rs
// ============================================================================
// Module: Sentinel Core Types
// Description: Canonical data model shared by every pipeline component.
// Purpose: Provide stable, serializable types for raw items, events, the
//          network inventory, alerts, and evidence artifacts.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! These submodules define the data that flows through ingest: a fetched
//! [`raw_item::RawItem`] is canonicalized into an [`event::Event`], linked
//! against the [`inventory::Inventory`], scored, and correlated into an
//! [`alert::Alert`] alongside an [`evidence::IncidentEvidenceArtifact`]. Time
//! and identifier allocation are injected via [`time::Clock`] and
//! [`idgen::IdGenerator`] so the whole pipeline can run pinned or live.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod alert;
pub mod event;
pub mod evidence;
pub mod hashing;
pub mod identifiers;
pub mod idgen;
pub mod inventory;
pub mod raw_item;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use alert::Alert;
pub use alert::AlertAction;
pub use alert::AlertImpactAssessment;
pub use alert::AlertScope;
pub use alert::AlertStatus;
pub use alert::Classification;
pub use alert::CorrelationAction;
pub use alert::Diagnostics;
pub use alert::EvidenceCorrelation;
pub use alert::EvidenceSource;
pub use alert::QualityPolicy;
pub use alert::QualityValidation;
pub use event::Event;
pub use event::EventType;
pub use event::FacilityProvenance;
pub use event::LinkConfidence;
pub use evidence::IncidentEvidenceArtifact;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use hashing::canonical_json_bytes;
pub use hashing::hash_bytes;
pub use hashing::hash_canonical_json;
pub use identifiers::AlertId;
pub use identifiers::EventId;
pub use identifiers::FacilityId;
pub use identifiers::LaneId;
pub use identifiers::RawItemId;
pub use identifiers::ShipmentId;
pub use identifiers::SourceId;
pub use idgen::IdGenerator;
pub use idgen::LiveIdGenerator;
pub use idgen::PinnedIdGenerator;
pub use inventory::Facility;
pub use inventory::Inventory;
pub use inventory::Lane;
pub use inventory::Shipment;
pub use inventory::ShipmentStatus;
pub use raw_item::RawItem;
pub use raw_item::RawItemCandidate;
pub use raw_item::RawItemStatus;
pub use raw_item::Tier;
pub use raw_item::content_hash;
pub use time::Clock;
pub use time::DeterminismContext;
pub use time::DeterminismMode;
pub use time::PinnedClock;
pub use time::SystemClock;
pub use time::Timestamp;
pub use time::TimeParseError;

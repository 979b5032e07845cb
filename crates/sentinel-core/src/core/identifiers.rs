// crates/sentinel-core/src/core/identifiers.rs
// ============================================================================
// Module: Sentinel Identifiers
// Description: Opaque, strongly typed identifiers used across the pipeline.
// Purpose: Give every domain entity a stable, serializable identity type.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings. They serialize transparently so they read
//! naturally in JSON artifacts and SQLite rows, but the wrapper types prevent
//! accidentally mixing, say, a `FacilityId` with a `LaneId` at a call site.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Macro
// ============================================================================

macro_rules! opaque_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier, returning the owned string.
            #[must_use]
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

opaque_id!(RawItemId, "Identifier for a fetched `RawItem` row.");
opaque_id!(SourceId, "Identifier for a configured feed source.");
opaque_id!(EventId, "Identifier for a canonicalized `Event`.");
opaque_id!(AlertId, "Identifier for a persisted `Alert`.");
opaque_id!(FacilityId, "Identifier for a network `Facility`.");
opaque_id!(LaneId, "Identifier for a network `Lane`.");
opaque_id!(ShipmentId, "Identifier for a network `Shipment`.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner_string() {
        let id = FacilityId::new("PLANT-01");
        assert_eq!(id.to_string(), "PLANT-01");
        assert_eq!(id.as_str(), "PLANT-01");
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = FacilityId::from("PLANT-01");
        let b = FacilityId::from("PLANT-02");
        assert!(a < b);
    }
}

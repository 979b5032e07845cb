// crates/sentinel-broker/src/lib.rs
// ============================================================================
// Module: Sentinel Broker Library
// Description: Scheme-keyed source registry for external feed fetching.
// Purpose: Resolve a feed reference (URI) into raw bytes so a fetcher adapter
//          can parse them into `RawItemCandidate` values.
// Dependencies: sentinel-core, reqwest, thiserror, url
// ============================================================================

//! ## Overview
//! Sentinel's core ingestion pipeline never touches the network (§5); all
//! network I/O belongs to the fetcher. This crate is the ambient adapter
//! seam the fetcher is built on: a [`Source`] trait registered by URI
//! scheme, composed by [`FeedRegistry`].
//!
//! No concrete RSS/weather/emergency-feed parser lives here. Those format
//! adapters are external collaborators that consume the bytes a [`Source`]
//! resolves and turn them into
//! `sentinel_core::core::raw_item::RawItemCandidate` values; this crate only
//! resolves the bytes.
//!
//! Invariants:
//! - Source resolution fails closed on an unsupported or unregistered scheme.
//! - Fetch outcomes are recorded through a [`Sink`] for operational
//!   visibility; sink failures are never propagated (logging is best-effort).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod registry;
pub mod sink;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use registry::FeedRegistry;
pub use registry::FeedRegistryBuilder;
pub use registry::RegistryError;
pub use sink::FetchOutcome;
pub use sink::LogSink;
pub use sink::Sink;
pub use source::HttpSource;
pub use source::HttpSourcePolicy;
pub use source::InlineSource;
pub use source::MAX_SOURCE_BYTES;
pub use source::Source;
pub use source::SourceError;
pub use source::SourcePayload;

#[cfg(test)]
mod tests;

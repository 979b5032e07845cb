// crates/sentinel-broker/src/source/mod.rs
// ============================================================================
// Module: Sentinel Broker Sources
// Description: Source trait and shared byte-cap enforcement.
// Purpose: Resolve a feed URI into raw payload bytes.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`Source`] resolves one URI scheme into raw bytes. [`FeedRegistry`]
//! (in [`crate::registry`]) dispatches by scheme to a registered source.
//! Sources never parse payload content; that is the fetcher adapter's job.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;
pub mod inline;

pub use http::HttpSource;
pub use http::HttpSourcePolicy;
pub use inline::InlineSource;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum payload size accepted from any source, in bytes (16 MiB).
///
/// Feed documents (RSS/Atom/JSON) are bounded text; this cap exists to stop
/// a misbehaving or compromised upstream from exhausting memory.
pub const MAX_SOURCE_BYTES: usize = 16 * 1024 * 1024;

/// Returns [`MAX_SOURCE_BYTES`] as a `u64`, for comparison against lengths
/// reported by transports that use 64-bit sizes.
///
/// # Errors
///
/// Returns [`SourceError::LimitOverflow`] if the cap does not fit in a `u64`
/// (never true for the current constant; kept fallible for forward safety).
pub fn max_source_bytes_u64() -> Result<u64, SourceError> {
    u64::try_from(MAX_SOURCE_BYTES).map_err(|_| SourceError::LimitOverflow {
        limit: MAX_SOURCE_BYTES,
    })
}

/// Returns an error if `len` exceeds [`MAX_SOURCE_BYTES`].
///
/// # Errors
///
/// Returns [`SourceError::TooLarge`] when `len` exceeds the cap.
pub fn enforce_max_bytes(len: usize) -> Result<(), SourceError> {
    if len > MAX_SOURCE_BYTES {
        return Err(SourceError::TooLarge {
            max_bytes: MAX_SOURCE_BYTES,
            actual_bytes: len,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Source Trait
// ============================================================================

/// Resolved payload bytes from a source, with an optional content type hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePayload {
    /// Raw resolved bytes.
    pub bytes: Vec<u8>,
    /// Content type reported by the source, if any.
    pub content_type: Option<String>,
}

/// Resolves a URI into raw payload bytes.
pub trait Source: Send + Sync {
    /// Fetches the payload referenced by `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the URI is invalid, the scheme is
    /// unsupported, the fetch fails, or the payload exceeds
    /// [`MAX_SOURCE_BYTES`].
    fn fetch(&self, uri: &str) -> Result<SourcePayload, SourceError>;
}

// ============================================================================
// SECTION: Source Errors
// ============================================================================

/// Errors returned by [`Source`] implementations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// URI failed to parse.
    #[error("invalid uri: {0}")]
    InvalidUri(String),
    /// No source is registered for the URI's scheme.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
    /// Host policy rejected the request.
    #[error("source policy violation: {0}")]
    Policy(String),
    /// Transport-level failure (connection, status code, redirect).
    #[error("source transport failure: {0}")]
    Http(String),
    /// Decoding the payload bytes failed.
    #[error("source payload decode failure: {0}")]
    Decode(String),
    /// Payload exceeded the maximum accepted size.
    #[error("payload too large: {actual_bytes} bytes exceeds cap of {max_bytes} bytes")]
    TooLarge {
        /// Maximum accepted size in bytes.
        max_bytes: usize,
        /// Actual observed size in bytes.
        actual_bytes: usize,
    },
    /// The configured byte cap cannot be represented for a size comparison.
    #[error("byte cap {limit} cannot be represented for this comparison")]
    LimitOverflow {
        /// The byte cap that overflowed.
        limit: usize,
    },
}

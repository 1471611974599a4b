//! Errors surfaced by table construction.
//!
//! Missing styles, missing images, and empty text are not errors: they lay
//! out as zero sizes and skipped draws. Only the conditions below abort (or,
//! for cache writes, annotate) a render.

use thiserror::Error;

/// A failure while resolving styles or acquiring images for a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A typeface descriptor was requested but could not be loaded, either
    /// because no loader is configured or because the loader failed.
    #[error("font '{descriptor}' is unavailable: {reason}")]
    FontUnavailable {
        /// Human-readable form of the requested descriptor.
        descriptor: String,
        /// Why loading failed.
        reason: String,
    },

    /// An image could not be fetched or decoded. Aborts the render.
    #[error("failed to fetch image '{url}': {reason}")]
    ImageFetchFailed {
        /// Source identifier of the image.
        url: String,
        /// Transport or decode failure.
        reason: String,
    },

    /// A fetched image could not be written to the image cache.
    ///
    /// Layout continues; the failure is reported alongside the result.
    #[error("failed to cache image '{url}': {reason}")]
    CacheWriteFailed {
        /// Source identifier of the image.
        url: String,
        /// Cache failure.
        reason: String,
    },
}

/// Result alias for layout operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types for cache persistence.

use std::path::PathBuf;

/// Errors that can occur while writing or loading a type cache.
///
/// The three version variants are deliberately distinct so callers can tell
/// a stale cache (rebuild it) from a corrupt one (investigate it). Per-type
/// resolution failures never appear here: they are recorded as `FAIL`
/// outcomes during the build.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while opening or writing a cache file.
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The stream was written in a layout this build does not understand.
    #[error("unexpected format version: expected {expected}, got {actual}")]
    UnexpectedFormatVersion {
        /// The format version this build reads.
        expected: u32,
        /// The format version found in the stream.
        actual: u32,
    },

    /// The cache was built for a different runtime major version.
    #[error("incompatible runtime version: expected {expected}, got {actual}")]
    IncompatibleRuntimeVersion {
        /// The runtime major version the caller runs on.
        expected: u32,
        /// The runtime major version the cache was built for.
        actual: u32,
    },

    /// The cache was built by a different build-tool version.
    #[error("incompatible build-tool version: expected {expected}, got {actual}")]
    IncompatibleToolVersion {
        /// The build-tool version the caller expects.
        expected: String,
        /// The build-tool version recorded in the cache.
        actual: String,
    },

    /// The stream is truncated or malformed past the header.
    #[error("deserialization error: {reason}")]
    Deserialization {
        /// Description of the failure.
        reason: String,
    },

    /// The table could not be encoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },
}

impl CacheError {
    /// Returns `true` if the cache is intact but was produced for another
    /// format, runtime, or build tool, and should simply be rebuilt.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedFormatVersion { .. }
                | Self::IncompatibleRuntimeVersion { .. }
                | Self::IncompatibleToolVersion { .. }
        )
    }
}

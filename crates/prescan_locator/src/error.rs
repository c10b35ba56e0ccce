//! Error and diagnostic types for type discovery.

use std::path::PathBuf;

/// Fatal errors that prevent a walk from starting.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// A root location does not exist.
    #[error("scan root not found: {}", path.display())]
    RootNotFound {
        /// The missing root.
        path: PathBuf,
    },
}

/// A non-fatal problem encountered during a walk.
///
/// None of these can be attributed to a type identity, so they never become
/// classification outcomes. They are logged as they occur and kept on the
/// [`Locate`](crate::Locate) iterator for inspection afterwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateWarning {
    /// A file or archive entry could not be read.
    #[error("cannot read {origin}: {reason}")]
    Unreadable {
        /// Human-readable location.
        origin: String,
        /// Description of the failure.
        reason: String,
    },

    /// An archive's central directory could not be parsed.
    #[error("corrupt archive {origin}: {reason}")]
    CorruptArchive {
        /// Human-readable location.
        origin: String,
        /// Description of the failure.
        reason: String,
    },

    /// An archive nested deeper than the configured limit was not opened.
    #[error("archive {origin} nested {depth} levels deep exceeds the limit of {limit}")]
    DepthExceeded {
        /// Human-readable location.
        origin: String,
        /// Nesting depth of the archive.
        depth: usize,
        /// Configured maximum depth.
        limit: usize,
    },

    /// A class entry's header could not be parsed, so its name is unknown.
    #[error("unparsable class {origin}: {reason}")]
    UnparsableClass {
        /// Human-readable location.
        origin: String,
        /// Description of the failure.
        reason: String,
    },
}

impl LocateWarning {
    /// Returns the location the warning refers to.
    pub fn origin(&self) -> &str {
        match self {
            Self::Unreadable { origin, .. }
            | Self::CorruptArchive { origin, .. }
            | Self::DepthExceeded { origin, .. }
            | Self::UnparsableClass { origin, .. } => origin,
        }
    }
}

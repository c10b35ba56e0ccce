//! The record produced for every type definition the locator finds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A type definition found while scanning a root location.
///
/// One value exists per physically distinct definition that survived
/// deduplication. The origin path is human-readable and includes the chain of
/// nested archive names, e.g. `libs/app.jar/lib/dep.jar/com/x/Y.class`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveredType {
    /// Fully qualified, dot-separated type name (e.g. `com.example.Service`).
    pub qualified_name: String,

    /// Where the definition was found.
    pub origin_path: String,
}

impl DiscoveredType {
    /// Creates a new discovered type record.
    pub fn new(qualified_name: impl Into<String>, origin_path: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            origin_path: origin_path.into(),
        }
    }

    /// Returns the package portion of the qualified name.
    pub fn package(&self) -> &str {
        crate::name::package_of(&self.qualified_name)
    }
}

/// A discovered type together with the raw bytes of its definition.
///
/// This is what the locator yields and what the cache builder consumes: the
/// bytes are handed to the type loader, the [`DiscoveredType`] ends up in the
/// outcome table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedType {
    /// Identity and origin of the definition.
    pub discovered: DiscoveredType,

    /// Raw definition bytes.
    pub bytes: Vec<u8>,
}

impl LocatedType {
    /// Creates a located type.
    pub fn new(discovered: DiscoveredType, bytes: Vec<u8>) -> Self {
        Self { discovered, bytes }
    }

    /// Returns the qualified name of the located type.
    pub fn name(&self) -> &str {
        &self.discovered.qualified_name
    }
}

impl fmt::Display for DiscoveredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.qualified_name, self.origin_path)
    }
}

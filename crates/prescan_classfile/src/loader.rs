//! The type loader capability.
//!
//! The cache builder never parses bytes itself; it hands each discovered
//! type to a [`TypeLoader`], which either produces a [`TypeDescriptor`] or
//! explains why the type cannot be resolved. Failures are data, not panics:
//! the builder records them as `FAIL` outcomes and moves on.

use prescan_common::DiscoveredType;
use thiserror::Error;

use crate::classfile::{parse_descriptor, ClassParseError, TypeDescriptor};
use crate::version::class_major_to_release;

/// Why a discovered type could not be resolved.
///
/// The `Display` rendering is persisted verbatim as the failure detail, so it
/// names the type where that helps an operator reading the report.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The bytes are not a well-formed class file.
    #[error("malformed class file: {0}")]
    Parse(#[from] ClassParseError),

    /// The class file requires a newer runtime than the one targeted.
    #[error("{name} has class file version {class_major}, unsupported by runtime {runtime_major}")]
    UnsupportedVersion {
        /// Qualified type name.
        name: String,
        /// Class-file major version found in the bytes.
        class_major: u16,
        /// Target runtime major version.
        runtime_major: u32,
    },

    /// The bytes define a different type than the one discovered.
    #[error("expected {expected} but class file defines {actual}")]
    NameMismatch {
        /// Name recorded at discovery time.
        expected: String,
        /// Name found in the class file.
        actual: String,
    },

    /// A custom loader refused the type.
    #[error("{reason}")]
    Rejected {
        /// Human-readable explanation.
        reason: String,
    },
}

impl ResolveError {
    /// Creates a [`ResolveError::Rejected`] with the given reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Resolves discovered types into descriptors a classification policy can
/// inspect.
pub trait TypeLoader {
    /// Resolves one discovered type from its raw definition bytes.
    fn resolve(
        &self,
        discovered: &DiscoveredType,
        bytes: &[u8],
    ) -> Result<TypeDescriptor, ResolveError>;
}

impl<T: TypeLoader + ?Sized> TypeLoader for &T {
    fn resolve(
        &self,
        discovered: &DiscoveredType,
        bytes: &[u8],
    ) -> Result<TypeDescriptor, ResolveError> {
        (**self).resolve(discovered, bytes)
    }
}

/// Loader that parses class-file headers directly.
///
/// Parameterised by the target runtime's major version: class files compiled
/// for a newer runtime fail to resolve, as they would when loaded for real.
#[derive(Debug, Clone, Copy)]
pub struct ClassFileLoader {
    runtime_major: u32,
}

impl ClassFileLoader {
    /// Creates a loader targeting the given runtime major version.
    pub fn new(runtime_major: u32) -> Self {
        Self { runtime_major }
    }

    /// Returns the target runtime major version.
    pub fn runtime_major(&self) -> u32 {
        self.runtime_major
    }
}

impl TypeLoader for ClassFileLoader {
    fn resolve(
        &self,
        discovered: &DiscoveredType,
        bytes: &[u8],
    ) -> Result<TypeDescriptor, ResolveError> {
        let descriptor = parse_descriptor(bytes)?;

        if descriptor.name != discovered.qualified_name {
            return Err(ResolveError::NameMismatch {
                expected: discovered.qualified_name.clone(),
                actual: descriptor.name,
            });
        }

        let required = class_major_to_release(descriptor.major_version).unwrap_or(1);
        if required > self.runtime_major {
            return Err(ResolveError::UnsupportedVersion {
                name: descriptor.name,
                class_major: descriptor.major_version,
                runtime_major: self.runtime_major,
            });
        }

        tracing::trace!(name = %descriptor.name, major = descriptor.major_version, "resolved");
        Ok(descriptor)
    }
}

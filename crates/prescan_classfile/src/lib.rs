//! Class-file introspection and the type loader capability.
//!
//! The [`classfile`] module parses just enough of a JVM class file to build a
//! [`TypeDescriptor`]: the type's name, supertype, interfaces, access flags,
//! and class-file version. The [`loader`] module defines the [`TypeLoader`]
//! capability the cache builder resolves discovered types through, plus the
//! default [`ClassFileLoader`] which parses bytes directly and enforces the
//! target runtime's version ceiling.

#![warn(missing_docs)]

pub mod classfile;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod loader;
pub mod version;

pub use classfile::{is_class_file, parse_descriptor, AccessFlags, ClassParseError, TypeDescriptor};
pub use loader::{ClassFileLoader, ResolveError, TypeLoader};
pub use version::{class_major_to_release, release_to_class_major};

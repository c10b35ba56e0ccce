//! Discovery of type definitions across directories and archives.
//!
//! The [`TypeLocator`] walks one or more root locations and yields every
//! class definition it finds, descending into archives, archives nested in
//! archives, and the version-specific variants of multi-release archives.
//! Traversal runs on an explicit stack of open containers, so nesting depth
//! never grows the call stack.
//!
//! Entries that cannot be read are not errors: they are collected as
//! [`LocateWarning`]s and logged, and the walk continues.

#![warn(missing_docs)]

pub mod archive;
pub mod error;
pub mod locator;

pub use error::{LocateError, LocateWarning};
pub use locator::{Locate, LocatorOptions, TypeLocator, DEFAULT_MAX_ARCHIVE_DEPTH};

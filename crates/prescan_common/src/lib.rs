//! Shared foundational types used across the prescan toolchain.
//!
//! This crate provides the [`DiscoveredType`] and [`LocatedType`] records
//! produced by the type locator, and helpers for converting between the
//! internal (`a/b/C`) and qualified (`a.b.C`) forms of type names.

#![warn(missing_docs)]

pub mod discovered;
pub mod name;

pub use discovered::{DiscoveredType, LocatedType};
pub use name::{internal_to_qualified, package_of};

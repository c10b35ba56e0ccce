//! The classification policy capability.

use prescan_classfile::TypeDescriptor;

/// Decides which types need behavioural transformation.
///
/// Supplied by the instrumentation engine; the cache has no opinion on its
/// rules. Implementations must be deterministic for a cache to be reusable.
pub trait ClassificationPolicy {
    /// Returns `true` if a type is excluded by name alone. Checked before any
    /// resolution is attempted.
    fn is_globally_ignored(&self, name: &str) -> bool;

    /// Returns `true` if a resolved type requires transformation.
    fn matches_any(&self, descriptor: &TypeDescriptor) -> bool;
}

impl<T: ClassificationPolicy + ?Sized> ClassificationPolicy for &T {
    fn is_globally_ignored(&self, name: &str) -> bool {
        (**self).is_globally_ignored(name)
    }

    fn matches_any(&self, descriptor: &TypeDescriptor) -> bool {
        (**self).matches_any(descriptor)
    }
}

impl<T: ClassificationPolicy + ?Sized> ClassificationPolicy for Box<T> {
    fn is_globally_ignored(&self, name: &str) -> bool {
        (**self).is_globally_ignored(name)
    }

    fn matches_any(&self, descriptor: &TypeDescriptor) -> bool {
        (**self).matches_any(descriptor)
    }
}

//! Mapping between runtime releases and class-file major versions.

/// Class-file major version of Java 1.0/1.1; release `N` maps to `N + 44`.
const MAJOR_OFFSET: u16 = 44;

/// Returns the class-file major version a runtime release emits.
pub const fn release_to_class_major(release: u32) -> Option<u16> {
    if release < 1 || release > (u16::MAX - MAJOR_OFFSET) as u32 {
        return None;
    }
    Some(release as u16 + MAJOR_OFFSET)
}

/// Returns the runtime release that introduced a class-file major version.
pub const fn class_major_to_release(major: u16) -> Option<u32> {
    if major <= MAJOR_OFFSET {
        return None;
    }
    Some((major - MAJOR_OFFSET) as u32)
}

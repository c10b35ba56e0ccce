//! Type name conversions.

/// Converts an internal binary name (`com/example/Outer$Inner`) to its
/// qualified form (`com.example.Outer$Inner`).
pub fn internal_to_qualified(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Returns the package of a qualified name: everything before the last `.`.
///
/// Types in the default package yield the empty string.
pub fn package_of(qualified: &str) -> &str {
    qualified
        .rsplit_once('.')
        .map(|(package, _)| package)
        .unwrap_or("")
}

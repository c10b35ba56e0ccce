//! Classification of located types into an outcome table.
//!
//! Each type is decided in a fixed priority order:
//!
//! 1. A name the policy excludes globally is `IGNORE`, and is never loaded.
//! 2. Otherwise the loader resolves it; any resolution error is `FAIL` with
//!    the error's description, and the build moves on to the next type.
//! 3. A resolved type the policy matches is `TRANSFORM`, otherwise `SKIP`.

use std::collections::HashSet;

use prescan_classfile::TypeLoader;
use prescan_common::LocatedType;

use crate::codec::CacheMetadata;
use crate::outcome::{Outcome, OutcomeRecord, OutcomeTable, Stats};
use crate::policy::ClassificationPolicy;

/// Builds outcome tables for one runtime and build-tool version.
///
/// The runtime major version and build-tool version are stamped into the
/// persisted cache and re-validated on every load.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    runtime_major: u32,
    tool_version: String,
}

impl CacheBuilder {
    /// Creates a builder for the given runtime and build-tool version.
    pub fn new(runtime_major: u32, tool_version: impl Into<String>) -> Self {
        Self {
            runtime_major,
            tool_version: tool_version.into(),
        }
    }

    /// Returns the target runtime major version.
    pub fn runtime_major(&self) -> u32 {
        self.runtime_major
    }

    /// Returns the build-tool version.
    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    /// Returns the metadata to stamp into a serialized cache.
    pub fn metadata(&self) -> CacheMetadata {
        CacheMetadata::new(self.runtime_major, self.tool_version.clone())
    }

    /// Classifies every located type.
    ///
    /// A name seen earlier in `located` is not classified again. The returned
    /// stats are a tally of the returned table.
    pub fn build<I, L, P>(&self, located: I, loader: &L, policy: &P) -> (OutcomeTable, Stats)
    where
        I: IntoIterator<Item = LocatedType>,
        L: TypeLoader + ?Sized,
        P: ClassificationPolicy + ?Sized,
    {
        let mut table = OutcomeTable::new();
        let mut seen = HashSet::new();

        for ty in located {
            if !seen.insert(ty.discovered.qualified_name.clone()) {
                tracing::debug!(name = %ty.name(), "duplicate name not reclassified");
                continue;
            }
            let outcome = classify(&ty, loader, policy);
            table.push(OutcomeRecord {
                discovered: ty.discovered,
                outcome,
            });
        }

        let stats = table.stats();
        tracing::info!(
            runtime_major = self.runtime_major,
            tool_version = %self.tool_version,
            "{stats}"
        );
        (table, stats)
    }
}

/// Classifies a single located type.
pub fn classify<L, P>(ty: &LocatedType, loader: &L, policy: &P) -> Outcome
where
    L: TypeLoader + ?Sized,
    P: ClassificationPolicy + ?Sized,
{
    let name = ty.name();
    if policy.is_globally_ignored(name) {
        tracing::debug!(name = %name, "ignored");
        return Outcome::Ignore;
    }

    let descriptor = match loader.resolve(&ty.discovered, &ty.bytes) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            tracing::warn!(
                name = %name,
                origin = %ty.discovered.origin_path,
                error = %err,
                "type failed to resolve"
            );
            return Outcome::Fail {
                detail: err.to_string(),
            };
        }
    };

    if policy.matches_any(&descriptor) {
        tracing::debug!(name = %name, "transform");
        Outcome::Transform
    } else {
        tracing::debug!(name = %name, "skip");
        Outcome::Skip
    }
}

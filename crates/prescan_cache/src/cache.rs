//! Read-side type cache.

use std::collections::HashMap;

use crate::codec::CacheMetadata;
use crate::outcome::{OutcomeKind, OutcomeTable};

/// Answers "is this type known to be ignorable?" for the build it was
/// produced from.
///
/// Immutable after construction, so it can be shared freely across threads.
/// `FAIL` outcomes are not retained: a failed type is as unknown as one that
/// was never discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCache {
    /// Header the cache was built or loaded with.
    metadata: CacheMetadata,
    /// Qualified name to ignorable flag.
    entries: HashMap<Box<str>, bool>,
}

impl TypeCache {
    /// Builds a cache directly from an outcome table, without a round trip
    /// through the binary format.
    pub fn from_table(table: &OutcomeTable, metadata: CacheMetadata) -> Self {
        Self::from_entries(
            metadata,
            table
                .iter()
                .map(|record| (record.name().to_string(), record.outcome.kind())),
        )
    }

    pub(crate) fn from_entries(
        metadata: CacheMetadata,
        entries: impl IntoIterator<Item = (String, OutcomeKind)>,
    ) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|(name, kind)| kind.ignorable().map(|flag| (name.into_boxed_str(), flag)))
            .collect();
        Self { metadata, entries }
    }

    /// Returns `Some(true)` for `IGNORE` and `SKIP` types, `Some(false)` for
    /// `TRANSFORM` types, and `None` for anything else, including failures.
    pub fn is_ignorable(&self, qualified_name: &str) -> Option<bool> {
        self.entries.get(qualified_name).copied()
    }

    /// Returns the number of names with a definite answer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no name has a definite answer.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the header this cache was built or loaded with.
    pub fn metadata(&self) -> &CacheMetadata {
        &self.metadata
    }
}

//! Classification outcomes and their tallies.

use std::collections::HashSet;
use std::fmt;

use prescan_common::DiscoveredType;
use serde::{Deserialize, Serialize};

/// The four outcome tags, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The name matched a global exclusion; nothing was loaded.
    Ignore,
    /// Resolved, and the policy requires no transformation.
    Skip,
    /// Resolved, and the policy requires transformation.
    Transform,
    /// Resolution failed.
    Fail,
}

impl OutcomeKind {
    /// All kinds, in tag order.
    pub const ALL: [OutcomeKind; 4] = [Self::Ignore, Self::Skip, Self::Transform, Self::Fail];

    /// Returns the single-byte wire tag.
    pub fn tag(self) -> u8 {
        match self {
            Self::Ignore => 0,
            Self::Skip => 1,
            Self::Transform => 2,
            Self::Fail => 3,
        }
    }

    /// Parses a wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Returns the upper-case label used in the text report.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ignore => "IGNORE",
            Self::Skip => "SKIP",
            Self::Transform => "TRANSFORM",
            Self::Fail => "FAIL",
        }
    }

    /// What the read-side cache answers for a type with this outcome.
    ///
    /// Failed types have no answer: callers must classify them live.
    pub fn ignorable(self) -> Option<bool> {
        match self {
            Self::Ignore | Self::Skip => Some(true),
            Self::Transform => Some(false),
            Self::Fail => None,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The classification assigned to one discovered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Globally excluded by name.
    Ignore,
    /// No transformation required.
    Skip,
    /// Transformation required.
    Transform,
    /// Resolution failed; `detail` describes the cause.
    Fail {
        /// Description of the resolution error.
        detail: String,
    },
}

impl Outcome {
    /// Returns the payload-free tag.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Ignore => OutcomeKind::Ignore,
            Self::Skip => OutcomeKind::Skip,
            Self::Transform => OutcomeKind::Transform,
            Self::Fail { .. } => OutcomeKind::Fail,
        }
    }

    /// Returns the failure detail, if this is a `Fail` outcome.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Fail { detail } => Some(detail),
            _ => None,
        }
    }
}

/// A discovered type paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// The type and where it was found.
    pub discovered: DiscoveredType,
    /// How it was classified.
    pub outcome: Outcome,
}

impl OutcomeRecord {
    /// Returns the qualified type name.
    pub fn name(&self) -> &str {
        &self.discovered.qualified_name
    }
}

/// Every outcome produced by one build.
///
/// Storage order is unspecified; use [`OutcomeTable::sorted`] where order
/// matters. Each qualified name appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeTable {
    records: Vec<OutcomeRecord>,
}

impl OutcomeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter()
    }

    /// Returns the record for a qualified name.
    pub fn get(&self, name: &str) -> Option<&OutcomeRecord> {
        self.records.iter().find(|record| record.name() == name)
    }

    /// Returns the records sorted lexicographically by qualified name.
    pub fn sorted(&self) -> Vec<&OutcomeRecord> {
        let mut sorted: Vec<&OutcomeRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        sorted
    }

    /// Counts distinct packages across all recorded types.
    pub fn package_count(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.discovered.package())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Tallies the outcomes.
    pub fn stats(&self) -> Stats {
        Stats::tally(self.records.iter().map(|record| record.outcome.kind()))
    }
}

impl FromIterator<OutcomeRecord> for OutcomeTable {
    /// Collects records, keeping the first record for each name.
    fn from_iter<I: IntoIterator<Item = OutcomeRecord>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let records = iter
            .into_iter()
            .filter(|record| seen.insert(record.name().to_string()))
            .collect();
        Self { records }
    }
}

impl<'a> IntoIterator for &'a OutcomeTable {
    type Item = &'a OutcomeRecord;
    type IntoIter = std::slice::Iter<'a, OutcomeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Outcome counts for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of `IGNORE` outcomes.
    pub ignored: usize,
    /// Number of `SKIP` outcomes.
    pub skipped: usize,
    /// Number of `TRANSFORM` outcomes.
    pub transformed: usize,
    /// Number of `FAIL` outcomes.
    pub failed: usize,
}

impl Stats {
    /// Folds a sequence of outcome kinds into counts.
    pub fn tally(kinds: impl IntoIterator<Item = OutcomeKind>) -> Self {
        kinds.into_iter().fold(Self::default(), |mut stats, kind| {
            match kind {
                OutcomeKind::Ignore => stats.ignored += 1,
                OutcomeKind::Skip => stats.skipped += 1,
                OutcomeKind::Transform => stats.transformed += 1,
                OutcomeKind::Fail => stats.failed += 1,
            }
            stats
        })
    }

    /// Total number of classified types.
    pub fn total(&self) -> usize {
        self.ignored + self.skipped + self.transformed + self.failed
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ignore: {}; Skip: {}; Transform: {}; Fail: {}",
            self.ignored, self.skipped, self.transformed, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, outcome: Outcome) -> OutcomeRecord {
        OutcomeRecord {
            discovered: DiscoveredType::new(name, format!("root/{name}.class")),
            outcome,
        }
    }

    #[test]
    fn tags_round_trip() {
        for kind in OutcomeKind::ALL {
            assert_eq!(OutcomeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(OutcomeKind::from_tag(4), None);
    }

    #[test]
    fn ignorable_mapping() {
        assert_eq!(OutcomeKind::Ignore.ignorable(), Some(true));
        assert_eq!(OutcomeKind::Skip.ignorable(), Some(true));
        assert_eq!(OutcomeKind::Transform.ignorable(), Some(false));
        assert_eq!(OutcomeKind::Fail.ignorable(), None);
    }

    #[test]
    fn labels() {
        let labels: Vec<&str> = OutcomeKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["IGNORE", "SKIP", "TRANSFORM", "FAIL"]);
        assert_eq!(OutcomeKind::Transform.to_string(), "TRANSFORM");
    }

    #[test]
    fn only_fail_carries_detail() {
        let fail = Outcome::Fail {
            detail: "boom".to_string(),
        };
        assert_eq!(fail.kind(), OutcomeKind::Fail);
        assert_eq!(fail.detail(), Some("boom"));
        assert_eq!(Outcome::Skip.detail(), None);
    }

    #[test]
    fn stats_display_shape() {
        let stats = Stats {
            ignored: 2,
            skipped: 2,
            transformed: 3,
            failed: 1,
        };
        assert_eq!(stats.to_string(), "Ignore: 2; Skip: 2; Transform: 3; Fail: 1");
        assert_eq!(stats.total(), 8);
    }

    #[test]
    fn stats_of_empty_table() {
        assert_eq!(
            OutcomeTable::new().stats().to_string(),
            "Ignore: 0; Skip: 0; Transform: 0; Fail: 0"
        );
    }

    #[test]
    fn table_sorted_and_counted() {
        let table: OutcomeTable = vec![
            record("foo.bar.xyz.Xyz", Outcome::Ignore),
            record("example.classes.Abc", Outcome::Transform),
            record("bar.foo.Baz", Outcome::Ignore),
            record("example.OuterJarClass", Outcome::Transform),
            record("foo.bar.FooBar", Outcome::Skip),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = table.sorted().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "bar.foo.Baz",
                "example.OuterJarClass",
                "example.classes.Abc",
                "foo.bar.FooBar",
                "foo.bar.xyz.Xyz",
            ]
        );
        assert_eq!(table.package_count(), 5);
        assert_eq!(table.stats().to_string(), "Ignore: 2; Skip: 1; Transform: 2; Fail: 0");
    }

    #[test]
    fn collecting_keeps_first_record_per_name() {
        let table: OutcomeTable = vec![
            record("a.A", Outcome::Transform),
            record("a.A", Outcome::Skip),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a.A").unwrap().outcome, Outcome::Transform);
    }
}

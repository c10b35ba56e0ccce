//! Configuration types deserialized from `prescan.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// Archive nesting depth used when `scan.max_archive_depth` is not set.
///
/// Mirrors `prescan_locator::DEFAULT_MAX_ARCHIVE_DEPTH` so a config file and a
/// bare locator walk agree; `prescan_cli` tests hold the two equal.
pub const DEFAULT_MAX_ARCHIVE_DEPTH: usize = 16;

/// Cache file name used when `output.cache` is not set.
pub const DEFAULT_CACHE_FILE: &str = "prescan.bin";

/// The top-level configuration parsed from `prescan.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrescanConfig {
    /// What to scan and for which runtime.
    pub scan: ScanConfig,
    /// Where build artifacts are written.
    #[serde(default)]
    pub output: OutputConfig,
    /// Rules for the config-driven classification policy.
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl PrescanConfig {
    /// Creates a configuration with default output and an empty policy.
    pub fn new(roots: Vec<String>, runtime_major: u32) -> Self {
        Self {
            scan: ScanConfig {
                roots,
                runtime_major,
                max_archive_depth: DEFAULT_MAX_ARCHIVE_DEPTH,
            },
            output: OutputConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

/// Scan settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanConfig {
    /// Directories or archives to scan, in priority order. The first
    /// definition of a type name wins.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub roots: Vec<String>,
    /// Major version of the runtime the cache is built for (e.g. `17`).
    pub runtime_major: u32,
    /// Deepest archive nesting that is still opened.
    #[serde(default = "default_max_archive_depth")]
    pub max_archive_depth: usize,
}

fn default_max_archive_depth() -> usize {
    DEFAULT_MAX_ARCHIVE_DEPTH
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Path of the binary cache.
    #[serde(default = "default_cache_file")]
    pub cache: String,
    /// Path of the text report. No report is written when unset.
    #[serde(default)]
    pub report: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cache: default_cache_file(),
            report: None,
        }
    }
}

fn default_cache_file() -> String {
    DEFAULT_CACHE_FILE.to_string()
}

/// Classification rules, all matched against dot-separated qualified names.
///
/// A type is ignored if its name starts with any `ignore_prefixes` entry. A
/// resolved type is transformed if its name is listed in `transform_types`,
/// starts with any `transform_prefixes` entry, directly extends one of
/// `transform_supertypes`, or directly implements one of
/// `transform_interfaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PolicyConfig {
    /// Name prefixes excluded from classification entirely.
    #[serde(default)]
    pub ignore_prefixes: Vec<String>,
    /// Exact type names that require transformation.
    #[serde(default)]
    pub transform_types: Vec<String>,
    /// Name prefixes that require transformation.
    #[serde(default)]
    pub transform_prefixes: Vec<String>,
    /// Direct supertypes whose subtypes require transformation.
    #[serde(default)]
    pub transform_supertypes: Vec<String>,
    /// Interfaces whose direct implementors require transformation.
    #[serde(default)]
    pub transform_interfaces: Vec<String>,
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `roots = "lib"` as shorthand for `roots = ["lib"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

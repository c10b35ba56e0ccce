//! Precomputed type classification cache.
//!
//! At build time, the [`CacheBuilder`] classifies every located type against
//! a [`ClassificationPolicy`] into one of four outcomes (ignore, skip,
//! transform, fail) and produces an [`OutcomeTable`]. The table is persisted
//! with [`codec::serialize`] and rendered for humans with
//! [`report::write_report`].
//!
//! At process start, [`codec::deserialize`] validates the stream's format,
//! runtime, and build-tool versions before reading any entry, and produces a
//! read-only [`TypeCache`] answering "is this type known to be ignorable?".

#![warn(missing_docs)]

pub mod builder;
pub mod cache;
pub mod codec;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod report;

pub use builder::CacheBuilder;
pub use cache::TypeCache;
pub use codec::{
    deserialize, load_from_path, read_metadata, read_summary, read_summary_from_path, serialize,
    write_to_path, CacheMetadata, FORMAT_VERSION,
};
pub use error::CacheError;
pub use outcome::{Outcome, OutcomeKind, OutcomeRecord, OutcomeTable, Stats};
pub use policy::ClassificationPolicy;
pub use report::{render_report, write_report};

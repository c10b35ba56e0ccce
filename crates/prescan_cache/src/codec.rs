//! Binary cache format.
//!
//! Layout, all integers big-endian and fixed width:
//!
//! ```text
//! u32  format version
//! u32  runtime major version
//! str  build-tool version
//! u32  entry count
//! per entry:
//!   u8   outcome tag (0 IGNORE, 1 SKIP, 2 TRANSFORM, 3 FAIL)
//!   str  qualified name
//!   str  failure detail (FAIL entries only)
//! ```
//!
//! where `str` is a `u64` byte length followed by UTF-8 bytes. Origin paths
//! are not persisted. Any change to this layout requires bumping
//! [`FORMAT_VERSION`].
//!
//! Loading checks the format version, then the runtime version, then the
//! build-tool version, and reads no entry until all three match.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bincode::config::Config;
use serde::Serialize;

use crate::cache::TypeCache;
use crate::error::CacheError;
use crate::outcome::{Outcome, OutcomeKind, OutcomeTable, Stats};

/// Current binary format version.
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on the encoded size of any single field. A corrupt length
/// prefix beyond this fails before anything is allocated.
const MAX_FIELD_BYTES: usize = 1 << 20;

/// Failure details longer than this are cut at a character boundary.
const MAX_DETAIL_BYTES: usize = 64 * 1024;

/// Largest entry count pre-reserved when loading; larger tables still load,
/// they just grow on demand.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 16;

fn wire_config() -> impl Config {
    bincode::config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
        .with_limit::<MAX_FIELD_BYTES>()
}

/// Header written once per cache, read first on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheMetadata {
    /// Binary layout version.
    pub format_version: u32,
    /// Runtime major version the cache was built for.
    pub runtime_major: u32,
    /// Version of the tool that built the cache.
    pub tool_version: String,
}

impl CacheMetadata {
    /// Creates metadata stamped with the current [`FORMAT_VERSION`].
    pub fn new(runtime_major: u32, tool_version: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            runtime_major,
            tool_version: tool_version.into(),
        }
    }
}

/// Writes an outcome table in the binary cache format.
///
/// Entries are written sorted by name, so equal tables produce identical bytes.
pub fn serialize<W: Write>(
    table: &OutcomeTable,
    metadata: &CacheMetadata,
    writer: &mut W,
) -> Result<(), CacheError> {
    let count = u32::try_from(table.len()).map_err(|_| CacheError::Serialization {
        reason: format!("{} entries exceed the format limit", table.len()),
    })?;

    write_field(writer, metadata.format_version)?;
    write_field(writer, metadata.runtime_major)?;
    write_str(writer, &metadata.tool_version)?;
    write_field(writer, count)?;

    for record in table.sorted() {
        write_field(writer, record.outcome.kind().tag())?;
        write_str(writer, record.name())?;
        if let Outcome::Fail { detail } = &record.outcome {
            write_str(writer, truncate_at_boundary(detail, MAX_DETAIL_BYTES))?;
        }
    }
    Ok(())
}

/// Reads a binary cache, validating it against the caller's runtime and
/// build-tool versions.
pub fn deserialize<R: Read>(
    reader: &mut R,
    runtime_major: u32,
    tool_version: &str,
) -> Result<TypeCache, CacheError> {
    let metadata = read_metadata(reader)?;

    if metadata.runtime_major != runtime_major {
        return Err(CacheError::IncompatibleRuntimeVersion {
            expected: runtime_major,
            actual: metadata.runtime_major,
        });
    }
    if metadata.tool_version != tool_version {
        return Err(CacheError::IncompatibleToolVersion {
            expected: tool_version.to_string(),
            actual: metadata.tool_version,
        });
    }

    let entries = read_entries(reader)?;
    tracing::debug!(entries = entries.len(), runtime_major, "type cache loaded");
    Ok(TypeCache::from_entries(metadata, entries))
}

/// Reads a whole binary cache without validating the runtime or build-tool
/// version, and tallies its entries by outcome.
pub fn read_summary<R: Read>(reader: &mut R) -> Result<(CacheMetadata, Stats), CacheError> {
    let metadata = read_metadata(reader)?;
    let entries = read_entries(reader)?;
    Ok((metadata, Stats::tally(entries.into_iter().map(|(_, kind)| kind))))
}

/// Reads the entry count and every entry that follows it, then requires the
/// stream to end.
fn read_entries<R: Read>(reader: &mut R) -> Result<Vec<(String, OutcomeKind)>, CacheError> {
    let count = read_field::<u32, _>(reader)? as usize;
    let mut entries = Vec::with_capacity(count.min(MAX_PREALLOCATED_ENTRIES));
    for _ in 0..count {
        let tag = read_field::<u8, _>(reader)?;
        let kind = OutcomeKind::from_tag(tag).ok_or_else(|| CacheError::Deserialization {
            reason: format!("unknown outcome tag {tag}"),
        })?;
        let name = read_field::<String, _>(reader)?;
        if kind == OutcomeKind::Fail {
            // Details are audit text only; the lookup never needs them.
            read_field::<String, _>(reader)?;
        }
        entries.push((name, kind));
    }

    let mut extra = [0u8; 1];
    match reader.read(&mut extra) {
        Ok(0) => Ok(entries),
        Ok(_) => Err(CacheError::Deserialization {
            reason: "trailing data after last entry".to_string(),
        }),
        Err(err) => Err(CacheError::Deserialization {
            reason: err.to_string(),
        }),
    }
}

/// Reads only the header of a binary cache.
///
/// The format version must still match [`FORMAT_VERSION`], since nothing
/// after it can be interpreted otherwise; the runtime and build-tool versions
/// are returned unchecked.
pub fn read_metadata<R: Read>(reader: &mut R) -> Result<CacheMetadata, CacheError> {
    let format_version = read_field::<u32, _>(reader)?;
    if format_version != FORMAT_VERSION {
        return Err(CacheError::UnexpectedFormatVersion {
            expected: FORMAT_VERSION,
            actual: format_version,
        });
    }
    let runtime_major = read_field::<u32, _>(reader)?;
    let tool_version = read_field::<String, _>(reader)?;
    Ok(CacheMetadata {
        format_version,
        runtime_major,
        tool_version,
    })
}

/// Writes a binary cache file.
///
/// The cache is written to a sibling temporary file and renamed over `path`
/// once complete, so a failed write leaves any previous cache untouched.
pub fn write_to_path(
    table: &OutcomeTable,
    metadata: &CacheMetadata,
    path: &Path,
) -> Result<(), CacheError> {
    let staging = staging_path(path);
    let result = write_staged(table, metadata, &staging).and_then(|()| {
        fs::rename(&staging, path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        fs::remove_file(&staging).ok();
    }
    result
}

fn write_staged(
    table: &OutcomeTable,
    metadata: &CacheMetadata,
    staging: &Path,
) -> Result<(), CacheError> {
    let io_err = |source| CacheError::Io {
        path: staging.to_path_buf(),
        source,
    };
    let file = File::create(staging).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serialize(table, metadata, &mut writer)?;
    writer.flush().map_err(io_err)?;
    writer.get_ref().sync_all().map_err(io_err)
}

/// `dir/.name.tmp` next to `path`, on the same filesystem so the rename is atomic.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| OsStr::new("prescan.bin")));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Loads a binary cache file. The file is closed on every return path.
pub fn load_from_path(
    path: &Path,
    runtime_major: u32,
    tool_version: &str,
) -> Result<TypeCache, CacheError> {
    let file = File::open(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize(&mut BufReader::new(file), runtime_major, tool_version)
}

/// Reads the header and entry tallies of a binary cache file.
pub fn read_summary_from_path(path: &Path) -> Result<(CacheMetadata, Stats), CacheError> {
    let file = File::open(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_summary(&mut BufReader::new(file))
}

fn write_field<E: bincode::Encode, W: Write>(writer: &mut W, value: E) -> Result<(), CacheError> {
    bincode::encode_into_std_write(value, writer, wire_config())
        .map(|_| ())
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
}

fn write_str<W: Write>(writer: &mut W, value: &str) -> Result<(), CacheError> {
    // Length prefix plus payload must fit the per-field read limit.
    if value.len() + 8 > MAX_FIELD_BYTES {
        return Err(CacheError::Serialization {
            reason: format!("string of {} bytes exceeds the field limit", value.len()),
        });
    }
    write_field(writer, value)
}

fn read_field<D: bincode::Decode<()>, R: Read>(reader: &mut R) -> Result<D, CacheError> {
    bincode::decode_from_std_read(reader, wire_config()).map_err(|e| {
        CacheError::Deserialization {
            reason: e.to_string(),
        }
    })
}

fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

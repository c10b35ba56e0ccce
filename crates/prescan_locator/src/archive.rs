//! Archive inspection: content sniffing, manifest reading, and the
//! per-archive entry plan.
//!
//! When an archive is opened, its entry names are turned into a plan up
//! front: which entries are types, which are nested archives, and, for
//! multi-release archives, which version-specific variant of each type
//! applies to the target runtime. Entries are then read lazily in plan order.

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::LocateWarning;

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";
const MANIFEST_NAME: &str = "META-INF/MANIFEST.MF";
const VERSIONS_PREFIX: &str = "META-INF/versions/";
const ARCHIVE_EXTENSIONS: [&str; 4] = ["jar", "war", "ear", "zip"];

/// Any seekable byte source an archive can be read from.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Returns `true` if `header` starts with a zip local file header.
pub fn is_archive(header: &[u8]) -> bool {
    header.starts_with(&ZIP_MAGIC)
}

/// Returns `true` if an entry name has an archive extension.
pub fn has_archive_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ARCHIVE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// What a planned entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A class definition.
    Class,
    /// An archive embedded in this one.
    Archive,
}

/// An entry selected for reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Index of the entry in the archive's central directory.
    pub index: usize,
    /// Stored entry name, including any `META-INF/versions/N/` prefix.
    pub stored_name: String,
    /// What the entry holds.
    pub kind: EntryKind,
}

/// Returns `true` if manifest text declares `Multi-Release: true`.
pub fn is_multi_release(manifest: &str) -> bool {
    main_section(manifest).any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("Multi-Release")
                && value.trim().eq_ignore_ascii_case("true")
        })
    })
}

/// Lines of the manifest's main section, which ends at the first blank line.
/// Per-entry sections that follow do not configure the archive.
fn main_section(manifest: &str) -> impl Iterator<Item = &str> {
    manifest.lines().take_while(|line| !line.trim().is_empty())
}

/// Selects the entries to read from an archive.
///
/// `files` lists `(index, name)` for every non-directory entry. For each
/// logical path the variant with the highest version not above
/// `runtime_major` wins; the unversioned entry counts as version 0. Versioned
/// entries are only honoured when `multi_release` is set. The plan is sorted
/// by logical path.
pub fn plan_entries(
    files: &[(usize, String)],
    multi_release: bool,
    runtime_major: u32,
) -> Vec<PlannedEntry> {
    let mut selected: BTreeMap<&str, (u32, PlannedEntry)> = BTreeMap::new();

    for (index, name) in files {
        let (logical, version) = match name.strip_prefix(VERSIONS_PREFIX) {
            Some(rest) => {
                if !multi_release {
                    continue;
                }
                let Some((version, path)) = rest.split_once('/') else {
                    continue;
                };
                match version.parse::<u32>() {
                    Ok(version) if version <= runtime_major => (path, version),
                    _ => continue,
                }
            }
            None => (name.as_str(), 0),
        };

        let Some(kind) = classify_entry(logical, version) else {
            continue;
        };

        let candidate = PlannedEntry {
            index: *index,
            stored_name: name.clone(),
            kind,
        };
        let replace = selected
            .get(logical)
            .map_or(true, |(existing, _)| version > *existing);
        if replace {
            selected.insert(logical, (version, candidate));
        }
    }

    selected.into_values().map(|(_, entry)| entry).collect()
}

fn classify_entry(logical: &str, version: u32) -> Option<EntryKind> {
    let file_name = logical.rsplit('/').next().unwrap_or(logical);
    if file_name.ends_with(".class") {
        if file_name == "module-info.class" || file_name == "package-info.class" {
            return None;
        }
        return Some(EntryKind::Class);
    }
    // Nested archives are only meaningful in the base layer.
    if version == 0 && has_archive_extension(file_name) {
        return Some(EntryKind::Archive);
    }
    None
}

/// An open archive being drained entry by entry.
pub struct ArchiveCursor {
    origin: String,
    depth: usize,
    archive: ZipArchive<Box<dyn ReadSeek>>,
    planned: std::vec::IntoIter<PlannedEntry>,
}

/// One entry read out of an archive.
pub struct ReadEntry {
    /// Human-readable location of the entry.
    pub origin: String,
    /// What the entry holds.
    pub kind: EntryKind,
    /// Entry contents.
    pub bytes: Vec<u8>,
}

impl ArchiveCursor {
    /// Opens an archive and plans its entries.
    pub fn open(
        origin: String,
        depth: usize,
        source: Box<dyn ReadSeek>,
        runtime_major: u32,
    ) -> Result<Self, zip::result::ZipError> {
        let mut archive = ZipArchive::new(source)?;

        let multi_release = read_manifest(&mut archive)
            .map(|manifest| is_multi_release(&manifest))
            .unwrap_or(false);

        let mut files = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index(index)?;
            if !entry.is_dir() {
                files.push((index, entry.name().to_string()));
            }
        }

        let planned = plan_entries(&files, multi_release, runtime_major);
        tracing::debug!(
            archive = %origin,
            entries = planned.len(),
            multi_release,
            "opened archive"
        );

        Ok(Self {
            origin,
            depth,
            archive,
            planned: planned.into_iter(),
        })
    }

    /// Returns the human-readable location of this archive.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the nesting depth; archives found directly under a root are 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Reads the next planned entry.
    ///
    /// Returns `None` once the plan is exhausted, and `Some(Err(..))` if that
    /// one entry could not be read.
    pub fn next_entry(&mut self) -> Option<Result<ReadEntry, LocateWarning>> {
        let planned = self.planned.next()?;
        let origin = format!("{}/{}", self.origin, planned.stored_name);

        let mut entry = match self.archive.by_index(planned.index) {
            Ok(entry) => entry,
            Err(err) => {
                return Some(Err(LocateWarning::Unreadable {
                    origin,
                    reason: err.to_string(),
                }))
            }
        };
        let mut bytes = Vec::with_capacity(entry.size().min(1 << 20) as usize);
        if let Err(err) = entry.read_to_end(&mut bytes) {
            return Some(Err(LocateWarning::Unreadable {
                origin,
                reason: err.to_string(),
            }));
        }

        Some(Ok(ReadEntry {
            origin,
            kind: planned.kind,
            bytes,
        }))
    }
}

fn read_manifest(archive: &mut ZipArchive<Box<dyn ReadSeek>>) -> Option<String> {
    let mut entry = archive.by_name(MANIFEST_NAME).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;
    Some(content)
}

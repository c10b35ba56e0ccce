//! The type locator and its lazy walk.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use prescan_classfile::{is_class_file, parse_descriptor};
use prescan_common::{DiscoveredType, LocatedType};
use walkdir::WalkDir;

use crate::archive::{is_archive, ArchiveCursor, EntryKind, ReadSeek};
use crate::error::{LocateError, LocateWarning};

/// Default limit on archive-within-archive nesting.
pub const DEFAULT_MAX_ARCHIVE_DEPTH: usize = 16;

/// Settings that shape a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Target runtime major version; selects multi-release variants.
    pub runtime_major: u32,

    /// Deepest archive nesting that is still opened. Archives found directly
    /// under a root are at depth 1.
    pub max_archive_depth: usize,
}

impl LocatorOptions {
    /// Options for the given runtime with the default nesting limit.
    pub fn new(runtime_major: u32) -> Self {
        Self {
            runtime_major,
            max_archive_depth: DEFAULT_MAX_ARCHIVE_DEPTH,
        }
    }
}

/// Finds type definitions under root locations.
///
/// A locator is cheap and reusable: every call to [`TypeLocator::locate`]
/// starts a fresh walk.
#[derive(Debug, Clone)]
pub struct TypeLocator {
    options: LocatorOptions,
}

impl TypeLocator {
    /// Creates a locator with the given options.
    pub fn new(options: LocatorOptions) -> Self {
        Self { options }
    }

    /// Returns the options this locator walks with.
    pub fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Starts a walk over a single root (a directory, archive, or class file).
    pub fn locate(&self, root: &Path) -> Result<Locate, LocateError> {
        self.locate_all([root])
    }

    /// Starts a walk over several roots, visited in order.
    ///
    /// Deduplication spans all roots: a name defined under an earlier root
    /// shadows later definitions of the same name.
    pub fn locate_all<I, P>(&self, roots: I) -> Result<Locate, LocateError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let roots: Vec<PathBuf> = roots
            .into_iter()
            .map(|root| root.as_ref().to_path_buf())
            .collect();
        for root in &roots {
            if !root.exists() {
                return Err(LocateError::RootNotFound { path: root.clone() });
            }
        }

        // Last root on top of the stack so roots are visited in order.
        let stack = roots
            .into_iter()
            .rev()
            .map(|root| Container::Directory(DirectoryCursor::new(&root)))
            .collect();

        Ok(Locate {
            options: self.options,
            stack,
            seen: HashSet::new(),
            warnings: Vec::new(),
        })
    }
}

/// A lazy walk yielding each distinct type definition once.
///
/// Open containers live on an explicit stack: the walk always drains the
/// innermost open archive before resuming its parent.
pub struct Locate {
    options: LocatorOptions,
    stack: Vec<Container>,
    seen: HashSet<String>,
    warnings: Vec<LocateWarning>,
}

impl Locate {
    /// Returns the diagnostics collected so far.
    pub fn warnings(&self) -> &[LocateWarning] {
        &self.warnings
    }

    /// Consumes the walk and returns its diagnostics.
    pub fn into_warnings(self) -> Vec<LocateWarning> {
        self.warnings
    }

    fn warn(&mut self, warning: LocateWarning) {
        tracing::warn!(origin = %warning.origin(), "{warning}");
        self.warnings.push(warning);
    }

    fn open_archive(&mut self, origin: String, depth: usize, source: Box<dyn ReadSeek>) {
        if depth > self.options.max_archive_depth {
            self.warn(LocateWarning::DepthExceeded {
                origin,
                depth,
                limit: self.options.max_archive_depth,
            });
            return;
        }
        match ArchiveCursor::open(origin.clone(), depth, source, self.options.runtime_major) {
            Ok(cursor) => self.stack.push(Container::Archive(cursor)),
            Err(err) => self.warn(LocateWarning::CorruptArchive {
                origin,
                reason: err.to_string(),
            }),
        }
    }

    /// Turns class bytes into a located type, unless the name was seen before.
    fn accept(&mut self, origin: String, bytes: Vec<u8>) -> Option<LocatedType> {
        let name = match parse_descriptor(&bytes) {
            Ok(descriptor) => descriptor.name,
            Err(err) => {
                self.warn(LocateWarning::UnparsableClass {
                    origin,
                    reason: err.to_string(),
                });
                return None;
            }
        };

        if name == "module-info" || name == "package-info" || name.ends_with(".package-info") {
            return None;
        }

        if !self.seen.insert(name.clone()) {
            tracing::debug!(name = %name, origin = %origin, "shadowed definition skipped");
            return None;
        }

        Some(LocatedType::new(DiscoveredType::new(name, origin), bytes))
    }
}

impl Iterator for Locate {
    type Item = LocatedType;

    fn next(&mut self) -> Option<LocatedType> {
        loop {
            let step = match self.stack.last_mut()? {
                Container::Directory(dir) => dir.advance(),
                Container::Archive(archive) => match archive.next_entry() {
                    None => Step::Exhausted,
                    Some(Err(warning)) => Step::Warning(warning),
                    Some(Ok(entry)) => match entry.kind {
                        EntryKind::Class => Step::Class {
                            origin: entry.origin,
                            bytes: entry.bytes,
                        },
                        EntryKind::Archive => Step::Archive {
                            origin: entry.origin,
                            depth: archive.depth() + 1,
                            source: Box::new(Cursor::new(entry.bytes)),
                        },
                    },
                },
            };

            match step {
                Step::Exhausted => {
                    self.stack.pop();
                }
                Step::Nothing => {}
                Step::Warning(warning) => self.warn(warning),
                Step::Archive {
                    origin,
                    depth,
                    source,
                } => self.open_archive(origin, depth, source),
                Step::Class { origin, bytes } => {
                    if let Some(located) = self.accept(origin, bytes) {
                        return Some(located);
                    }
                }
            }
        }
    }
}

enum Container {
    Directory(DirectoryCursor),
    Archive(ArchiveCursor),
}

/// Outcome of advancing the top container by one entry.
enum Step {
    Exhausted,
    Nothing,
    Warning(LocateWarning),
    Class {
        origin: String,
        bytes: Vec<u8>,
    },
    Archive {
        origin: String,
        depth: usize,
        source: Box<dyn ReadSeek>,
    },
}

struct DirectoryCursor {
    walker: walkdir::IntoIter,
}

impl DirectoryCursor {
    fn new(root: &Path) -> Self {
        Self {
            walker: WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter(),
        }
    }

    /// Files are recognised by content, not by extension, so a class file
    /// stored under an arbitrary name is still found. Symlinks are followed;
    /// a link cycle surfaces as an unreadable-entry warning.
    fn advance(&mut self) -> Step {
        let entry = match self.walker.next() {
            None => return Step::Exhausted,
            Some(Err(err)) => {
                let origin = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                return Step::Warning(LocateWarning::Unreadable {
                    origin,
                    reason: err.to_string(),
                });
            }
            Some(Ok(entry)) => entry,
        };
        if !entry.file_type().is_file() {
            return Step::Nothing;
        }

        let path = entry.path();
        let origin = path.display().to_string();

        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(err) => return unreadable(origin, err),
        };
        let mut header = [0u8; 4];
        let filled = match read_prefix(&mut file, &mut header) {
            Ok(filled) => filled,
            Err(err) => return unreadable(origin, err),
        };
        let header = &header[..filled];

        if is_class_file(header) {
            let mut bytes = header.to_vec();
            if let Err(err) = file.read_to_end(&mut bytes) {
                return unreadable(origin, err);
            }
            Step::Class { origin, bytes }
        } else if is_archive(header) {
            // Reopen so the archive reader starts at offset 0.
            match File::open(path) {
                Ok(file) => Step::Archive {
                    origin,
                    depth: 1,
                    source: Box::new(BufReader::new(file)),
                },
                Err(err) => unreadable(origin, err),
            }
        } else {
            Step::Nothing
        }
    }
}

fn unreadable(origin: String, err: std::io::Error) -> Step {
    Step::Warning(LocateWarning::Unreadable {
        origin,
        reason: err.to_string(),
    })
}

/// Fills as much of `buf` as the reader allows, returning the count read.
fn read_prefix(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

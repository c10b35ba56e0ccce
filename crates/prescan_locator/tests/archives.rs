//! Walks over real archive layouts written at test time: archives nested in
//! archives, multi-release archives, and archives nested beyond the limit.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use prescan_classfile::fixtures::ClassFixture;
use prescan_common::LocatedType;
use prescan_locator::{LocateWarning, LocatorOptions, TypeLocator};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Builds an in-memory zip archive from `(entry name, contents)` pairs.
fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn class(internal: &str) -> Vec<u8> {
    ClassFixture::new(internal).build()
}

fn write(dir: &Path, rel: &str, bytes: &[u8]) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

fn find<'a>(found: &'a [LocatedType], name: &str) -> &'a LocatedType {
    found
        .iter()
        .find(|t| t.name() == name)
        .unwrap_or_else(|| panic!("{name} not located"))
}

// ---------------------------------------------------------------------------
// Nested archives
// ---------------------------------------------------------------------------

#[test]
fn descends_into_archives_within_archives() {
    let inner = zip_bytes(&[("example/InnerJarClass.class", class("example/InnerJarClass"))]);
    let middle = zip_bytes(&[
        ("example/MiddleJarClass.class", class("example/MiddleJarClass")),
        ("InnerJarClass.jar", inner),
    ]);
    let outer = zip_bytes(&[
        ("example/OuterJarClass.class", class("example/OuterJarClass")),
        ("Middle.jar", middle),
    ]);

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "inner-jars/example.jar", &outer);

    let locator = TypeLocator::new(LocatorOptions::new(9));
    let found: Vec<LocatedType> = locator.locate(dir.path()).unwrap().collect();
    assert_eq!(found.len(), 3);

    let inner = find(&found, "example.InnerJarClass");
    assert!(inner
        .discovered
        .origin_path
        .ends_with("inner-jars/example.jar/Middle.jar/InnerJarClass.jar/example/InnerJarClass.class"));

    let middle = find(&found, "example.MiddleJarClass");
    assert!(middle
        .discovered
        .origin_path
        .ends_with("inner-jars/example.jar/Middle.jar/example/MiddleJarClass.class"));

    let outer = find(&found, "example.OuterJarClass");
    assert!(outer
        .discovered
        .origin_path
        .ends_with("inner-jars/example.jar/example/OuterJarClass.class"));
    assert_eq!(outer.bytes, class("example/OuterJarClass"));
}

#[test]
fn archive_can_be_the_root() {
    let dir = tempfile::tempdir().unwrap();
    let jar = dir.path().join("app.jar");
    fs::write(&jar, zip_bytes(&[("a/A.class", class("a/A"))])).unwrap();

    let locator = TypeLocator::new(LocatorOptions::new(17));
    let found: Vec<LocatedType> = locator.locate(&jar).unwrap().collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].discovered.origin_path, format!("{}/a/A.class", jar.display()));
}

#[test]
fn nesting_beyond_limit_is_reported() {
    let level3 = zip_bytes(&[("c/C.class", class("c/C"))]);
    let level2 = zip_bytes(&[("b/B.class", class("b/B")), ("level3.jar", level3)]);
    let level1 = zip_bytes(&[("a/A.class", class("a/A")), ("level2.jar", level2)]);

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "level1.jar", &level1);

    let options = LocatorOptions {
        runtime_major: 17,
        max_archive_depth: 2,
    };
    let mut locate = TypeLocator::new(options).locate(dir.path()).unwrap();
    let names: Vec<String> = locate
        .by_ref()
        .map(|t| t.discovered.qualified_name)
        .collect();
    assert_eq!(names, vec!["a.A", "b.B"]);

    let warnings = locate.warnings();
    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        LocateWarning::DepthExceeded { origin, depth, limit } => {
            assert!(origin.ends_with("level1.jar/level2.jar/level3.jar"));
            assert_eq!(*depth, 3);
            assert_eq!(*limit, 2);
        }
        other => panic!("unexpected warning {other:?}"),
    }
}

#[test]
fn corrupt_nested_archive_does_not_stop_the_walk() {
    let outer = zip_bytes(&[
        ("broken.jar", b"definitely not a zip".to_vec()),
        ("z/Z.class", class("z/Z")),
    ]);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "outer.jar", &outer);

    let mut locate = TypeLocator::new(LocatorOptions::new(17))
        .locate(dir.path())
        .unwrap();
    let names: Vec<String> = locate.by_ref().map(|t| t.discovered.qualified_name).collect();
    assert_eq!(names, vec!["z.Z"]);
    assert!(matches!(
        locate.warnings()[0],
        LocateWarning::CorruptArchive { .. }
    ));
}

// ---------------------------------------------------------------------------
// Multi-release archives
// ---------------------------------------------------------------------------

fn multi_release_jar() -> Vec<u8> {
    zip_bytes(&[
        (
            "META-INF/MANIFEST.MF",
            b"Manifest-Version: 1.0\r\nMulti-Release: true\r\n".to_vec(),
        ),
        ("example/classes/Abc.class", class("example/classes/Abc")),
        (
            "META-INF/versions/9/example/classes/Abc.class",
            ClassFixture::new("example/classes/Abc").major_version(53).build(),
        ),
        (
            "META-INF/versions/9/example/classes/Only9.class",
            ClassFixture::new("example/classes/Only9").major_version(53).build(),
        ),
        (
            "META-INF/versions/11/example/classes/Only11.class",
            ClassFixture::new("example/classes/Only11").major_version(55).build(),
        ),
    ])
}

#[test]
fn multi_release_variant_selected_for_runtime() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "multi-release-jar/multi-release.jar", &multi_release_jar());

    let found: Vec<LocatedType> = TypeLocator::new(LocatorOptions::new(9))
        .locate(dir.path())
        .unwrap()
        .collect();
    let mut names: Vec<&str> = found.iter().map(|t| t.name()).collect();
    names.sort();
    assert_eq!(names, vec!["example.classes.Abc", "example.classes.Only9"]);

    let abc = find(&found, "example.classes.Abc");
    assert!(abc
        .discovered
        .origin_path
        .ends_with("multi-release.jar/META-INF/versions/9/example/classes/Abc.class"));
    assert_eq!(abc.bytes[7], 53);
}

#[test]
fn base_variant_used_on_older_runtime() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "multi-release.jar", &multi_release_jar());

    let found: Vec<LocatedType> = TypeLocator::new(LocatorOptions::new(8))
        .locate(dir.path())
        .unwrap()
        .collect();
    assert_eq!(found.len(), 1);
    assert!(found[0]
        .discovered
        .origin_path
        .ends_with("multi-release.jar/example/classes/Abc.class"));
}

#[test]
fn shadowed_definition_in_later_archive_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.jar", &zip_bytes(&[("x/Dup.class", class("x/Dup"))]));
    write(dir.path(), "b.jar", &zip_bytes(&[("x/Dup.class", class("x/Dup"))]));

    let found: Vec<LocatedType> = TypeLocator::new(LocatorOptions::new(17))
        .locate(dir.path())
        .unwrap()
        .collect();
    assert_eq!(found.len(), 1);
    assert!(found[0].discovered.origin_path.contains("a.jar"));
}

// ---------------------------------------------------------------------------
// Symlinks
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn symlinked_classes_jars_and_directories_are_followed() {
    use std::os::unix::fs::symlink;

    let outside = tempfile::tempdir().unwrap();
    write(outside.path(), "A.class", &class("a/A"));
    write(outside.path(), "lib.jar", &zip_bytes(&[("j/J.class", class("j/J"))]));
    write(outside.path(), "shared/s/S.class", &class("s/S"));

    let root = tempfile::tempdir().unwrap();
    write(root.path(), "B.class", &class("a/B"));
    symlink(outside.path().join("A.class"), root.path().join("A.class")).unwrap();
    symlink(outside.path().join("lib.jar"), root.path().join("lib.jar")).unwrap();
    symlink(outside.path().join("shared"), root.path().join("shared")).unwrap();

    let mut locate = TypeLocator::new(LocatorOptions::new(17))
        .locate(root.path())
        .unwrap();
    let mut names: Vec<String> = locate
        .by_ref()
        .map(|t| t.discovered.qualified_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.A", "a.B", "j.J", "s.S"]);
    assert!(locate.warnings().is_empty());
}

#[cfg(unix)]
#[test]
fn symlink_cycle_is_reported() {
    use std::os::unix::fs::symlink;

    let root = tempfile::tempdir().unwrap();
    write(root.path(), "loop/a/A.class", &class("a/A"));
    symlink(root.path().join("loop"), root.path().join("loop/back")).unwrap();

    let mut locate = TypeLocator::new(LocatorOptions::new(17))
        .locate(root.path())
        .unwrap();
    let names: Vec<String> = locate
        .by_ref()
        .map(|t| t.discovered.qualified_name)
        .collect();
    assert_eq!(names, vec!["a.A"]);
    let warnings = locate.into_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], LocateWarning::Unreadable { .. }));
}

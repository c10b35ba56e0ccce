//! Human-auditable text report of an outcome table.
//!
//! ```text
//! Type Cache Report
//! Format Version: 1
//! Build Tool Version: 0.1.0
//! Runtime Major Version: 17
//! Packages: 3
//! com.example.Service,TRANSFORM,libs/app.jar/com/example/Service.class
//! com.example.Util,SKIP,libs/app.jar/com/example/Util.class
//! org.broken.Thing,FAIL,libs/old.jar/org/broken/Thing.class,malformed class file: ...
//! ```
//!
//! Record lines are sorted by qualified name, so the report diffs cleanly
//! across builds regardless of scan order.

use std::io::{self, Write};

use crate::codec::CacheMetadata;
use crate::outcome::{OutcomeRecord, OutcomeTable};

/// First line of every report.
pub const REPORT_TITLE: &str = "Type Cache Report";

/// Writes the report for `table` to `writer`, one record line at a time.
pub fn write_report<W: Write>(
    table: &OutcomeTable,
    metadata: &CacheMetadata,
    writer: &mut W,
) -> io::Result<()> {
    writer.write_all(header(table, metadata).as_bytes())?;
    for record in table.sorted() {
        writer.write_all(record_line(record).as_bytes())?;
    }
    Ok(())
}

/// Renders the report to a string.
pub fn render_report(table: &OutcomeTable, metadata: &CacheMetadata) -> String {
    table
        .sorted()
        .into_iter()
        .fold(header(table, metadata), |mut out, record| {
            out.push_str(&record_line(record));
            out
        })
}

fn header(table: &OutcomeTable, metadata: &CacheMetadata) -> String {
    format!(
        "{REPORT_TITLE}\n\
         Format Version: {}\n\
         Build Tool Version: {}\n\
         Runtime Major Version: {}\n\
         Packages: {}\n",
        metadata.format_version,
        metadata.tool_version,
        metadata.runtime_major,
        table.package_count()
    )
}

fn record_line(record: &OutcomeRecord) -> String {
    let mut line = format!(
        "{},{},{}",
        record.name(),
        record.outcome.kind(),
        record.discovered.origin_path
    );
    if let Some(detail) = record.outcome.detail() {
        line.push(',');
        line.push_str(&single_line(detail));
    }
    line.push('\n');
    line
}

/// Keeps one record per line.
fn single_line(detail: &str) -> String {
    detail
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prescan_common::DiscoveredType;

    use crate::outcome::{Outcome, OutcomeRecord};

    fn record(name: &str, origin: &str, outcome: Outcome) -> OutcomeRecord {
        OutcomeRecord {
            discovered: DiscoveredType::new(name, origin),
            outcome,
        }
    }

    #[test]
    fn header_and_sorted_lines() {
        let table: OutcomeTable = vec![
            record(
                "D",
                "root/D.class",
                Outcome::Fail {
                    detail: "intentional load failure".to_string(),
                },
            ),
            record("B", "root/B.class", Outcome::Skip),
            record("C", "root/C.class", Outcome::Ignore),
            record("A", "root/A.class", Outcome::Transform),
        ]
        .into_iter()
        .collect();

        let report = render_report(&table, &CacheMetadata::new(17, "1.0.0"));
        assert_eq!(
            report,
            "Type Cache Report\n\
             Format Version: 1\n\
             Build Tool Version: 1.0.0\n\
             Runtime Major Version: 17\n\
             Packages: 1\n\
             A,TRANSFORM,root/A.class\n\
             B,SKIP,root/B.class\n\
             C,IGNORE,root/C.class\n\
             D,FAIL,root/D.class,intentional load failure\n"
        );
    }

    #[test]
    fn package_count_uses_full_package() {
        let table: OutcomeTable = vec![
            record("foo.bar.xyz.Xyz", "a", Outcome::Ignore),
            record("foo.bar.FooBar", "b", Outcome::Skip),
            record("foo.bar.Other", "c", Outcome::Skip),
            record("example.OuterJarClass", "d", Outcome::Transform),
        ]
        .into_iter()
        .collect();
        let report = render_report(&table, &CacheMetadata::new(9, "v"));
        assert!(report.contains("\nPackages: 3\n"));
    }

    #[test]
    fn multi_line_detail_stays_on_one_line() {
        let table: OutcomeTable = vec![record(
            "x.Y",
            "lib.jar/x/Y.class",
            Outcome::Fail {
                detail: "first\n  second\r\nthird".to_string(),
            },
        )]
        .into_iter()
        .collect();
        let report = render_report(&table, &CacheMetadata::new(9, "v"));
        assert!(report.ends_with("x.Y,FAIL,lib.jar/x/Y.class,first second third\n"));
    }

    #[test]
    fn empty_table_has_header_only() {
        let report = render_report(&OutcomeTable::new(), &CacheMetadata::new(9, "v"));
        assert_eq!(report.lines().count(), 5);
        assert!(report.contains("Packages: 0"));
    }

    #[test]
    fn report_is_independent_of_storage_order() {
        let forward: OutcomeTable = vec![
            record("b.B", "x", Outcome::Skip),
            record("a.A", "y", Outcome::Transform),
        ]
        .into_iter()
        .collect();
        let backward: OutcomeTable = forward.sorted().into_iter().rev().cloned().collect();
        let metadata = CacheMetadata::new(9, "v");
        assert_eq!(
            render_report(&forward, &metadata),
            render_report(&backward, &metadata)
        );
    }

    /// Accepts `budget` bytes, then fails every write.
    struct ShortWriter {
        budget: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn written_report_matches_rendered_report() {
        let table: OutcomeTable = vec![
            record("b.B", "x", Outcome::Skip),
            record("a.A", "y", Outcome::Transform),
        ]
        .into_iter()
        .collect();
        let metadata = CacheMetadata::new(9, "v");
        let mut buf = Vec::new();
        write_report(&table, &metadata, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), render_report(&table, &metadata));
    }

    #[test]
    fn writer_errors_propagate() {
        let table: OutcomeTable = vec![record("a.A", "y", Outcome::Transform)]
            .into_iter()
            .collect();
        let mut writer = ShortWriter { budget: 20 };
        let err = write_report(&table, &CacheMetadata::new(9, "v"), &mut writer).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }
}

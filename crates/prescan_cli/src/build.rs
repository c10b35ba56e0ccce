//! `prescan build`: scan, classify, and persist.
//!
//! 1. Resolve configuration (`prescan.toml` plus flags)
//! 2. Walk every root with the type locator
//! 3. Classify each located type against the configured rules
//! 4. Write the binary cache and, if requested, the text report
//! 5. Print the outcome tally

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use prescan_cache::{CacheBuilder, CacheMetadata, OutcomeTable};
use prescan_classfile::ClassFileLoader;
use prescan_locator::{LocatorOptions, TypeLocator};

use crate::policy::RulePolicy;
use crate::settings;
use crate::{BuildArgs, GlobalArgs, DEFAULT_TOOL_VERSION};

/// Runs the `prescan build` command.
///
/// Per-type failures and unreadable entries do not fail the build; they are
/// counted and logged. Returns exit code 0 once the cache is written.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = settings::resolve(args, settings::load_file_config(global)?)?;
    let tool_version = args
        .tool_version
        .clone()
        .unwrap_or_else(|| DEFAULT_TOOL_VERSION.to_string());
    let runtime_major = config.scan.runtime_major;
    tracing::debug!(scan = ?config.scan, output = ?config.output, "resolved configuration");

    if !global.quiet {
        eprintln!(
            "    Scanning {} root(s) for runtime {}",
            config.scan.roots.len(),
            runtime_major
        );
    }

    let locator = TypeLocator::new(LocatorOptions {
        runtime_major,
        max_archive_depth: config.scan.max_archive_depth,
    });
    let mut located = locator.locate_all(&config.scan.roots)?;

    let builder = CacheBuilder::new(runtime_major, tool_version);
    let policy = RulePolicy::from_config(&config.policy);
    let loader = ClassFileLoader::new(runtime_major);
    let (table, stats) = builder.build(&mut located, &loader, &policy);

    let warnings = located.into_warnings();
    if !global.quiet && !warnings.is_empty() {
        eprintln!("   Skipped {} unreadable entr(ies)", warnings.len());
        if global.verbose {
            for warning in &warnings {
                eprintln!("      {warning}");
            }
        }
    }

    let metadata = builder.metadata();
    let cache_path = Path::new(&config.output.cache);
    prescan_cache::write_to_path(&table, &metadata, cache_path)?;
    if !global.quiet {
        eprintln!("       Wrote {} ({} types)", cache_path.display(), table.len());
    }

    if let Some(ref report) = config.output.report {
        let report_path = Path::new(report);
        write_report_file(&table, &metadata, report_path)?;
        if !global.quiet {
            eprintln!("       Wrote {}", report_path.display());
        }
    }

    println!("{stats}");
    Ok(0)
}

/// Writes the text report to a file.
fn write_report_file(
    table: &OutcomeTable,
    metadata: &CacheMetadata,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let with_path =
        |e: std::io::Error| format!("failed to write report {}: {e}", path.display());
    let file = File::create(path).map_err(with_path)?;
    let mut writer = BufWriter::new(file);
    prescan_cache::write_report(table, metadata, &mut writer).map_err(with_path)?;
    writer.flush().map_err(with_path)?;
    Ok(())
}

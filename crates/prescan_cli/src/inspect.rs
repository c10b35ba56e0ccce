//! `prescan inspect`: print a cache's header and outcome counts.

use std::path::Path;

use prescan_cache::{CacheMetadata, Stats};
use serde::Serialize;

use crate::{GlobalArgs, InspectArgs, OutputFormat};

#[derive(Debug, Serialize)]
struct Summary {
    metadata: CacheMetadata,
    entries: usize,
    stats: Stats,
}

/// Runs the `prescan inspect` command.
///
/// Reads the whole cache without checking it against any runtime or tool
/// version, so stale caches can still be examined.
pub fn run(args: &InspectArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (metadata, stats) = prescan_cache::read_summary_from_path(Path::new(&args.cache))?;
    let summary = Summary {
        metadata,
        entries: stats.total(),
        stats,
    };

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(0)
}

fn render_text(summary: &Summary) -> String {
    format!(
        "Format Version: {}\n\
         Build Tool Version: {}\n\
         Runtime Major Version: {}\n\
         Entries: {}\n\
         {}\n",
        summary.metadata.format_version,
        summary.metadata.tool_version,
        summary.metadata.runtime_major,
        summary.entries,
        summary.stats
    )
}

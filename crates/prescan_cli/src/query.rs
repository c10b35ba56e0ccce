//! `prescan query`: look up type names in a built cache.

use std::path::Path;

use prescan_cache::TypeCache;
use serde::Serialize;

use crate::{GlobalArgs, OutputFormat, QueryArgs, DEFAULT_TOOL_VERSION};

/// Exit code when the cache is intact but built for another format, runtime,
/// or tool version.
pub const EXIT_STALE: i32 = 2;

/// One lookup result.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct Answer<'a> {
    name: &'a str,
    ignorable: Option<bool>,
}

/// Runs the `prescan query` command.
///
/// Prints `name=true`, `name=false`, or `name=unknown` per requested name.
/// A stale cache exits with [`EXIT_STALE`]; any other load failure is an error.
pub fn run(args: &QueryArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let tool_version = args.tool_version.as_deref().unwrap_or(DEFAULT_TOOL_VERSION);
    let cache = match prescan_cache::load_from_path(
        Path::new(&args.cache),
        args.runtime_major,
        tool_version,
    ) {
        Ok(cache) => cache,
        Err(err) if err.is_stale() => {
            if !global.quiet {
                eprintln!("stale cache {}: {err}; rebuild it", args.cache);
            }
            return Ok(EXIT_STALE);
        }
        Err(err) => return Err(err.into()),
    };

    tracing::debug!(cache = %args.cache, entries = cache.len(), "cache loaded");

    let answers = answer_all(&cache, &args.names);
    match args.format {
        OutputFormat::Text => {
            for answer in &answers {
                println!("{}", render_answer(answer));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&answers)?),
    }
    Ok(0)
}

fn answer_all<'a>(cache: &TypeCache, names: &'a [String]) -> Vec<Answer<'a>> {
    names
        .iter()
        .map(|name| Answer {
            name,
            ignorable: cache.is_ignorable(name),
        })
        .collect()
}

fn render_answer(answer: &Answer<'_>) -> String {
    let value = match answer.ignorable {
        Some(true) => "true",
        Some(false) => "false",
        None => "unknown",
    };
    format!("{}={value}", answer.name)
}

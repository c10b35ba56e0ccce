//! Prescan CLI: builds and queries precomputed type classification caches.
//!
//! Provides `prescan build` to scan class directories and archives into a
//! binary cache and text report, `prescan query` to ask a cache whether
//! types are ignorable, and `prescan inspect` to print a cache's header and
//! outcome counts.

#![warn(missing_docs)]

mod build;
mod inspect;
mod policy;
mod query;
mod settings;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Prescan: an offline type classification cache builder.
#[derive(Parser, Debug)]
#[command(name = "prescan", version, about = "Precomputed type classification cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `prescan.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan roots, classify every type, and write the cache.
    Build(BuildArgs),
    /// Ask a cache whether types are known to be ignorable.
    Query(QueryArgs),
    /// Print a cache's header and outcome counts.
    Inspect(InspectArgs),
}

/// Arguments for the `prescan build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Directories, archives, or class files to scan. Overrides `scan.roots`.
    pub roots: Vec<String>,

    /// Target runtime major version. Overrides `scan.runtime_major`.
    #[arg(short, long)]
    pub runtime_major: Option<u32>,

    /// Binary cache output path. Overrides `output.cache`.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Text report output path. Overrides `output.report`.
    #[arg(long)]
    pub report: Option<String>,

    /// Deepest archive nesting to open. Overrides `scan.max_archive_depth`.
    #[arg(long)]
    pub max_archive_depth: Option<usize>,

    /// Build-tool version stamped into the cache.
    #[arg(long)]
    pub tool_version: Option<String>,
}

/// Arguments for the `prescan query` subcommand.
#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Binary cache to load.
    pub cache: String,

    /// Qualified type names to look up.
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Runtime major version the caller runs on.
    #[arg(short, long)]
    pub runtime_major: u32,

    /// Build-tool version the caller expects.
    #[arg(long)]
    pub tool_version: Option<String>,

    /// Output format for the answers.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `prescan inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Binary cache to read.
    pub cache: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

/// Version stamped into caches unless `--tool-version` says otherwise.
pub const DEFAULT_TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let cli = Cli::parse();

    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Query(ref args) => query::run(args, &global),
        Command::Inspect(ref args) => inspect::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Returns the log filter directive for the given verbosity flags.
fn default_log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over flags.
fn init_logging(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(quiet, verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

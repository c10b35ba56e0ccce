//! Resolution of the effective build configuration from `prescan.toml` and
//! command-line overrides.

use std::path::{Path, PathBuf};

use prescan_config::{ConfigError, PrescanConfig, CONFIG_FILE_NAME};

use crate::{BuildArgs, GlobalArgs};

/// Loads the configuration file, if there is one.
///
/// An explicit `--config` path must exist. Without it, `prescan.toml` in the
/// current directory is used when present.
pub fn load_file_config(global: &GlobalArgs) -> Result<Option<PrescanConfig>, ConfigError> {
    match &global.config {
        Some(path) => {
            let path = PathBuf::from(path);
            let path = if path.is_dir() {
                path.join(CONFIG_FILE_NAME)
            } else {
                path
            };
            prescan_config::load_config_from_path(&path).map(Some)
        }
        None => {
            let candidate = Path::new(CONFIG_FILE_NAME);
            if candidate.is_file() {
                prescan_config::load_config_from_path(candidate).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

/// Applies command-line overrides on top of the file configuration.
///
/// Without a file, the roots and runtime version must come from flags.
pub fn resolve(args: &BuildArgs, file: Option<PrescanConfig>) -> Result<PrescanConfig, ConfigError> {
    let mut config = match file {
        Some(config) => config,
        None => {
            let runtime_major = args
                .runtime_major
                .ok_or_else(|| ConfigError::MissingField("scan.runtime_major".to_string()))?;
            PrescanConfig::new(Vec::new(), runtime_major)
        }
    };

    if !args.roots.is_empty() {
        config.scan.roots = args.roots.clone();
    }
    if let Some(runtime_major) = args.runtime_major {
        config.scan.runtime_major = runtime_major;
    }
    if let Some(depth) = args.max_archive_depth {
        config.scan.max_archive_depth = depth;
    }
    if let Some(ref output) = args.output {
        config.output.cache = output.clone();
    }
    if let Some(ref report) = args.report {
        config.output.report = Some(report.clone());
    }

    prescan_config::validate_config(&config)?;
    Ok(config)
}

//! Parsing and validation of `prescan.toml` configuration files.
//!
//! This crate reads the scan configuration and produces a strongly-typed
//! [`PrescanConfig`]: which roots to scan for which runtime, where to write the
//! cache and report, and the rules of the config-driven classification policy.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_from_path, load_config_from_str, validate_config, CONFIG_FILE_NAME,
};
pub use types::*;

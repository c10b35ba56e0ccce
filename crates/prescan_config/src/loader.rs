//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::PrescanConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "prescan.toml";

/// Loads and validates a `prescan.toml` configuration from a project directory.
///
/// Reads `<project_dir>/prescan.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<PrescanConfig, ConfigError> {
    load_config_from_path(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_from_path(path: &Path) -> Result<PrescanConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `prescan.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<PrescanConfig, ConfigError> {
    let config: PrescanConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
///
/// Called on every parsed file; callers that override values afterwards
/// (e.g. from command-line flags) should call it again.
pub fn validate_config(config: &PrescanConfig) -> Result<(), ConfigError> {
    if config.scan.roots.is_empty() {
        return Err(ConfigError::MissingField("scan.roots".to_string()));
    }
    if config.scan.roots.iter().any(|root| root.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "scan.roots must not contain empty paths".to_string(),
        ));
    }
    if config.scan.runtime_major == 0 {
        return Err(ConfigError::ValidationError(
            "scan.runtime_major must be at least 1".to_string(),
        ));
    }
    if config.output.cache.trim().is_empty() {
        return Err(ConfigError::MissingField("output.cache".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[scan]
roots = ["build/libs"]
runtime_major = 17
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.scan.roots, vec!["build/libs"]);
        assert_eq!(config.scan.runtime_major, 17);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[scan]
roots = ["build/libs", "lib/extra.jar"]
runtime_major = 17
max_archive_depth = 4

[output]
cache = "out/types.bin"
report = "out/types.txt"

[policy]
ignore_prefixes = ["com.shaded.", "org.relocated."]
transform_types = ["com.example.Service"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.scan.roots.len(), 2);
        assert_eq!(config.scan.max_archive_depth, 4);
        assert_eq!(config.output.cache, "out/types.bin");
        assert_eq!(config.output.report.as_deref(), Some("out/types.txt"));
        assert_eq!(config.policy.ignore_prefixes.len(), 2);
    }

    #[test]
    fn empty_roots_errors() {
        let toml = r#"
[scan]
roots = []
runtime_major = 17
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "scan.roots"));
    }

    #[test]
    fn blank_root_errors() {
        let toml = r#"
[scan]
roots = ["lib", "  "]
runtime_major = 17
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_runtime_errors() {
        let toml = r#"
[scan]
roots = ["lib"]
runtime_major = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_cache_path_errors() {
        let toml = r#"
[scan]
roots = ["lib"]
runtime_major = 17

[output]
cache = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "output.cache"));
    }

    #[test]
    fn missing_scan_section_errors() {
        let err = load_config_from_str("[output]\ncache = \"x.bin\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[scan]\nroots = [\"lib\"]\nruntime_major = 21\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.scan.runtime_major, 21);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}

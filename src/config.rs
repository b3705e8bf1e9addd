//! Application configuration loaded from a TOML file
//!
//! Every field has a default so a missing or partial file is valid.
//! Command-line flags override whatever is loaded here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "logcube.toml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Schema definition file (json or toml)
    pub schema: Option<PathBuf>,

    pub output: OutputFormat,

    /// Default tracing directive, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: None,
            output: OutputFormat::default(),
            log_level: Self::default_log_level(),
        }
    }
}

impl AppConfig {
    fn default_log_level() -> String {
        "warn".to_string()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration")
    }

    /// Load from an explicit path, or from `logcube.toml` if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        // Relative schema paths are resolved against the config file location
        if let Some(schema) = &config.schema
            && schema.is_relative()
            && let Some(dir) = path.parent()
        {
            config.schema = Some(dir.join(schema));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_file() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.schema, None);
        assert_eq!(config.output, OutputFormat::Table);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
schema = "/etc/logcube/acc.json"
output = "json"
log_level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.schema, Some(PathBuf::from("/etc/logcube/acc.json")));
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unknown_output_is_rejected() {
        assert!(AppConfig::from_toml_str(r#"output = "xml""#).is_err());
    }

    #[test]
    fn test_relative_schema_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logcube.toml");
        fs::write(&path, "schema = \"schemas/acc.json\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.schema, Some(dir.path().join("schemas/acc.json")));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}

//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments, which take precedence over both

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile applied when `--profile` is not given
    pub default_profile: Option<String>,

    /// Directories scanned for additional profile definitions
    pub profile_dirs: Vec<PathBuf>,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output when the terminal supports it
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when no `-v` flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: None,
            profile_dirs: default_profile_dirs(),
            output: OutputConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

fn default_profile_dirs() -> Vec<PathBuf> {
    dirs::config_dir()
        .map(|dir| vec![dir.join("gxval").join("profiles")])
        .unwrap_or_default()
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in &Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".gxval.yaml"),
            PathBuf::from(".gxval.json"),
            PathBuf::from("gxval.yaml"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("gxval").join("config.yaml"));
        }

        paths
    }

    /// Profile to apply: the explicit one, otherwise the configured default
    pub fn resolve_profile<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.default_profile.as_deref())
    }

    /// Output format to use: the explicit one, otherwise the configured default
    pub fn resolve_format(&self, explicit: Option<OutputFormat>) -> OutputFormat {
        explicit.unwrap_or(self.output.format)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_yaml_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gxval.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "default_profile: statement_only").unwrap();
        writeln!(file, "output:\n  format: json-pretty").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("statement_only"));
        assert_eq!(config.output.format, OutputFormat::JsonPretty);
        assert!(config.output.color);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"profile_dirs": ["profiles"], "logging": {"level": "debug"}}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.profile_dirs, vec![PathBuf::from("profiles")]);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.default_profile, None);
    }

    #[test]
    fn test_invalid_format_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gxval.yaml");
        std::fs::write(&path, "output:\n  format: html\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_with_file(Some(Path::new("/nonexistent/gxval.yaml"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_explicit_values_take_precedence() {
        let config = Config {
            default_profile: Some("statement_only".to_string()),
            output: OutputConfig {
                format: OutputFormat::Yaml,
                color: false,
            },
            ..Config::default()
        };
        assert_eq!(config.resolve_profile(None), Some("statement_only"));
        assert_eq!(config.resolve_profile(Some("other")), Some("other"));
        assert_eq!(config.resolve_format(None), OutputFormat::Yaml);
        assert_eq!(
            config.resolve_format(Some(OutputFormat::Json)),
            OutputFormat::Json
        );
    }
}

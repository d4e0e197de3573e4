//! Configuration management for the CLI
//!
//! Configuration comes from defaults, an optional file (YAML, JSON or
//! TOML, chosen by extension) and command-line flags, in increasing
//! precedence. Logging environment variables are applied in `logging`.

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};
use sloconv_openslo::ConversionOptions;
use std::path::{Path, PathBuf};

/// Base name of configuration files
const CONFIG_NAME: &str = "sloconv";

/// Extensions tried for each configuration location
const CONFIG_EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "toml"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Options handed to the converter
    pub conversion: ConversionOptions,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,

    /// File the configuration was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format used when `--output` is not given
    pub format: OutputFormat,

    /// Use colored output when the terminal supports it
    pub color: bool,

    /// Show progress while converting several files
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level or filter directive; verbosity flags win when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format (compact, full, json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,

    /// Log file path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
            progress: true,
        }
    }
}

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }
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
        let mut config = Self::parse(&content, FileFormat::from_path(path))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(content: &str, format: FileFormat) -> Result<Self> {
        Ok(match format {
            FileFormat::Yaml if content.trim().is_empty() => Self::default(),
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        })
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Default configuration file paths, in search order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for ext in CONFIG_EXTENSIONS {
            paths.push(PathBuf::from(format!(".{CONFIG_NAME}.{ext}")));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join(CONFIG_NAME);
            for ext in CONFIG_EXTENSIONS {
                paths.push(dir.join(format!("config.{ext}")));
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            for ext in CONFIG_EXTENSIONS {
                paths.push(home_dir.join(format!(".{CONFIG_NAME}.{ext}")));
            }
        }

        paths
    }

    /// Render the configuration in one of the file formats
    pub fn render(&self, format: crate::cli::ConfigFormat) -> Result<String> {
        use crate::cli::ConfigFormat;

        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e))),
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }
}

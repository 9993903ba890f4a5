//! Configuration management for the validator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (sheets-validate.toml)
//! - Environment variables (SHEETS_VALIDATE__*)
//!
//! ## Example config file (sheets-validate.toml):
//! ```toml
//! [logging]
//! dir = "./logs"
//! file_prefix = "google_sheets_validate"
//! level = "info"
//! stderr = true
//!
//! [validation]
//! skip_header_rows = 1
//! fail_on_violations = false
//!
//! [report]
//! output_format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the validator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Validation pass settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the date-named log file
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Log file name before the date suffix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Filter directive used when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Mirror log lines to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Rows at the top of the worksheet left unchecked
    #[serde(default)]
    pub skip_header_rows: usize,

    /// Exit non-zero when violations are found
    #[serde(default)]
    pub fail_on_violations: bool,
}

/// Report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// JSON layout for reports
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    "google_sheets_validate".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_prefix: default_file_prefix(),
            level: default_level(),
            stderr: true,
        }
    }
}

impl LoggingConfig {
    /// Log file name for a given day, e.g. `google_sheets_validate_2021-07-04.log`
    pub fn file_name(&self, date: chrono::NaiveDate) -> String {
        format!("{}_{}.log", self.file_prefix, date.format("%Y-%m-%d"))
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "sheets-validate.toml",
            ".sheets-validate.toml",
            "config/sheets-validate.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "familiar", "sheets-validate") {
            let xdg_config = dirs.config_dir().join("sheets-validate.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SHEETS_VALIDATE")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

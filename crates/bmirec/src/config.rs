//! Configuration management for bmirec.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::StoreOptions;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "bmirec";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "bmi_data.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "BMIREC_";

/// Highest number of decimal places accepted for BMI display.
const MAX_PRECISION: usize = 6;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BMIREC_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/bmirec/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/bmirec/bmi_data.db`
    pub database_path: Option<PathBuf>,
    /// Wait for each append to reach the disk (`PRAGMA synchronous=FULL`).
    pub synchronous_full: bool,
}

/// How `history` renders records when no format is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFormat {
    /// Horizontal bar chart of BMI per record.
    #[default]
    Chart,
    /// One row per record.
    Table,
    /// JSON array of records.
    Json,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places used when showing a BMI value.
    pub precision: usize,
    /// Width in characters of the longest chart bar.
    pub chart_width: usize,
    /// Format used by `history` when none is given on the command line.
    pub default_history_format: HistoryFormat,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            synchronous_full: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            precision: 2,
            chart_width: 40,
            default_history_format: HistoryFormat::Chart,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::figment(config_file).extract::<Config>()?.validated()
    }

    fn figment(config_file: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.display.chart_width == 0 {
            return Err(Error::ConfigValidation {
                message: "chart_width must be greater than 0".to_string(),
            });
        }

        if self.display.precision > MAX_PRECISION {
            return Err(Error::ConfigValidation {
                message: format!(
                    "precision ({}) cannot be greater than {MAX_PRECISION}",
                    self.display.precision
                ),
            });
        }

        if let Some(path) = &self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "database_path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Options for opening the record store.
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            synchronous_full: self.storage.synchronous_full,
        }
    }
}

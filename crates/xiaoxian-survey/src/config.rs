//! Configuration management for xiaoxian-survey.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::DEFAULT_SLOT_KEY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "xiaoxian-survey";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "survey.db";

/// Environment variable prefix.
const ENV_PREFIX: &str = "XSURVEY_";

const COLOR_PATTERN: &str = r"^#[0-9a-fA-F]{6}$";
const URL_PATTERN: &str = r"^https?://[^\s/$.?#][^\s]*$";
const SLOT_KEY_PATTERN: &str = r"^[A-Za-z0-9_.\-]+$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `XSURVEY_`, `__` between levels)
/// 2. TOML config file at `~/.config/xiaoxian-survey/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Share configuration.
    pub share: ShareConfig,
    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
    /// Demonstration data configuration.
    pub mock: MockConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/xiaoxian-survey/survey.db`
    pub database_path: Option<PathBuf>,
    /// Slot holding the response list.
    pub slot_key: String,
}

/// Share-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Public survey address. A placeholder is shown when unset.
    pub url: Option<String>,
    /// QR foreground colour for SVG output.
    pub qr_dark_color: String,
    /// QR background colour for SVG output.
    pub qr_light_color: String,
    /// Minimum SVG edge length in pixels.
    pub qr_size: u32,
}

/// Dashboard-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Number of recent comments to show.
    pub latest_comments: usize,
}

/// Demonstration data configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Responses generated per `seed` run.
    pub count: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            url: None,
            qr_dark_color: "#7f1d1d".to_string(),
            qr_light_color: "#ffffff".to_string(),
            qr_size: 180,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { latest_comments: 5 }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self { count: 50 }
    }
}

impl Config {
    /// Load configuration, reading `config_path` or the default config file.
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. TOML config file (if it exists)
    /// 3. Environment variables (prefixed with `XSURVEY_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation
    /// fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
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
        if !pattern(SLOT_KEY_PATTERN)?.is_match(&self.storage.slot_key) {
            return Err(invalid(format!(
                "slot_key must be non-empty letters, digits, '_', '-' or '.': {:?}",
                self.storage.slot_key
            )));
        }

        let color = pattern(COLOR_PATTERN)?;
        for (name, value) in [
            ("qr_dark_color", &self.share.qr_dark_color),
            ("qr_light_color", &self.share.qr_light_color),
        ] {
            if !color.is_match(value) {
                return Err(invalid(format!("{name} must look like #rrggbb: {value}")));
            }
        }

        if let Some(url) = &self.share.url {
            if !pattern(URL_PATTERN)?.is_match(url) {
                return Err(invalid(format!("share url must be http(s): {url}")));
            }
        }

        if self.share.qr_size == 0 {
            return Err(invalid("qr_size must be greater than 0".to_string()));
        }
        if self.dashboard.latest_comments == 0 {
            return Err(invalid(
                "latest_comments must be greater than 0".to_string(),
            ));
        }
        if self.mock.count == 0 {
            return Err(invalid("mock count must be greater than 0".to_string()));
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
}

fn pattern(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| invalid(format!("invalid regex pattern {source}: {e}")))
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

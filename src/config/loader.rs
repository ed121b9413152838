use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::types::{Config, DisplayConfig, HardwareMode};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/voucher-kiosk/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("voucher-kiosk").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, starts from `Config::default()`.
    /// - If the file exists, parses it as TOML.
    /// - Either way the result is validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Self::parse(path, &content)?
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The ledger URL is http(s), and credentials are set in device mode
    /// - Both displays have a usable geometry
    /// - Device mode uses four distinct GPIO lines
    /// - A configured amount ceiling is positive
    /// - The log filter parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = &self.api;
        if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
            return Err(invalid(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                api.base_url
            )));
        }

        check_display("hardware.bar", &self.hardware.bar)?;
        check_display("hardware.customer", &self.hardware.customer)?;

        if self.hardware.mode == HardwareMode::Device {
            for (field, value) in [("username", &api.username), ("client_id", &api.client_id)] {
                if value.trim().is_empty() {
                    return Err(invalid(format!("api.{} must be set", field)));
                }
            }

            let pins = &self.hardware.buttons;
            let lines: HashSet<u32> = [pins.cancel, pins.confirm, pins.increment, pins.decrement]
                .into_iter()
                .collect();
            if lines.len() != 4 {
                return Err(invalid(
                    "hardware.buttons must use four distinct GPIO lines".to_string(),
                ));
            }
        }

        if self.menu.max_amount == Some(0) {
            return Err(invalid(
                "menu.max_amount must be positive when set".to_string(),
            ));
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.filter) {
            return Err(invalid(format!(
                "logging.filter '{}' is not a valid filter: {}",
                self.logging.filter, e
            )));
        }

        Ok(())
    }
}

fn check_display(name: &str, display: &DisplayConfig) -> Result<(), ConfigError> {
    if display.cols == 0 || display.rows == 0 {
        return Err(invalid(format!("{} needs non-zero cols and rows", name)));
    }
    Ok(())
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError { message }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::api::CoinGeckoClient;
use crate::models::{OutputFormat, ThemeMode};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidSize { key: &'static str, value: String },
    #[error("THEME_MODE: {0}")]
    InvalidTheme(String),
    #[error("CHART_OUTPUT must end in .png or .svg, got '{0}'")]
    UnsupportedOutput(String),
}

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct CardConfig {
    pub api_url: String,
    pub output: PathBuf,
    pub width: u32,
    pub chart_height: u32,
    pub theme_mode: ThemeMode,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            api_url: CoinGeckoClient::DEFAULT_BASE_URL.to_string(),
            output: PathBuf::from("top_coins.png"),
            width: 800,
            chart_height: 400,
            theme_mode: ThemeMode::Light,
        }
    }
}

impl CardConfig {
    /// Load settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("COINGECKO_API_URL") {
            config.api_url = url.trim().to_string();
        }

        if let Some(output) = get("CHART_OUTPUT") {
            config.output = PathBuf::from(output.trim());
        }
        if OutputFormat::from_path(&config.output).is_none() {
            return Err(ConfigError::UnsupportedOutput(config.output.display().to_string()));
        }

        if let Some(width) = get("CHART_WIDTH") {
            config.width = parse_size("CHART_WIDTH", &width)?;
        }
        if let Some(height) = get("CHART_HEIGHT") {
            config.chart_height = parse_size("CHART_HEIGHT", &height)?;
        }

        if let Some(mode) = get("THEME_MODE") {
            config.theme_mode = mode.parse().map_err(ConfigError::InvalidTheme)?;
        }

        Ok(config)
    }
}

fn parse_size(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidSize {
            key,
            value: value.to_string(),
        }),
    }
}

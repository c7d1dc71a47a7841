use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{model::Coordinates, provider::openweather::DEFAULT_BASE_URL};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenWeather credentials and endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the One Call endpoint, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [openweather]
/// api_key = "..."
///
/// [location]
/// latitude = 42.36
/// longitude = -71.06
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub openweather: Option<ProviderConfig>,

    /// Default reporting location.
    pub location: Option<Coordinates>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-summary", "weather-summary")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace the API key, keeping any endpoint overrides.
    pub fn set_api_key(&mut self, api_key: String) {
        if let Some(provider) = self.openweather.as_mut() {
            provider.api_key = api_key;
        } else {
            self.openweather = Some(ProviderConfig { api_key, base_url: None, timeout_secs: None });
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.openweather.as_ref().map(|cfg| cfg.api_key.as_str()).filter(|key| !key.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.openweather.as_ref().and_then(|cfg| cfg.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        let secs = self
            .openweather
            .as_ref()
            .and_then(|cfg| cfg.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn set_location(&mut self, location: Coordinates) {
        self.location = Some(location);
    }

    /// The configured default reporting location, validated.
    pub fn reporting_location(&self) -> Result<Coordinates> {
        let loc = self.location.ok_or_else(|| {
            anyhow!(
                "No reporting location configured.\n\
                 Hint: run `weather-summary configure` or pass --lat and --lon."
            )
        })?;

        Ok(Coordinates::new(loc.latitude, loc.longitude)?)
    }
}

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{error::WeatherError, model::Coordinate};

/// Environment variable that overrides `api_key` from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the "device location" comes from on a host without a GPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationSource {
    /// Look the location up from the public IP address.
    #[default]
    Ip,
    /// Use the configured latitude/longitude.
    Fixed,
    /// No location capability at all.
    None,
}

/// Example TOML:
/// [geolocation]
/// allowed = true
/// source = "fixed"
/// latitude = 52.52
/// longitude = 13.40
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Whether the user has granted access to their location.
    #[serde(default = "default_true")]
    pub allowed: bool,
    #[serde(default)]
    pub source: GeolocationSource,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_lookup_url: Option<String>,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            allowed: true,
            source: GeolocationSource::default(),
            latitude: None,
            longitude: None,
            ip_lookup_url: None,
        }
    }
}

impl GeolocationConfig {
    pub fn fixed_coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }

    pub fn ip_lookup_url(&self) -> &str {
        self.ip_lookup_url.as_deref().unwrap_or(DEFAULT_IP_LOOKUP_URL)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Override for the provider endpoint root, mostly useful for testing.
    pub base_url: Option<String>,

    /// Per-request timeout for every HTTP call.
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load config from disk (or defaults), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// A non-blank env value wins over the file.
    pub fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
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

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathercards", "weathercards")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The API key, or a configuration error telling the user how to set one.
    pub fn require_api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                WeatherError::Configuration(format!(
                    "No OpenWeather API key configured.\n\
                     Hint: set {API_KEY_ENV} or run `weathercards configure`."
                ))
            })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

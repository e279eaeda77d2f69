use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{forecast::LocalZone, model::DisplayUnit};

/// Base URLs of the OpenWeather endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_geo_url")]
    pub geo_url: String,

    #[serde(default = "default_data_url")]
    pub data_url: String,

    #[serde(default = "default_icon_url")]
    pub icon_url: String,
}

fn default_geo_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_data_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_icon_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

fn default_city() -> String {
    "London".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geo_url: default_geo_url(),
            data_url: default_data_url(),
            icon_url: default_icon_url(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "London"
/// unit = "celsius"
///
/// [endpoints]
/// data_url = "https://api.openweathermap.org/data/2.5"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    /// City queried when the widget starts.
    #[serde(default = "default_city")]
    pub default_city: String,

    #[serde(default)]
    pub unit: DisplayUnit,

    /// Fixed zone for noon selection and date labels; system zone when absent.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: default_city(),
            unit: DisplayUnit::default(),
            utc_offset_minutes: None,
            endpoints: Endpoints::default(),
        }
    }
}

/// Display-side settings the widget needs besides its service and sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    pub default_city: String,
    pub icon_url: String,
    pub zone: LocalZone,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            icon_url: default_icon_url(),
            zone: LocalZone::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-widget", "weather-widget")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather-widget configure` or set OPENWEATHER_API_KEY."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn zone(&self) -> Result<LocalZone> {
        match self.utc_offset_minutes {
            None => Ok(LocalZone::System),
            Some(minutes) => LocalZone::from_offset_minutes(minutes).ok_or_else(|| {
                anyhow!("utc_offset_minutes = {minutes} is out of range (must be within ±1440)")
            }),
        }
    }

    pub fn widget_settings(&self) -> Result<WidgetSettings> {
        Ok(WidgetSettings {
            default_city: self.default_city.clone(),
            icon_url: self.endpoints.icon_url.clone(),
            zone: self.zone()?,
        })
    }
}

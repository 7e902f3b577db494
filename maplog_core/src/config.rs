//! Configuration file support for maplog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/maplog/config.toml`.

use crate::types::Coordinates;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub popup: PopupConfig,

    #[serde(default)]
    pub form: FormConfig,

    #[serde(default)]
    pub location: Option<LocationConfig>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Map session configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,

    #[serde(default = "default_tile_url_template")]
    pub tile_url_template: String,

    #[serde(default = "default_attribution")]
    pub attribution: String,

    #[serde(default = "default_pan_duration_secs")]
    pub pan_duration_secs: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_zoom: default_zoom(),
            tile_url_template: default_tile_url_template(),
            attribution: default_attribution(),
            pan_duration_secs: default_pan_duration_secs(),
        }
    }
}

/// Marker popup configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopupConfig {
    #[serde(default = "default_popup_max_width")]
    pub max_width: u32,

    #[serde(default = "default_popup_min_width")]
    pub min_width: u32,

    #[serde(default)]
    pub auto_close: bool,

    #[serde(default)]
    pub close_on_click: bool,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            max_width: default_popup_max_width(),
            min_width: default_popup_min_width(),
            auto_close: false,
            close_on_click: false,
        }
    }
}

/// Workout form configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormConfig {
    /// Delay before a hidden form fully collapses
    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            hide_delay_ms: default_hide_delay_ms(),
        }
    }
}

impl FormConfig {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
}

/// Fixed current position, used where no location service exists
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LocationConfig> for Coordinates {
    fn from(l: LocationConfig) -> Self {
        Coordinates::new(l.latitude, l.longitude)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("maplog")
}

fn default_zoom() -> u8 {
    14
}

fn default_tile_url_template() -> String {
    "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into()
}

fn default_attribution() -> String {
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
        .into()
}

fn default_pan_duration_secs() -> f64 {
    1.0
}

fn default_popup_max_width() -> u32 {
    250
}

fn default_popup_min_width() -> u32 {
    100
}

fn default_hide_delay_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("maplog").join("config.toml")
    }

    /// Check values that TOML types alone cannot constrain
    pub fn validate(&self) -> Result<()> {
        if !(1..=20).contains(&self.map.default_zoom) {
            return Err(Error::Config(format!(
                "map.default_zoom must be between 1 and 20, got {}",
                self.map.default_zoom
            )));
        }
        if !(self.map.pan_duration_secs.is_finite() && self.map.pan_duration_secs >= 0.0) {
            return Err(Error::Config(
                "map.pan_duration_secs must be a non-negative number".into(),
            ));
        }
        if self.popup.min_width > self.popup.max_width {
            return Err(Error::Config(format!(
                "popup.min_width ({}) exceeds popup.max_width ({})",
                self.popup.min_width, self.popup.max_width
            )));
        }
        if let Some(location) = self.location {
            if !(-90.0..=90.0).contains(&location.latitude)
                || !(-180.0..=180.0).contains(&location.longitude)
            {
                return Err(Error::Config(format!(
                    "location out of range: {}, {}",
                    location.latitude, location.longitude
                )));
            }
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

//! Daemon configuration.
//!
//! Loaded from a JSON file; a missing or unreadable file falls back to
//! defaults that cover the full Blue Line against the public API, so the
//! strip works out of the box once a key is configured.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use linelight_tracker_lib::{
    ClassifierConfig, IndexPolarity, Palette, Station, Topology,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Positions feed endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Train Tracker API key; the public endpoint refuses requests
    /// without one
    #[serde(default)]
    pub key: String,
    /// Route identifier to poll
    #[serde(default = "default_route")]
    pub route: String,
    /// Delay between polls (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// HTTP request timeout (ms)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://lapi.transitchicago.com/api/1.0/ttpositions.aspx".to_string()
}

fn default_route() -> String {
    "blue".to_string()
}

const fn default_poll_interval_ms() -> u64 {
    10_000
}

const fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key: String::new(),
            route: default_route(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Brightness (0-255) applied after gamma correction
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    #[serde(default)]
    pub palette: Palette,
}

const fn default_brightness() -> u8 {
    255
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            brightness: default_brightness(),
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Which terminal is index 0; must agree with the station ordering
    #[serde(default)]
    pub polarity: IndexPolarity,
    /// Ordered station list, index 0 first on the strip
    #[serde(default = "default_stations")]
    pub stations: Vec<Station>,
}

fn default_stations() -> Vec<Station> {
    Topology::blue_line().stations().to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            display: DisplayConfig::default(),
            classifier: ClassifierConfig::default(),
            polarity: IndexPolarity::default(),
            stations: default_stations(),
        }
    }
}

/// Polling faster than this hammers the API for data that only updates
/// every few seconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 1_000;

impl Config {
    /// Clamp values to valid ranges and fix invalid values.
    pub fn validate(&mut self) {
        if self.api.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            warn!(
                "Clamping poll_interval_ms from {} to {MIN_POLL_INTERVAL_MS}",
                self.api.poll_interval_ms
            );
            self.api.poll_interval_ms = MIN_POLL_INTERVAL_MS;
        }
        if self.api.timeout_ms == 0 {
            warn!("timeout_ms is 0, resetting to default");
            self.api.timeout_ms = default_timeout_ms();
        }
        if self.stations.is_empty() {
            warn!("Station list is empty, restoring the Blue Line defaults");
            self.stations = default_stations();
            self.polarity = IndexPolarity::ForestParkFirst;
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(mut config) => {
                info!("Loaded config from {}", path.display());
                config.validate();
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {e:#}, using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let body = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&body).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Build the immutable topology the engine runs against.
    pub fn topology(&self) -> Result<Topology> {
        Topology::new(self.stations.clone(), self.polarity)
            .context("station list in config is invalid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_blue_line() {
        let config = Config::default();
        assert_eq!(config.stations.len(), 33);
        let topology = config.topology().unwrap();
        assert_eq!(topology.index_of("40890"), Some(32));
    }

    #[test]
    fn test_validate_clamps_poll_interval() {
        let mut config = Config::default();
        config.api.poll_interval_ms = 10;
        config.validate();
        assert_eq!(config.api.poll_interval_ms, MIN_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_validate_restores_empty_station_list() {
        let mut config = Config::default();
        config.stations.clear();
        config.validate();
        assert_eq!(config.stations.len(), 33);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api": {"key": "secret"}}"#).unwrap();
        assert_eq!(config.api.key, "secret");
        assert_eq!(config.api.route, "blue");
        assert_eq!(config.stations.len(), 33);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linelight.json");

        let mut config = Config::default();
        config.api.key = "secret".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.api.key, "secret");
        assert_eq!(loaded.stations.len(), config.stations.len());
    }
}

//! Reader configuration.
//!
//! Every knob a reader consults lives here and is handed to the
//! [`ReaderFactory`](crate::ReaderFactory) explicitly. Missing fields in a
//! config file fall back to [`StatsConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where the network reader gets its cumulative byte counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Sum link-layer counters over every interface.
    #[default]
    Interface,
    /// Sum per-process counters reported by `nettop`.
    Process,
}

/// How battery health is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthMode {
    /// `100 * max / design`, bounded to 0..=100.
    Percent,
    /// The raw maximum-capacity figure.
    RawCapacity,
}

impl Default for HealthMode {
    fn default() -> Self {
        // Apple Silicon batteries already report MaxCapacity as a percentage.
        if cfg!(target_arch = "x86_64") {
            Self::Percent
        } else {
            Self::RawCapacity
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    pub fn convert(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => crate::codec::celsius_to_fahrenheit(celsius),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

/// Configuration shared by every reader a factory builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub network_mode: NetworkMode,
    /// Truncate the CPU top-consumer list. `None` keeps every row.
    pub process_limit: Option<usize>,
    /// Row count requested from `top` by the RAM reader.
    pub ram_process_count: usize,
    pub health_mode: HealthMode,
    /// Temperatures above this (°C) are treated as sensor glitches.
    pub max_plausible_temperature: f64,
    /// Fan ids reported with `enabled = false`.
    pub disabled_fans: Vec<usize>,
    /// Display unit for temperatures. Readers always report Celsius.
    pub temperature_unit: TemperatureUnit,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            network_mode: NetworkMode::default(),
            process_limit: None,
            ram_process_count: 10,
            health_mode: HealthMode::default(),
            max_plausible_temperature: 110.0,
            disabled_fans: Vec::new(),
            temperature_unit: TemperatureUnit::default(),
        }
    }
}

impl StatsConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn fan_enabled(&self, id: usize) -> bool {
        !self.disabled_fans.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = StatsConfig::default();
        assert_eq!(config.network_mode, NetworkMode::Interface);
        assert_eq!(config.process_limit, None);
        assert_eq!(config.ram_process_count, 10);
        assert_eq!(config.max_plausible_temperature, 110.0);
        assert!(config.fan_enabled(0));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"network_mode": "process", "disabled_fans": [1], "health_mode": "percent"}}"#
        )
        .unwrap();

        let config = StatsConfig::load(file.path()).unwrap();
        assert_eq!(config.network_mode, NetworkMode::Process);
        assert_eq!(config.health_mode, HealthMode::Percent);
        assert!(config.fan_enabled(0));
        assert!(!config.fan_enabled(1));
        assert_eq!(config.ram_process_count, 10);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StatsConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = StatsConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn fahrenheit_conversion() {
        assert_eq!(TemperatureUnit::Fahrenheit.convert(0.0), 32.0);
        assert_eq!(TemperatureUnit::Celsius.convert(41.5), 41.5);
    }
}

//! Configuration file support for basal.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/basal/config.toml`.
//! The rule engine's clinical constants are deliberately absent.

use crate::fertility::{DEFAULT_CYCLE_LENGTH, DEFAULT_FUTURE_CYCLES, DEFAULT_LUTEAL_PHASE};
use crate::{Error, Result, TemperatureUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest configurable cycle, in days
pub const MAX_CYCLE_LENGTH: u32 = 90;

/// Most upcoming cycles that may be projected at once
pub const MAX_FUTURE_WINDOWS: usize = 60;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub cycle: CycleConfig,

    #[serde(default)]
    pub display: DisplayConfig,
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

/// Calendar prediction parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleConfig {
    /// Used when flow history has no plausible cycle lengths
    #[serde(default = "default_cycle_length")]
    pub default_length: u32,

    #[serde(default = "default_luteal_phase")]
    pub luteal_phase: u32,

    /// Upcoming cycles projected on the calendar
    #[serde(default = "default_future_windows")]
    pub future_windows: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            default_length: default_cycle_length(),
            luteal_phase: default_luteal_phase(),
            future_windows: default_future_windows(),
        }
    }
}

/// Output preferences
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("basal")
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_luteal_phase() -> u32 {
    DEFAULT_LUTEAL_PHASE
}

fn default_future_windows() -> usize {
    DEFAULT_FUTURE_CYCLES
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
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("basal").join("config.toml")
    }

    /// Reject parameter combinations that cannot describe a cycle
    pub fn validate(&self) -> Result<()> {
        let cycle = &self.cycle;
        if cycle.default_length == 0 || cycle.luteal_phase == 0 {
            return Err(Error::Config(
                "cycle length and luteal phase must be positive".into(),
            ));
        }
        if cycle.default_length > MAX_CYCLE_LENGTH {
            return Err(Error::Config(format!(
                "cycle length ({}) must be at most {} days",
                cycle.default_length, MAX_CYCLE_LENGTH
            )));
        }
        if cycle.future_windows > MAX_FUTURE_WINDOWS {
            return Err(Error::Config(format!(
                "future_windows ({}) must be at most {}",
                cycle.future_windows, MAX_FUTURE_WINDOWS
            )));
        }
        if cycle.luteal_phase >= cycle.default_length {
            return Err(Error::Config(format!(
                "luteal phase ({}) must be shorter than the cycle ({})",
                cycle.luteal_phase, cycle.default_length
            )));
        }
        Ok(())
    }

    /// Render as TOML, in the same layout `save_to` writes
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cycle.default_length, 28);
        assert_eq!(config.cycle.luteal_phase, 14);
        assert_eq!(config.cycle.future_windows, 8);
        assert_eq!(config.display.temperature_unit, TemperatureUnit::Celsius);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.cycle.default_length = 31;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.cycle, config.cycle);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[cycle]
default_length = 30

[display]
temperature_unit = "fahrenheit"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cycle.default_length, 30);
        assert_eq!(config.cycle.luteal_phase, 14); // default
        assert_eq!(config.display.temperature_unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_validate_rejects_luteal_longer_than_cycle() {
        let mut config = Config::default();
        config.cycle.luteal_phase = 28;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.cycle.default_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_values() {
        let mut config = Config::default();
        config.cycle.default_length = 4_000_000_000;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.cycle.default_length = MAX_CYCLE_LENGTH;
        assert!(config.validate().is_ok());

        config.cycle.future_windows = MAX_FUTURE_WINDOWS + 1;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}

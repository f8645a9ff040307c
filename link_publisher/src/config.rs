//! Publisher configuration (`link_publisher.toml`).
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "link-publisher"
//!
//! [link]
//! strategy = "auto"
//! tick_interval_ms = 20
//!
//! [simulation]
//! world_seed = 12345
//! player_uid = "sim-player"
//! orbit_radius = 8.0
//! orbit_period_s = 10.0
//! ```

use link::config::{ConfigError, ConfigLoader, LinkConfig, SharedConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Simulated host parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Report single-player mode (suppresses publishing).
    pub single_player: bool,
    /// World seed reported as the session context.
    pub world_seed: i64,
    /// Player identifier reported as the identity.
    pub player_uid: String,
    /// Radius of the circular walk, in blocks.
    pub orbit_radius: f64,
    /// Time for one full circle, in seconds.
    pub orbit_period_s: f64,
    /// Eye height above the feet.
    pub eye_height: f64,
    /// Ticks before the player entity exists.
    pub absent_ticks: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            single_player: false,
            world_seed: 12345,
            player_uid: "sim-player".to_string(),
            orbit_radius: 8.0,
            orbit_period_s: 10.0,
            eye_height: 1.62,
            absent_ticks: 0,
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `player_uid` is empty
    /// - `orbit_radius` is negative or not finite
    /// - `orbit_period_s` is not a positive finite number
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_uid.is_empty() {
            return Err(ConfigError::ValidationError(
                "player_uid cannot be empty".to_string(),
            ));
        }
        if !self.orbit_radius.is_finite() || self.orbit_radius < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "orbit_radius must be finite and >= 0, got {}",
                self.orbit_radius
            )));
        }
        if !self.orbit_period_s.is_finite() || self.orbit_period_s <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "orbit_period_s must be finite and > 0, got {}",
                self.orbit_period_s
            )));
        }
        if !self.eye_height.is_finite() {
            return Err(ConfigError::ValidationError(
                "eye_height must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level publisher configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Common settings
    #[serde(default)]
    pub shared: SharedConfig,
    /// Channel and record settings
    #[serde(default)]
    pub link: LinkConfig,
    /// Simulated host settings
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl PublisherConfig {
    /// Load and validate a configuration file.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `fallback` if it exists, else defaults.
    pub fn resolve(explicit: Option<&Path>, fallback: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_validated(path),
            None if fallback.exists() => Self::load_validated(fallback),
            None => Ok(Self::default()),
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.link.validate()?;
        self.simulation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link::config::{LogLevel, StrategyChoice};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = PublisherConfig::from_toml("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.shared.service_name, "link-publisher");
        assert_eq!(config.link.strategy, StrategyChoice::Auto);
        assert_eq!(config.simulation.world_seed, 12345);
    }

    #[test]
    fn test_load_validated() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[shared]
log_level = "trace"
service_name = "pub-01"

[link]
strategy = "presence"
tick_interval_ms = 10

[simulation]
single_player = true
player_uid = "abc"
absent_ticks = 3
"#
        )
        .unwrap();

        let config = PublisherConfig::load_validated(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Trace);
        assert_eq!(config.link.tick_interval_ms, 10);
        assert!(config.simulation.single_player);
        assert_eq!(config.simulation.absent_ticks, 3);
        assert_eq!(config.simulation.orbit_radius, 8.0);
    }

    #[test]
    fn test_invalid_simulation_rejected() {
        let config = PublisherConfig::from_toml("[simulation]\norbit_period_s = 0.0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let config = PublisherConfig::from_toml("[simulation]\norbit_radius = -1.0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config =
            PublisherConfig::from_toml(include_str!("../config/link_publisher.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.absent_ticks, 50);
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");

        let config = PublisherConfig::resolve(None, &absent).unwrap();
        assert_eq!(config.simulation.world_seed, 12345);

        assert!(matches!(
            PublisherConfig::resolve(Some(&absent), &absent),
            Err(ConfigError::FileNotFound)
        ));

        let fallback = dir.path().join("fallback.toml");
        std::fs::write(&fallback, "[simulation]\nworld_seed = 7\n").unwrap();
        let config = PublisherConfig::resolve(None, &fallback).unwrap();
        assert_eq!(config.simulation.world_seed, 7);
    }

    #[test]
    fn test_invalid_link_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[link]\ntick_interval_ms = 0").unwrap();
        assert!(PublisherConfig::load_validated(file.path()).is_err());
    }
}

//! Server configuration resource.
//!
//! Manages movement and tick settings loaded from an INI configuration file.
//! Provides defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [movement]
//! heartbeat_interval_ms = 500
//! unit_fraction = 0.001
//! default_speed = 4.0
//!
//! [server]
//! tick_ms = 50
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_HEARTBEAT_INTERVAL_MS: u32 = 500;
const DEFAULT_UNIT_FRACTION: f32 = 0.001;
const DEFAULT_MOVEMENT_SPEED: f32 = 4.0;
const DEFAULT_TICK_MS: u32 = 50;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Server configuration resource.
///
/// `unit_fraction` converts the movement speed attribute (world units per
/// second) into the per-millisecond displacement stored in a unit's move
/// vector.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Minimum time between two heartbeats of a moving unit.
    pub heartbeat_interval_ms: u32,
    /// Per-millisecond fraction of the movement speed.
    pub unit_fraction: f32,
    /// Movement speed given to freshly created units.
    pub default_movement_speed: f32,
    /// Simulation tick length.
    pub tick_ms: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
            unit_fraction: DEFAULT_UNIT_FRACTION,
            default_movement_speed: DEFAULT_MOVEMENT_SPEED,
            tick_ms: DEFAULT_TICK_MS,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [movement] section
        if let Some(interval) = config
            .getuint("movement", "heartbeat_interval_ms")
            .ok()
            .flatten()
        {
            self.heartbeat_interval_ms = interval as u32;
        }
        if let Some(fraction) = config.getfloat("movement", "unit_fraction").ok().flatten() {
            self.unit_fraction = fraction as f32;
        }
        if let Some(speed) = config.getfloat("movement", "default_speed").ok().flatten() {
            self.default_movement_speed = speed as f32;
        }

        // [server] section
        if let Some(tick) = config.getuint("server", "tick_ms").ok().flatten() {
            self.tick_ms = tick as u32;
        }

        info!(
            "Loaded config: heartbeat={}ms, unit_fraction={}, default_speed={}, tick={}ms",
            self.heartbeat_interval_ms,
            self.unit_fraction,
            self.default_movement_speed,
            self.tick_ms
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [movement] section
        config.set(
            "movement",
            "heartbeat_interval_ms",
            Some(self.heartbeat_interval_ms.to_string()),
        );
        config.set(
            "movement",
            "unit_fraction",
            Some(self.unit_fraction.to_string()),
        );
        config.set(
            "movement",
            "default_speed",
            Some(self.default_movement_speed.to_string()),
        );

        // [server] section
        config.set("server", "tick_ms", Some(self.tick_ms.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "unitmotion-{}-{}.ini",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::new();
        assert_eq!(config.heartbeat_interval_ms, 500);
        assert_eq!(config.tick_ms, 50);
        assert!((config.default_movement_speed - 4.0).abs() < 1e-6);
        assert!((config.unit_fraction - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let mut config = GameConfig::with_path(temp_config_path("does-not-exist"));
        assert!(config.load_from_file().is_err());
        assert_eq!(config.heartbeat_interval_ms, 500);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_config_path("roundtrip");
        let mut saved = GameConfig::with_path(&path);
        saved.heartbeat_interval_ms = 250;
        saved.default_movement_speed = 6.5;
        saved.tick_ms = 20;
        saved.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.heartbeat_interval_ms, 250);
        assert_eq!(loaded.tick_ms, 20);
        assert!((loaded.default_movement_speed - 6.5).abs() < 1e-6);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_config_path("partial");
        std::fs::write(&path, "[server]\ntick_ms = 100\n").unwrap();
        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.tick_ms, 100);
        assert_eq!(config.heartbeat_interval_ms, 500);
        let _ = std::fs::remove_file(&path);
    }
}

//! Tunable combat constants.
//!
//! Defaults reproduce the arcade tuning. A TOML file can override any subset
//! of fields; missing fields keep their default.

use std::fs;
use std::io;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration file name looked up next to the binary.
pub const CONFIG_FILE: &str = "planet_raid.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Playfield width in arena units.
    pub arena_width: f32,
    /// Playfield height in arena units.
    pub arena_height: f32,
    /// Distance of the ground line above the bottom edge.
    pub ground_margin: f32,
    /// Level-0 spawn interval; shrinks by 0.8 per level.
    pub base_spawn_interval_ms: f64,
    /// Delay between the boss warning and the boss arriving.
    pub boss_warning_delay_ms: u64,
    /// Target frame duration for the front-end loop.
    pub frame_ms: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            arena_width: 1000.0,
            arena_height: 600.0,
            ground_margin: 20.0,
            base_spawn_interval_ms: 4300.0,
            boss_warning_delay_ms: 3000,
            frame_ms: 16,
        }
    }
}

impl CombatConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::from_toml_str(&text)?;
                info!(path = %path.display(), "loaded combat config");
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.arena_width / 2.0, self.arena_height / 2.0)
    }

    /// The y coordinate the player stands on.
    pub fn ground_y(&self) -> f32 {
        self.arena_height - self.ground_margin
    }
}

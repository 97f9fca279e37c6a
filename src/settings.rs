//! Trainer settings and preferences
//!
//! Stored as JSON. The headless binary reads the path from
//! `AIM_TRAINER_SETTINGS`; anything missing falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::PersistenceError;
use crate::presets::Difficulty;
use crate::sim::{Playfield, SessionConfig};

/// Trainer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tier used when none is chosen
    pub difficulty: Difficulty,

    // === Session ===
    pub playfield_width: f32,
    pub playfield_height: f32,
    /// Length of a run (ms)
    pub session_duration_ms: f64,
    /// Headless tick interval (ms)
    pub tick_interval_ms: f64,
    /// Fixed RNG seed for reproducible runs (random when unset)
    pub seed: Option<u64>,

    // === Storage ===
    /// Result file used by the file-backed store
    pub results_path: PathBuf,
    /// Root of the sprite/audio files
    pub asset_dir: PathBuf,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            session_duration_ms: SESSION_DURATION_MS,
            tick_interval_ms: TICK_INTERVAL_MS,
            seed: None,

            results_path: PathBuf::from("aim_trainer_results.json"),
            asset_dir: PathBuf::from("static/aim_game"),

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Environment variable naming the settings file
    pub const ENV_PATH: &'static str = "AIM_TRAINER_SETTINGS";

    /// Simulation tunables derived from these settings
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            playfield: Playfield::new(self.playfield_width, self.playfield_height),
            ..SessionConfig::default()
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load from `AIM_TRAINER_SETTINGS`, or defaults
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {path}");
                settings
            }
            Err(e) => {
                log::warn!("Could not load settings from {path} ({e}), using defaults");
                Self::default()
            }
        }
    }
}

//! Difficulty presets
//!
//! One immutable configuration per tier, defined at compile time and looked
//! up by key.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Wire/storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Human-readable label (used by the recent-results feed)
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn preset(&self) -> &'static DifficultyPreset {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Normal => &NORMAL,
            Difficulty::Hard => &HARD,
        }
    }
}

impl FromStr for Difficulty {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(SimError::UnknownDifficulty(other.to_string())),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Linear interpolation across the range (`t` in [0, 1])
    #[inline]
    pub fn lerp(&self, t: f64) -> f64 {
        self.min as f64 + (self.max as f64 - self.min as f64) * t
    }
}

/// Per-tier tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyPreset {
    /// Target radius (px)
    pub radius: u32,
    /// Delay between spawns (ms)
    pub spawn_interval_ms: Range,
    /// How long a target stays up before it counts as a miss (ms)
    pub lifetime_ms: u32,
    /// Target speed (px/s)
    pub speed: Range,
    /// Live target cap
    pub max_concurrent: u32,
    /// Hits within this distance of the center are critical (px)
    pub critical_threshold_px: u32,
}

impl DifficultyPreset {
    /// Structural sanity of the table entry
    pub fn is_consistent(&self) -> bool {
        self.spawn_interval_ms.min <= self.spawn_interval_ms.max
            && self.speed.min <= self.speed.max
            && self.lifetime_ms > 0
            && self.max_concurrent >= 1
            && self.critical_threshold_px <= self.radius
    }
}

const EASY: DifficultyPreset = DifficultyPreset {
    radius: 28,
    spawn_interval_ms: Range::new(800, 1000),
    lifetime_ms: 1600,
    speed: Range::new(0, 60),
    max_concurrent: 3,
    critical_threshold_px: 6,
};

const NORMAL: DifficultyPreset = DifficultyPreset {
    radius: 22,
    spawn_interval_ms: Range::new(600, 800),
    lifetime_ms: 1300,
    speed: Range::new(60, 120),
    max_concurrent: 4,
    critical_threshold_px: 4,
};

const HARD: DifficultyPreset = DifficultyPreset {
    radius: 16,
    spawn_interval_ms: Range::new(400, 600),
    lifetime_ms: 1000,
    speed: Range::new(120, 180),
    max_concurrent: 5,
    critical_threshold_px: 3,
};

/// Look up a preset by its key (`easy`, `normal`, `hard`)
pub fn get(key: &str) -> Result<&'static DifficultyPreset, SimError> {
    key.parse::<Difficulty>().map(|d| d.preset())
}

//! Session state and core simulation types

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::presets::{Difficulty, DifficultyPreset};

/// Opaque target handle. Assigned monotonically and never reused within a
/// session, so a stale handle can never resolve to a different target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub(crate) u32);

impl TargetId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live circular target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    /// Center (px)
    pub pos: Vec2,
    /// Velocity (px/s)
    pub vel: Vec2,
    pub radius: u32,
    pub spawned_at_ms: f64,
    pub expires_at_ms: f64,
    /// Last time the position was integrated
    pub(crate) moved_at_ms: f64,
}

impl Target {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.expires_at_ms <= now_ms
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance(point) <= self.radius as f32
    }
}

/// Spawn and resolve time of one successful hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitTime {
    pub spawned_at_ms: f64,
    pub resolved_at_ms: f64,
}

impl HitTime {
    /// Time to kill, never negative
    pub fn ttk_ms(&self) -> f64 {
        (self.resolved_at_ms - self.spawned_at_ms).max(0.0)
    }
}

/// Semantic events for the presentation layer (audio cues, effects)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: TargetId },
    Hit { id: TargetId, ttk_ms: f64, points: u32 },
    Critical { id: TargetId, ttk_ms: f64, points: u32 },
    Missed { id: TargetId },
    Finished,
}

/// Mutable state of a running session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub difficulty: Difficulty,
    pub preset: DifficultyPreset,
    pub started_at_ms: f64,
    /// Time of the last processed tick
    pub last_tick_ms: f64,
    /// Live targets keyed by id (iteration is in spawn order)
    pub live_targets: BTreeMap<TargetId, Target>,
    pub next_spawn_at_ms: f64,
    pub score: u32,
    pub kills: u32,
    pub misses: u32,
    /// Current streak
    pub combo: u32,
    pub max_combo: u32,
    pub critical_hits: u32,
    pub hit_times: Vec<HitTime>,
    pub total_spawned: u32,
    /// Next target ID
    next_id: u32,
}

impl SessionState {
    pub fn new(difficulty: Difficulty, started_at_ms: f64, next_spawn_at_ms: f64) -> Self {
        Self {
            difficulty,
            preset: *difficulty.preset(),
            started_at_ms,
            last_tick_ms: started_at_ms,
            live_targets: BTreeMap::new(),
            next_spawn_at_ms,
            score: 0,
            kills: 0,
            misses: 0,
            combo: 0,
            max_combo: 0,
            critical_hits: 0,
            hit_times: Vec::new(),
            total_spawned: 0,
            next_id: 1,
        }
    }

    /// Allocate a new target ID
    pub fn next_target_id(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn live_count(&self) -> usize {
        self.live_targets.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.live_targets.len() < self.preset.max_concurrent as usize
    }

    pub fn elapsed_ms(&self) -> f64 {
        (self.last_tick_ms - self.started_at_ms).max(0.0)
    }
}

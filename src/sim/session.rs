//! Session state machine
//!
//! `Idle -> Running -> Finished`. A session is driven by one logical time
//! source: `tick` and the hit calls must not interleave. Hosts that deliver
//! ticks and input from different threads wrap the session in a
//! [`SharedSession`].

use std::sync::{Arc, Mutex};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::playfield::Playfield;
use super::rng::{PcgSource, RandomSource};
use super::state::{GameEvent, HitTime, SessionState, Target, TargetId};
use super::tick;
use crate::consts::{BASE_HIT_POINTS, CRITICAL_MULTIPLIER};
use crate::error::SimError;
use crate::metrics::{self, LiveMetrics};
use crate::presets::Difficulty;
use crate::results::GameResultSnapshot;

/// Externally visible lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Running,
    Finished,
}

/// Tunables that are not part of a difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub playfield: Playfield,
    /// Points for a regular hit (at least 1)
    pub base_points: u32,
    /// Critical hit = base_points * critical_multiplier (at least 2)
    pub critical_multiplier: u32,
}

impl SessionConfig {
    /// Config with scoring raised to its minimums, so a critical hit always
    /// outscores a regular one
    pub fn normalized(self) -> Self {
        let normalized = Self {
            base_points: self.base_points.max(1),
            critical_multiplier: self.critical_multiplier.max(2),
            ..self
        };
        if normalized != self {
            log::warn!(
                "Scoring config raised to {} points x{} critical",
                normalized.base_points,
                normalized.critical_multiplier
            );
        }
        normalized
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            base_points: BASE_HIT_POINTS,
            critical_multiplier: CRITICAL_MULTIPLIER,
        }
    }
}

/// Result of a successful hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub id: TargetId,
    pub ttk_ms: f64,
    pub points: u32,
    pub critical: bool,
}

/// Result of a click resolved by position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    Hit(HitOutcome),
    /// Landed on no live target; no counter changes
    Whiff,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Running(SessionState),
    Finished {
        state: SessionState,
        snapshot: GameResultSnapshot,
    },
}

/// One play-through from start to end
#[derive(Debug, Clone)]
pub struct Session<R: RandomSource = PcgSource> {
    config: SessionConfig,
    rng: R,
    phase: Phase,
    events: Vec<GameEvent>,
}

/// Session behind a lock, for multi-threaded hosts
pub type SharedSession<R = PcgSource> = Arc<Mutex<Session<R>>>;

impl Session<PcgSource> {
    /// Session with a seeded PCG source and default tunables
    pub fn seeded(seed: u64) -> Self {
        Self::new(SessionConfig::default(), PcgSource::new(seed))
    }
}

impl<R: RandomSource> Session<R> {
    pub fn new(config: SessionConfig, rng: R) -> Self {
        Self {
            config: config.normalized(),
            rng,
            phase: Phase::Idle,
            events: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedSession<R> {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        match self.phase {
            Phase::Idle => SessionPhase::Idle,
            Phase::Running(_) => SessionPhase::Running,
            Phase::Finished { .. } => SessionPhase::Finished,
        }
    }

    /// State of a running or finished session
    pub fn state(&self) -> Option<&SessionState> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Running(state) | Phase::Finished { state, .. } => Some(state),
        }
    }

    /// Live targets in spawn order (empty unless running)
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        let running = match &self.phase {
            Phase::Running(state) => Some(state),
            _ => None,
        };
        running.into_iter().flat_map(|s| s.live_targets.values())
    }

    /// Final snapshot, once finished
    pub fn snapshot(&self) -> Option<&GameResultSnapshot> {
        match &self.phase {
            Phase::Finished { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a run. Only valid from `Idle`.
    pub fn start(&mut self, difficulty: Difficulty, now_ms: f64) -> Result<(), SimError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(SimError::AlreadyStarted);
        }
        let mut state = SessionState::new(difficulty, now_ms, now_ms);
        state.next_spawn_at_ms = now_ms + tick::next_interval(&state, &mut self.rng);
        log::info!(
            "Session started on {} (first spawn at {:.0}ms)",
            difficulty,
            state.next_spawn_at_ms
        );
        self.phase = Phase::Running(state);
        Ok(())
    }

    /// Begin a run from a difficulty key
    pub fn start_with_key(&mut self, key: &str, now_ms: f64) -> Result<(), SimError> {
        let difficulty = key.parse()?;
        self.start(difficulty, now_ms)
    }

    /// Advance to `now_ms`: expire, spawn, move
    pub fn tick(&mut self, now_ms: f64) -> Result<(), SimError> {
        let Phase::Running(state) = &mut self.phase else {
            return Err(SimError::SessionNotRunning);
        };
        tick::tick(
            state,
            now_ms,
            &self.config.playfield,
            &mut self.rng,
            &mut self.events,
        );
        Ok(())
    }

    /// Resolve a hit on `id` at `hit_point` (playfield coordinates).
    ///
    /// Fails with `UnknownTarget` if the target is not live, including one
    /// whose lifetime ran out but has not yet been swept by a tick.
    pub fn register_hit(
        &mut self,
        id: TargetId,
        hit_point: Vec2,
        now_ms: f64,
    ) -> Result<HitOutcome, SimError> {
        let Phase::Running(state) = &mut self.phase else {
            return Err(SimError::SessionNotRunning);
        };
        match state.live_targets.get(&id) {
            Some(target) if !target.is_expired(now_ms) => {}
            _ => return Err(SimError::UnknownTarget(id)),
        }
        let Some(target) = state.live_targets.remove(&id) else {
            return Err(SimError::UnknownTarget(id));
        };

        let hit = HitTime {
            spawned_at_ms: target.spawned_at_ms,
            resolved_at_ms: now_ms,
        };
        let ttk_ms = hit.ttk_ms();
        state.hit_times.push(hit);
        state.kills += 1;
        state.combo += 1;
        state.max_combo = state.max_combo.max(state.combo);

        let critical =
            target.pos.distance(hit_point) <= state.preset.critical_threshold_px as f32;
        let points = if critical {
            state.critical_hits += 1;
            self.config.base_points * self.config.critical_multiplier
        } else {
            self.config.base_points
        };
        state.score += points;

        log::debug!(
            "Hit target {id} after {ttk_ms:.0}ms (+{points}{}, combo {})",
            if critical { " critical" } else { "" },
            state.combo
        );
        self.events.push(if critical {
            GameEvent::Critical { id, ttk_ms, points }
        } else {
            GameEvent::Hit { id, ttk_ms, points }
        });

        Ok(HitOutcome {
            id,
            ttk_ms,
            points,
            critical,
        })
    }

    /// UI-facing hit: a stale id is logged and ignored (`Ok(None)`)
    pub fn try_hit(
        &mut self,
        id: TargetId,
        hit_point: Vec2,
        now_ms: f64,
    ) -> Result<Option<HitOutcome>, SimError> {
        match self.register_hit(id, hit_point, now_ms) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(SimError::UnknownTarget(id)) => {
                log::debug!("Ignoring stale hit on target {id}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a click by position. Overlapping targets resolve to the most
    /// recently spawned one.
    pub fn register_click(&mut self, point: Vec2, now_ms: f64) -> Result<ClickOutcome, SimError> {
        let Phase::Running(state) = &self.phase else {
            return Err(SimError::SessionNotRunning);
        };
        let found = state
            .live_targets
            .values()
            .rev()
            .find(|t| !t.is_expired(now_ms) && t.contains(point))
            .map(|t| t.id);

        match found {
            Some(id) => self.register_hit(id, point, now_ms).map(ClickOutcome::Hit),
            None => Ok(ClickOutcome::Whiff),
        }
    }

    /// HUD metrics for a running or finished session
    pub fn live_metrics(&self) -> Result<LiveMetrics, SimError> {
        self.state()
            .map(metrics::live)
            .ok_or(SimError::SessionNotRunning)
    }

    /// Finish the run, stamping it with the current wall-clock time
    pub fn end(&mut self, now_ms: f64) -> Result<GameResultSnapshot, SimError> {
        self.end_at(now_ms, crate::unix_now_ms())
    }

    /// Finish the run. Calling again returns the same snapshot unchanged.
    pub fn end_at(
        &mut self,
        now_ms: f64,
        played_at_ms: u64,
    ) -> Result<GameResultSnapshot, SimError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => Err(SimError::SessionNotRunning),
            Phase::Finished { state, snapshot } => {
                let result = snapshot.clone();
                self.phase = Phase::Finished { state, snapshot };
                Ok(result)
            }
            Phase::Running(mut state) => {
                state.last_tick_ms = state.last_tick_ms.max(now_ms);
                state.live_targets.clear();
                let snapshot = metrics::snapshot(&state, played_at_ms);
                log::info!(
                    "Session finished: {} pts, {} kills, {} misses, {:.1}% accuracy",
                    snapshot.score,
                    snapshot.kills,
                    snapshot.misses,
                    snapshot.accuracy
                );
                self.events.push(GameEvent::Finished);
                self.phase = Phase::Finished {
                    state,
                    snapshot: snapshot.clone(),
                };
                Ok(snapshot)
            }
        }
    }
}

//! Per-tick simulation passes
//!
//! A tick runs three passes in a fixed order: expiry, spawn, motion.

use std::f32::consts::TAU;

use glam::Vec2;

use super::playfield::Playfield;
use super::rng::RandomSource;
use super::state::{GameEvent, SessionState, Target};

/// Remove every target whose lifetime has run out. Each one is a miss and
/// breaks the combo.
pub fn expiry_pass(state: &mut SessionState, now_ms: f64, events: &mut Vec<GameEvent>) {
    let expired: Vec<_> = state
        .live_targets
        .values()
        .filter(|t| t.is_expired(now_ms))
        .map(|t| t.id)
        .collect();

    for id in expired {
        state.live_targets.remove(&id);
        state.misses += 1;
        state.combo = 0;
        log::debug!("Target {id} expired at {now_ms:.0}ms");
        events.push(GameEvent::Missed { id });
    }
}

/// Spawn while there is capacity and the spawn timer has fired.
///
/// Random draws per spawn, in order: position x, position y, heading,
/// speed, then the next spawn interval.
pub fn spawn_pass(
    state: &mut SessionState,
    now_ms: f64,
    playfield: &Playfield,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) {
    while state.has_capacity() && now_ms >= state.next_spawn_at_ms {
        let preset = state.preset;
        let radius = preset.radius as f32;
        let pos = playfield.sample_position(radius, rng);
        let heading = rng.next_unit() as f32 * TAU;
        let speed = preset.speed.lerp(rng.next_unit()) as f32;
        let vel = Vec2::from_angle(heading) * speed;

        let id = state.next_target_id();
        state.live_targets.insert(
            id,
            Target {
                id,
                pos,
                vel,
                radius: preset.radius,
                spawned_at_ms: now_ms,
                expires_at_ms: now_ms + preset.lifetime_ms as f64,
                moved_at_ms: now_ms,
            },
        );
        state.total_spawned += 1;
        state.next_spawn_at_ms = now_ms + next_interval(state, rng);
        log::debug!(
            "Spawned target {id} at ({:.0}, {:.0}), next spawn at {:.0}ms",
            pos.x,
            pos.y,
            state.next_spawn_at_ms
        );
        events.push(GameEvent::Spawned { id });
    }
}

/// Integrate positions up to `now_ms`, bouncing off the playfield edges
pub fn motion_pass(state: &mut SessionState, now_ms: f64, playfield: &Playfield) {
    for target in state.live_targets.values_mut() {
        let dt_ms = now_ms - target.moved_at_ms;
        if dt_ms <= 0.0 {
            continue;
        }
        let (pos, vel) = playfield.advance(
            target.pos,
            target.vel,
            target.radius as f32,
            (dt_ms / 1000.0) as f32,
        );
        target.pos = pos;
        target.vel = vel;
        target.moved_at_ms = now_ms;
    }
}

/// Draw the delay until the next spawn
pub fn next_interval(state: &SessionState, rng: &mut dyn RandomSource) -> f64 {
    state.preset.spawn_interval_ms.lerp(rng.next_unit())
}

/// Advance the session state to `now_ms`
pub fn tick(
    state: &mut SessionState,
    now_ms: f64,
    playfield: &Playfield,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) {
    expiry_pass(state, now_ms, events);
    spawn_pass(state, now_ms, playfield, rng, events);
    motion_pass(state, now_ms, playfield);
    state.last_tick_ms = state.last_tick_ms.max(now_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Difficulty;
    use crate::sim::rng::SequenceSource;

    fn easy_state() -> SessionState {
        SessionState::new(Difficulty::Easy, 0.0, 900.0)
    }

    #[test]
    fn test_spawn_waits_for_timer() {
        let mut state = easy_state();
        let mut rng = SequenceSource::constant(0.5);
        let mut events = Vec::new();
        spawn_pass(&mut state, 899.0, &Playfield::default(), &mut rng, &mut events);
        assert_eq!(state.total_spawned, 0);
        spawn_pass(&mut state, 900.0, &Playfield::default(), &mut rng, &mut events);
        assert_eq!(state.total_spawned, 1);
        assert_eq!(state.next_spawn_at_ms, 1800.0);
        assert!(matches!(events[0], GameEvent::Spawned { .. }));
    }

    #[test]
    fn test_spawn_respects_capacity() {
        let mut state = easy_state();
        let mut rng = SequenceSource::constant(0.5);
        let mut events = Vec::new();
        // Way past several spawn timers
        for now in [900.0, 1800.0, 2700.0, 3600.0] {
            state.next_spawn_at_ms = 0.0;
            spawn_pass(&mut state, now, &Playfield::default(), &mut rng, &mut events);
        }
        assert_eq!(state.live_count(), 3);
        assert_eq!(state.total_spawned, 3);
    }

    #[test]
    fn test_spawned_target_fields() {
        let mut state = easy_state();
        // x, y, heading (0 => +x), speed (max), interval (min)
        let mut rng = SequenceSource::new(vec![0.0, 0.0, 0.0, 0.999_999, 0.0]);
        let mut events = Vec::new();
        spawn_pass(&mut state, 900.0, &Playfield::default(), &mut rng, &mut events);
        let target = state.live_targets.values().next().unwrap();
        assert_eq!(target.pos, Vec2::new(28.0, 28.0));
        assert_eq!(target.radius, 28);
        assert_eq!(target.expires_at_ms, 2500.0);
        assert!((target.vel.x - 60.0).abs() < 0.01);
        assert!(target.vel.y.abs() < 0.01);
        assert_eq!(state.next_spawn_at_ms, 1700.0);
    }

    #[test]
    fn test_expiry_counts_miss_and_breaks_combo() {
        let mut state = easy_state();
        let mut rng = SequenceSource::constant(0.5);
        let mut events = Vec::new();
        spawn_pass(&mut state, 900.0, &Playfield::default(), &mut rng, &mut events);
        state.combo = 4;
        expiry_pass(&mut state, 2499.0, &mut events);
        assert_eq!(state.misses, 0);
        expiry_pass(&mut state, 2500.0, &mut events);
        assert_eq!(state.misses, 1);
        assert_eq!(state.combo, 0);
        assert_eq!(state.live_count(), 0);
        assert!(matches!(events.last(), Some(GameEvent::Missed { .. })));
    }

    #[test]
    fn test_motion_moves_targets() {
        let mut state = easy_state();
        // Heading 0, speed 30 px/s
        let mut rng = SequenceSource::new(vec![0.5, 0.5, 0.0, 0.5, 0.5]);
        let mut events = Vec::new();
        let field = Playfield::default();
        spawn_pass(&mut state, 900.0, &field, &mut rng, &mut events);
        let start = state.live_targets.values().next().unwrap().pos;
        motion_pass(&mut state, 1900.0, &field);
        let end = state.live_targets.values().next().unwrap().pos;
        assert!((end.x - start.x - 30.0).abs() < 0.01);
        assert!((end.y - start.y).abs() < 0.01);
    }
}

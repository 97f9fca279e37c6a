//! Derived session metrics
//!
//! Pure reads over [`SessionState`]; safe to call every frame for a HUD or
//! once at the end for the final snapshot.

use serde::{Deserialize, Serialize};

use crate::results::GameResultSnapshot;
use crate::sim::SessionState;

/// Hit percentage of spawned targets, clamped to [0, 100]. Zero before
/// anything has spawned.
pub fn accuracy(state: &SessionState) -> f64 {
    if state.total_spawned == 0 {
        return 0.0;
    }
    (state.kills as f64 / state.total_spawned as f64 * 100.0).clamp(0.0, 100.0)
}

/// Mean time-to-kill over all hits (ms), zero without hits
pub fn avg_ttk_ms(state: &SessionState) -> f64 {
    if state.hit_times.is_empty() {
        return 0.0;
    }
    let total: f64 = state.hit_times.iter().map(|h| h.ttk_ms()).sum();
    (total / state.hit_times.len() as f64).max(0.0)
}

/// HUD view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub score: u32,
    pub kills: u32,
    pub misses: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub critical_hits: u32,
    pub total_spawned: u32,
    pub live_targets: usize,
    pub accuracy: f64,
    pub avg_ttk_ms: f64,
    pub elapsed_ms: f64,
}

pub fn live(state: &SessionState) -> LiveMetrics {
    LiveMetrics {
        score: state.score,
        kills: state.kills,
        misses: state.misses,
        combo: state.combo,
        max_combo: state.max_combo,
        critical_hits: state.critical_hits,
        total_spawned: state.total_spawned,
        live_targets: state.live_count(),
        accuracy: accuracy(state),
        avg_ttk_ms: avg_ttk_ms(state),
        elapsed_ms: state.elapsed_ms(),
    }
}

/// Freeze the state into a boundary snapshot
pub fn snapshot(state: &SessionState, played_at_ms: u64) -> GameResultSnapshot {
    GameResultSnapshot {
        score: state.score,
        kills: state.kills,
        accuracy: accuracy(state),
        avg_ttk_ms: avg_ttk_ms(state),
        max_combo: state.max_combo,
        misses: state.misses,
        difficulty: state.difficulty,
        played_at_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Difficulty;
    use crate::sim::state::HitTime;

    fn state() -> SessionState {
        SessionState::new(Difficulty::Normal, 0.0, 700.0)
    }

    #[test]
    fn test_empty_session() {
        let s = state();
        assert_eq!(accuracy(&s), 0.0);
        assert_eq!(avg_ttk_ms(&s), 0.0);
        let m = live(&s);
        assert_eq!(m.kills, 0);
        assert_eq!(m.live_targets, 0);
    }

    #[test]
    fn test_accuracy() {
        let mut s = state();
        s.total_spawned = 8;
        s.kills = 6;
        s.misses = 1;
        assert_eq!(accuracy(&s), 75.0);
    }

    #[test]
    fn test_avg_ttk() {
        let mut s = state();
        s.hit_times = vec![
            HitTime {
                spawned_at_ms: 0.0,
                resolved_at_ms: 200.0,
            },
            HitTime {
                spawned_at_ms: 1000.0,
                resolved_at_ms: 1400.0,
            },
        ];
        assert_eq!(avg_ttk_ms(&s), 300.0);
    }

    #[test]
    fn test_snapshot_copies_counters() {
        let mut s = state();
        s.score = 500;
        s.kills = 4;
        s.misses = 2;
        s.max_combo = 3;
        s.total_spawned = 8;
        let snap = snapshot(&s, 42);
        assert_eq!(snap.score, 500);
        assert_eq!(snap.accuracy, 50.0);
        assert_eq!(snap.difficulty, Difficulty::Normal);
        assert_eq!(snap.played_at_ms, 42);
    }
}

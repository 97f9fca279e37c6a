//! Playfield geometry
//!
//! Targets live inside an axis-aligned rectangle with the origin at the
//! top-left corner. The only geometry rule is that a circle bounces off the
//! edges so it always stays fully on screen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

/// Playfield bounds in px
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center-point bounds for a circle of `radius` (min, max). Degenerates
    /// to the center when the circle is larger than the field.
    fn center_bounds(&self, radius: f32) -> (Vec2, Vec2) {
        let min = Vec2::splat(radius);
        let max = Vec2::new(self.width - radius, self.height - radius);
        let mid = Vec2::new(self.width, self.height) * 0.5;
        (min.min(mid), max.max(mid))
    }

    /// Sample a center so the full circle fits. Consumes two samples (x, y).
    pub fn sample_position(&self, radius: f32, rng: &mut dyn RandomSource) -> Vec2 {
        let (min, max) = self.center_bounds(radius);
        let tx = rng.next_unit() as f32;
        let ty = rng.next_unit() as f32;
        min + (max - min) * Vec2::new(tx, ty)
    }

    /// Whether the full circle is inside the field
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        let (min, max) = self.center_bounds(radius);
        center.cmpge(min).all() && center.cmple(max).all()
    }

    /// Advance a circle by `vel * dt_secs`, reflecting off the edges
    pub fn advance(&self, pos: Vec2, vel: Vec2, radius: f32, dt_secs: f32) -> (Vec2, Vec2) {
        let (min, max) = self.center_bounds(radius);
        let mut pos = pos + vel * dt_secs;
        let mut vel = vel;

        for axis in 0..2 {
            let (lo, hi) = (min[axis], max[axis]);
            let span = hi - lo;
            if span <= 0.0 {
                pos[axis] = lo;
                continue;
            }
            // Fold the overshoot back into range; a fast target can cross
            // the field more than once in a long tick
            let mut offset = (pos[axis] - lo).rem_euclid(2.0 * span);
            let crossings = ((pos[axis] - lo) / span).floor() as i64;
            if offset > span {
                offset = 2.0 * span - offset;
            }
            pos[axis] = (lo + offset).clamp(lo, hi);
            if crossings.rem_euclid(2) == 1 {
                vel[axis] = -vel[axis];
            }
        }

        (pos, vel)
    }
}

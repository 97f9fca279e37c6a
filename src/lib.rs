//! Aim Trainer - target-spawning and scoring simulation
//!
//! Core modules:
//! - `presets`: Immutable per-difficulty configuration
//! - `sim`: Deterministic session simulation (spawning, expiry, motion, hits)
//! - `metrics`: Derived metrics (accuracy, time-to-kill, snapshots)
//! - `results`/`persistence`: Result snapshots and the repository they are saved to
//! - `submit`/`wire`: Boundary validation and the result wire format
//! - `assets`: Sprite/audio handles per difficulty and event
//! - `settings`: User configuration

pub mod assets;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod presets;
pub mod results;
pub mod settings;
pub mod sim;
pub mod submit;
pub mod wire;

pub use error::{PersistenceError, SimError, SubmitError};
pub use presets::{Difficulty, DifficultyPreset};
pub use results::{GameResultSnapshot, ResultId, ResultStore};
pub use settings::Settings;
pub use sim::{Session, SessionPhase};

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions (px)
    pub const PLAYFIELD_WIDTH: f32 = 960.0;
    pub const PLAYFIELD_HEIGHT: f32 = 540.0;

    /// Points for a regular hit
    pub const BASE_HIT_POINTS: u32 = 100;
    /// Critical hits are worth this many regular hits
    pub const CRITICAL_MULTIPLIER: u32 = 2;

    /// Default session length (ms)
    pub const SESSION_DURATION_MS: f64 = 30_000.0;
    /// Default headless tick interval (~60 Hz)
    pub const TICK_INTERVAL_MS: f64 = 1000.0 / 60.0;

    /// Number of entries served by the recent-results feed
    pub const RECENT_RESULTS_LIMIT: usize = 10;
}

/// Current wall-clock time as unix milliseconds
pub fn unix_now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Format unix milliseconds as an ISO-8601 UTC timestamp
/// (`2024-01-31T12:00:00.000+00:00`)
pub fn format_iso8601(unix_ms: u64) -> String {
    let secs = unix_ms / 1000;
    let millis = unix_ms % 1000;
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}+00:00",
        year,
        month,
        day,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
        millis
    )
}

/// Days since 1970-01-01 to (year, month, day), proleptic Gregorian
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

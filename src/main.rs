//! Aim Trainer headless entry point
//!
//! Plays one session with a simple bot, submits the result and prints the
//! recent-results feed. Usage: `aim-trainer [easy|normal|hard]`.

use std::process::ExitCode;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use aim_trainer::assets::{AssetProvider, SoundCue, StaticAssets};
use aim_trainer::persistence::{JsonFileStore, MemoryStore};
use aim_trainer::sim::{ClickOutcome, PcgSource, Session, SessionState};
use aim_trainer::submit::ResultSubmitter;
use aim_trainer::{Difficulty, ResultStore, Settings, wire};

/// Bot reaction time range (ms)
const BOT_REACTION_MS: (f64, f64) = (220.0, 520.0);
/// Bot aim error (px)
const BOT_AIM_ERROR_PX: f32 = 9.0;

/// Clicks the oldest target once it has been visible for its reaction time
struct Bot {
    rng: Pcg32,
    reaction_ms: f64,
}

impl Bot {
    fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let reaction_ms = rng.random_range(BOT_REACTION_MS.0..BOT_REACTION_MS.1);
        Self { rng, reaction_ms }
    }

    fn aim(&mut self, state: &SessionState, now_ms: f64) -> Option<glam::Vec2> {
        let target = state
            .live_targets
            .values()
            .find(|t| now_ms - t.spawned_at_ms >= self.reaction_ms)?;
        let error = glam::Vec2::new(
            self.rng.random_range(-BOT_AIM_ERROR_PX..BOT_AIM_ERROR_PX),
            self.rng.random_range(-BOT_AIM_ERROR_PX..BOT_AIM_ERROR_PX),
        );
        self.reaction_ms = self.rng.random_range(BOT_REACTION_MS.0..BOT_REACTION_MS.1);
        Some(target.pos + error)
    }
}

fn open_store(settings: &Settings) -> Box<dyn ResultStore> {
    match JsonFileStore::open(&settings.results_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("Results file unavailable ({e}), keeping results in memory");
            Box::new(MemoryStore::new())
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load();
    let difficulty = match std::env::args().nth(1) {
        Some(key) => key.parse::<Difficulty>()?,
        None => settings.difficulty,
    };

    let rng = match settings.seed {
        Some(seed) => PcgSource::new(seed),
        None => PcgSource::from_entropy(),
    };
    log::info!("Seed {}", rng.seed());
    let mut bot = Bot::new(rng.seed().wrapping_add(1));
    let assets = StaticAssets::from_settings(&settings);
    let sprite = assets.sprite_for(difficulty);
    log::debug!("Target sprite {}", sprite.path.display());

    let mut session = Session::new(settings.session_config(), rng);
    session.start(difficulty, 0.0)?;

    let mut now = 0.0;
    while now < settings.session_duration_ms {
        session.tick(now)?;
        let aim = session.state().and_then(|state| bot.aim(state, now));
        if let Some(point) = aim {
            if let ClickOutcome::Whiff = session.register_click(point, now)? {
                log::debug!("Bot whiffed at ({:.0}, {:.0})", point.x, point.y);
            }
        }
        for event in session.drain_events() {
            if let Some(cue) = SoundCue::for_event(&event) {
                let sound = assets.sound_for(cue);
                log::trace!(
                    "{} cue ({}, gain {:.2})",
                    cue.as_str(),
                    sound.path.display(),
                    sound.gain
                );
            }
        }
        now += settings.tick_interval_ms;
    }

    let snapshot = session.end(now)?;
    println!(
        "{} run: {} pts, {} kills, {} misses, {:.1}% accuracy, {:.0}ms avg TTK, max combo {}",
        snapshot.difficulty.label(),
        snapshot.score,
        snapshot.kills,
        snapshot.misses,
        snapshot.accuracy,
        snapshot.avg_ttk_ms,
        snapshot.max_combo
    );

    let mut submitter = ResultSubmitter::new(open_store(&settings));
    let id = submitter.submit(&snapshot)?;
    println!("Saved as result {id}");

    let feed = wire::handle_recent(submitter.store());
    println!("{}", serde_json::to_string_pretty(&feed.body)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Aim Trainer (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

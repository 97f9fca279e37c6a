//! Asset handles
//!
//! The simulation only emits semantic events and difficulty keys; the
//! provider maps them to sprite and audio handles. How the files are drawn
//! or synthesized is not this crate's concern.

use std::path::{Path, PathBuf};

use crate::presets::Difficulty;
use crate::settings::Settings;
use crate::sim::GameEvent;

/// Audio cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Regular hit
    Hit,
    /// Hit inside the critical radius
    Critical,
    /// Target expired
    Miss,
    /// Session over
    Finish,
}

impl SoundCue {
    pub const ALL: [SoundCue; 4] = [
        SoundCue::Hit,
        SoundCue::Critical,
        SoundCue::Miss,
        SoundCue::Finish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Hit => "hit",
            SoundCue::Critical => "critical",
            SoundCue::Miss => "miss",
            SoundCue::Finish => "finish",
        }
    }

    /// Mix level of the cue before user volume is applied
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundCue::Hit => 0.45,
            SoundCue::Critical => 0.5,
            SoundCue::Miss => 0.38,
            SoundCue::Finish => 0.55,
        }
    }

    /// Cue for a simulation event (spawns are silent)
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Spawned { .. } => None,
            GameEvent::Hit { .. } => Some(SoundCue::Hit),
            GameEvent::Critical { .. } => Some(SoundCue::Critical),
            GameEvent::Missed { .. } => Some(SoundCue::Miss),
            GameEvent::Finished => Some(SoundCue::Finish),
        }
    }
}

/// Handle to a target sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteHandle {
    pub path: PathBuf,
    /// Sprite edge length (px), twice the target radius
    pub size: u32,
}

/// Handle to an audio clip with its playback gain
#[derive(Debug, Clone, PartialEq)]
pub struct AudioHandle {
    pub path: PathBuf,
    pub gain: f32,
}

/// Supplies presentation assets
pub trait AssetProvider {
    fn sprite_for(&self, difficulty: Difficulty) -> SpriteHandle;
    fn sound_for(&self, cue: SoundCue) -> AudioHandle;
}

/// File-based assets under `<base>/img/target_<tier>.png` and
/// `<base>/audio/<cue>.wav`
#[derive(Debug, Clone)]
pub struct StaticAssets {
    base_dir: PathBuf,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl StaticAssets {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Provider using the user's audio preferences
    pub fn from_settings(settings: &Settings) -> Self {
        let mut assets = Self::new(&settings.asset_dir);
        assets.set_master_volume(settings.master_volume);
        assets.set_sfx_volume(settings.sfx_volume);
        assets.set_muted(settings.muted);
        assets
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

impl AssetProvider for StaticAssets {
    fn sprite_for(&self, difficulty: Difficulty) -> SpriteHandle {
        SpriteHandle {
            path: self
                .base_dir
                .join("img")
                .join(format!("target_{}.png", difficulty.as_str())),
            size: difficulty.preset().radius * 2,
        }
    }

    fn sound_for(&self, cue: SoundCue) -> AudioHandle {
        AudioHandle {
            path: self
                .base_dir
                .join("audio")
                .join(format!("{}.wav", cue.as_str())),
            gain: cue.base_volume() * self.effective_volume(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TargetId;

    #[test]
    fn test_sprite_paths() {
        let assets = StaticAssets::new("static/aim_game");
        let sprite = assets.sprite_for(Difficulty::Hard);
        assert_eq!(sprite.path, PathBuf::from("static/aim_game/img/target_hard.png"));
        assert_eq!(sprite.size, 32);
    }

    #[test]
    fn test_sound_gain() {
        let mut assets = StaticAssets::new("static");
        assets.set_master_volume(1.0);
        let hit = assets.sound_for(SoundCue::Hit);
        assert_eq!(hit.path, PathBuf::from("static/audio/hit.wav"));
        assert!((hit.gain - 0.45).abs() < 1e-6);

        assets.set_muted(true);
        assert_eq!(assets.sound_for(SoundCue::Finish).gain, 0.0);
    }

    #[test]
    fn test_cue_mapping() {
        let id = TargetId(1);
        assert_eq!(SoundCue::for_event(&GameEvent::Spawned { id }), None);
        assert_eq!(
            SoundCue::for_event(&GameEvent::Critical {
                id,
                ttk_ms: 1.0,
                points: 200
            }),
            Some(SoundCue::Critical)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::Missed { id }),
            Some(SoundCue::Miss)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::Finished),
            Some(SoundCue::Finish)
        );
    }
}

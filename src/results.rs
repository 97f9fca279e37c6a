//! Finished-run snapshots and the repository they are saved to
//!
//! The simulation core depends only on [`ResultStore`]; concrete storage
//! lives in `persistence`.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::presets::Difficulty;

/// Identifier assigned by the store on save
pub type ResultId = u64;

/// Immutable summary of one finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResultSnapshot {
    pub score: u32,
    pub kills: u32,
    /// Hit percentage, 0-100
    pub accuracy: f64,
    /// Average time to kill (ms)
    #[serde(rename = "avg_ttk")]
    pub avg_ttk_ms: f64,
    pub max_combo: u32,
    pub misses: u32,
    pub difficulty: Difficulty,
    /// Unix timestamp (ms) when the run ended
    pub played_at_ms: u64,
}

/// A snapshot as held by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: ResultId,
    pub result: GameResultSnapshot,
}

/// Narrow repository over finished results
pub trait ResultStore {
    /// Persist a snapshot, returning its new id
    fn save(&mut self, result: &GameResultSnapshot) -> Result<ResultId, PersistenceError>;

    /// Up to `limit` results, most recent first
    fn list_recent(&self, limit: usize) -> Result<Vec<GameResultSnapshot>, PersistenceError>;
}

impl<S: ResultStore + ?Sized> ResultStore for &mut S {
    fn save(&mut self, result: &GameResultSnapshot) -> Result<ResultId, PersistenceError> {
        (**self).save(result)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<GameResultSnapshot>, PersistenceError> {
        (**self).list_recent(limit)
    }
}

impl<S: ResultStore + ?Sized> ResultStore for Box<S> {
    fn save(&mut self, result: &GameResultSnapshot) -> Result<ResultId, PersistenceError> {
        (**self).save(result)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<GameResultSnapshot>, PersistenceError> {
        (**self).list_recent(limit)
    }
}

/// Newest first: by `played_at`, then by id
pub fn recent_first(entries: &[StoredResult], limit: usize) -> Vec<GameResultSnapshot> {
    let mut sorted: Vec<&StoredResult> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        b.result
            .played_at_ms
            .cmp(&a.result.played_at_ms)
            .then(b.id.cmp(&a.id))
    });
    sorted
        .into_iter()
        .take(limit)
        .map(|e| e.result.clone())
        .collect()
}

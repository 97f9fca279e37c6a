//! Result store implementations
//!
//! - `MemoryStore`: in-process, for tests and the headless demo
//! - `JsonFileStore`: versioned JSON file, saved tmp → rename so a crash
//!   mid-write never truncates the existing file

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::results::{GameResultSnapshot, ResultId, ResultStore, StoredResult, recent_first};

/// In-memory result store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<StoredResult>,
    next_id: ResultId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ResultId) -> Option<&GameResultSnapshot> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.result)
    }
}

impl ResultStore for MemoryStore {
    fn save(&mut self, result: &GameResultSnapshot) -> Result<ResultId, PersistenceError> {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(StoredResult {
            id,
            result: result.clone(),
        });
        Ok(id)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<GameResultSnapshot>, PersistenceError> {
        Ok(recent_first(&self.entries, limit))
    }
}

/// On-disk envelope
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    next_id: ResultId,
    results: Vec<StoredResult>,
}

impl Envelope {
    const VERSION: u32 = 1;
}

/// JSON-file-backed result store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    envelope: Envelope,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let envelope = if path.exists() {
            let json = fs::read_to_string(&path)?;
            let envelope: Envelope = serde_json::from_str(&json)?;
            if envelope.version != Envelope::VERSION {
                return Err(PersistenceError::Unavailable(format!(
                    "unsupported results file version {}",
                    envelope.version
                )));
            }
            log::info!(
                "Loaded {} results from {}",
                envelope.results.len(),
                path.display()
            );
            envelope
        } else {
            log::info!("No results file at {}, starting fresh", path.display());
            Envelope {
                version: Envelope::VERSION,
                next_id: 0,
                results: Vec::new(),
            }
        };
        Ok(Self { path, envelope })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.envelope)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ResultStore for JsonFileStore {
    fn save(&mut self, result: &GameResultSnapshot) -> Result<ResultId, PersistenceError> {
        let id = self.envelope.next_id + 1;
        self.envelope.results.push(StoredResult {
            id,
            result: result.clone(),
        });
        self.envelope.next_id = id;
        if let Err(e) = self.flush() {
            // Keep memory consistent with disk
            self.envelope.results.pop();
            self.envelope.next_id = id - 1;
            return Err(e);
        }
        log::info!("Result {} saved ({} total)", id, self.envelope.results.len());
        Ok(id)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<GameResultSnapshot>, PersistenceError> {
        Ok(recent_first(&self.envelope.results, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Difficulty;

    fn snapshot(score: u32, played_at_ms: u64) -> GameResultSnapshot {
        GameResultSnapshot {
            score,
            kills: 9,
            accuracy: 60.0,
            avg_ttk_ms: 520.0,
            max_combo: 6,
            misses: 3,
            difficulty: Difficulty::Hard,
            played_at_ms,
        }
    }

    #[test]
    fn test_memory_store_ids_and_order() {
        let mut store = MemoryStore::new();
        assert_eq!(store.save(&snapshot(1, 100)).unwrap(), 1);
        assert_eq!(store.save(&snapshot(2, 300)).unwrap(), 2);
        assert_eq!(store.save(&snapshot(3, 200)).unwrap(), 3);
        let recent = store.list_recent(10).unwrap();
        let scores: Vec<u32> = recent.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![2, 3, 1]);
        assert_eq!(store.list_recent(1).unwrap().len(), 1);
        assert_eq!(store.get(2).unwrap().score, 2);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.list_recent(10).unwrap().is_empty());
        store.save(&snapshot(900, 1)).unwrap();
        let id = store.save(&snapshot(1200, 2)).unwrap();
        assert_eq!(id, 2);

        let reopened = JsonFileStore::open(&path).unwrap();
        let recent = reopened.list_recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].score, 1200);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_continues_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        JsonFileStore::open(&path).unwrap().save(&snapshot(1, 1)).unwrap();
        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.save(&snapshot(2, 2)).unwrap(), 2);
    }

    #[test]
    fn test_failed_flush_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let path = blocker.join("results.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(
            store.save(&snapshot(900, 1)),
            Err(PersistenceError::Io(_))
        ));
        assert!(store.list_recent(10).unwrap().is_empty());

        fs::remove_file(&blocker).unwrap();
        assert_eq!(store.save(&snapshot(1200, 2)).unwrap(), 1);
        let recent = store.list_recent(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].score, 1200);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(PersistenceError::Serde(_))
        ));
    }
}

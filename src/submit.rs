//! Result submission
//!
//! Re-checks metric ranges at the boundary, then makes exactly one `save`
//! call. Store failures are passed through without retry.

use crate::error::{FieldErrors, SubmitError};
use crate::results::{GameResultSnapshot, ResultId, ResultStore};

pub const ACCURACY_RANGE_MESSAGE: &str = "Accuracy must be between 0 and 100.";
pub const AVG_TTK_MESSAGE: &str = "Average time to kill must be non-negative.";

/// Range checks shared by the submitter and the wire decoder
pub fn validate(snapshot: &GameResultSnapshot) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    validate_accuracy(snapshot.accuracy, &mut errors);
    validate_avg_ttk(snapshot.avg_ttk_ms, &mut errors);
    errors.into_result()
}

pub(crate) fn validate_accuracy(accuracy: f64, errors: &mut FieldErrors) {
    // NaN fails the range check too
    if !(0.0..=100.0).contains(&accuracy) {
        errors.add("accuracy", ACCURACY_RANGE_MESSAGE);
    }
}

pub(crate) fn validate_avg_ttk(avg_ttk_ms: f64, errors: &mut FieldErrors) {
    if avg_ttk_ms.is_nan() || avg_ttk_ms < 0.0 {
        errors.add("avg_ttk", AVG_TTK_MESSAGE);
    }
}

/// Validates and forwards finished runs to a store
#[derive(Debug)]
pub struct ResultSubmitter<S: ResultStore> {
    store: S,
}

impl<S: ResultStore> ResultSubmitter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn submit(&mut self, snapshot: &GameResultSnapshot) -> Result<ResultId, SubmitError> {
        if let Err(errors) = validate(snapshot) {
            log::warn!("Rejected result: {errors}");
            return Err(SubmitError::Validation(errors));
        }
        let id = self.store.save(snapshot)?;
        log::info!(
            "Submitted result {id}: {} pts on {}",
            snapshot.score,
            snapshot.difficulty
        );
        Ok(id)
    }

    /// Up to `limit` stored results, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<GameResultSnapshot>, SubmitError> {
        Ok(self.store.list_recent(limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::persistence::MemoryStore;
    use crate::presets::Difficulty;

    /// Counts calls and optionally fails
    #[derive(Default)]
    struct CountingStore {
        saves: usize,
        fail: bool,
    }

    impl ResultStore for CountingStore {
        fn save(&mut self, _result: &GameResultSnapshot) -> Result<ResultId, PersistenceError> {
            self.saves += 1;
            if self.fail {
                Err(PersistenceError::Unavailable("database offline".to_string()))
            } else {
                Ok(self.saves as ResultId)
            }
        }

        fn list_recent(&self, _limit: usize) -> Result<Vec<GameResultSnapshot>, PersistenceError> {
            Ok(Vec::new())
        }
    }

    fn snapshot() -> GameResultSnapshot {
        GameResultSnapshot {
            score: 1200,
            kills: 12,
            accuracy: 75.0,
            avg_ttk_ms: 450.5,
            max_combo: 8,
            misses: 4,
            difficulty: Difficulty::Normal,
            played_at_ms: 0,
        }
    }

    #[test]
    fn test_valid_result_is_saved() {
        let mut submitter = ResultSubmitter::new(MemoryStore::new());
        let id = submitter.submit(&snapshot()).unwrap();
        assert_eq!(id, 1);
        assert_eq!(submitter.recent(10).unwrap(), vec![snapshot()]);
    }

    #[test]
    fn test_accuracy_out_of_range_never_saves() {
        let mut submitter = ResultSubmitter::new(CountingStore::default());
        let bad = GameResultSnapshot {
            accuracy: 150.0,
            ..snapshot()
        };
        match submitter.submit(&bad) {
            Err(SubmitError::Validation(errors)) => {
                assert!(errors.contains("accuracy"));
                assert_eq!(errors.messages("accuracy"), [ACCURACY_RANGE_MESSAGE]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(submitter.store().saves, 0);
    }

    #[test]
    fn test_negative_ttk_and_nan() {
        let bad = GameResultSnapshot {
            avg_ttk_ms: -1.0,
            accuracy: f64::NAN,
            ..snapshot()
        };
        let errors = validate(&bad).unwrap_err();
        assert!(errors.contains("avg_ttk"));
        assert!(errors.contains("accuracy"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        for accuracy in [0.0, 100.0] {
            let ok = GameResultSnapshot {
                accuracy,
                avg_ttk_ms: 0.0,
                ..snapshot()
            };
            assert!(validate(&ok).is_ok());
        }
    }

    #[test]
    fn test_persistence_failure_propagates_once() {
        let mut submitter = ResultSubmitter::new(CountingStore {
            fail: true,
            ..Default::default()
        });
        assert!(matches!(
            submitter.submit(&snapshot()),
            Err(SubmitError::Persistence(PersistenceError::Unavailable(_)))
        ));
        assert_eq!(submitter.store().saves, 1);
    }
}

//! Error taxonomy for the simulation and the result boundary

use std::collections::BTreeMap;

use thiserror::Error;

use crate::sim::TargetId;

/// Errors raised by the session simulation and preset lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("unknown difficulty `{0}` (expected easy, normal or hard)")]
    UnknownDifficulty(String),
    /// Stale hit on a target that already expired, was hit, or never existed
    #[error("target {0} is not live")]
    UnknownTarget(TargetId),
    /// The loop was driven out of state order
    #[error("session is not running")]
    SessionNotRunning,
    #[error("session was already started")]
    AlreadyStarted,
}

/// Failures of the external result store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("result store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("result store data is invalid: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("result store unavailable: {0}")]
    Unavailable(String),
}

/// Per-field validation messages, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// Ok if nothing was recorded
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors from submitting a finished run
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid result: {0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

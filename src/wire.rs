//! Result wire format
//!
//! Transport-agnostic request/response handling for the results endpoints.
//! Submissions arrive either as JSON or as a form-encoded body with fixed
//! field names (`score`, `kills`, `accuracy`, `avg_ttk`, `max_combo`,
//! `misses`, `difficulty`). Responses are a status code plus a JSON body.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::consts::RECENT_RESULTS_LIMIT;
use crate::error::{FieldErrors, SubmitError};
use crate::presets::Difficulty;
use crate::results::{GameResultSnapshot, ResultStore};
use crate::submit::{self, ResultSubmitter};

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_SERVER_ERROR: u16 = 500;

/// Key for errors not tied to a single field
pub const NON_FIELD_ERRORS: &str = "__all__";

const REQUIRED: &str = "This field is required.";
const NOT_A_WHOLE_NUMBER: &str = "Enter a whole number.";
const NOT_A_NUMBER: &str = "Enter a number.";
const NEGATIVE_COUNT: &str = "Ensure this value is greater than or equal to 0.";
const TOO_LARGE: &str = "Ensure this value is less than or equal to 2147483647.";
const INVALID_JSON: &str = "Invalid JSON payload.";

/// Largest count the store accepts
const MAX_COUNT: u64 = 2_147_483_647;

/// A decoded, validated submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPayload {
    pub score: u32,
    pub kills: u32,
    pub accuracy: f64,
    pub avg_ttk: f64,
    pub max_combo: u32,
    pub misses: u32,
    pub difficulty: Difficulty,
}

impl ResultPayload {
    pub fn into_snapshot(self, played_at_ms: u64) -> GameResultSnapshot {
        GameResultSnapshot {
            score: self.score,
            kills: self.kills,
            accuracy: self.accuracy,
            avg_ttk_ms: self.avg_ttk,
            max_combo: self.max_combo,
            misses: self.misses,
            difficulty: self.difficulty,
            played_at_ms,
        }
    }
}

/// Why a request body was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Body could not be parsed at all
    Malformed,
    /// Parsed, but fields failed validation
    Invalid(FieldErrors),
}

/// Status + JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: u16,
    pub body: Value,
}

impl WireResponse {
    fn errors(status: u16, errors: &FieldErrors) -> Self {
        Self {
            status,
            body: json!({ "errors": errors.as_map() }),
        }
    }

    fn non_field_error(status: u16, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(NON_FIELD_ERRORS, message);
        Self::errors(status, &errors)
    }
}

/// One row of the recent-results feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEntry {
    pub score: u32,
    pub kills: u32,
    pub accuracy: f64,
    pub avg_ttk: f64,
    pub max_combo: u32,
    pub misses: u32,
    /// Display label (`Easy`, `Normal`, `Hard`)
    pub difficulty: &'static str,
    /// ISO-8601
    pub played_at: String,
}

impl From<&GameResultSnapshot> for RecentEntry {
    fn from(r: &GameResultSnapshot) -> Self {
        Self {
            score: r.score,
            kills: r.kills,
            accuracy: r.accuracy,
            avg_ttk: r.avg_ttk_ms,
            max_combo: r.max_combo,
            misses: r.misses,
            difficulty: r.difficulty.label(),
            played_at: crate::format_iso8601(r.played_at_ms),
        }
    }
}

/// Decode and validate a submission body
pub fn decode_submission(content_type: &str, body: &[u8]) -> Result<ResultPayload, DecodeError> {
    let fields = if content_type.trim_start().starts_with("application/json") {
        parse_json_fields(body)?
    } else {
        parse_form_fields(body)?
    };
    validate_fields(&fields).map_err(DecodeError::Invalid)
}

/// Handle a result submission
pub fn handle_submit<S: ResultStore>(
    submitter: &mut ResultSubmitter<S>,
    content_type: &str,
    body: &[u8],
    played_at_ms: u64,
) -> WireResponse {
    let payload = match decode_submission(content_type, body) {
        Ok(payload) => payload,
        Err(DecodeError::Malformed) => {
            log::warn!("Rejected submission: malformed JSON");
            return WireResponse::non_field_error(STATUS_BAD_REQUEST, INVALID_JSON);
        }
        Err(DecodeError::Invalid(errors)) => {
            log::warn!("Rejected submission: {errors}");
            return WireResponse::errors(STATUS_BAD_REQUEST, &errors);
        }
    };

    match submitter.submit(&payload.into_snapshot(played_at_ms)) {
        Ok(id) => WireResponse {
            status: STATUS_CREATED,
            body: json!({ "id": id, "message": "Result saved" }),
        },
        Err(SubmitError::Validation(errors)) => WireResponse::errors(STATUS_BAD_REQUEST, &errors),
        Err(SubmitError::Persistence(e)) => {
            log::error!("Could not save result: {e}");
            WireResponse::non_field_error(STATUS_SERVER_ERROR, e.to_string())
        }
    }
}

/// Handle a recent-results read (newest first, capped)
pub fn handle_recent<S: ResultStore>(store: &S) -> WireResponse {
    match store.list_recent(RECENT_RESULTS_LIMIT) {
        Ok(results) => {
            let results: Vec<RecentEntry> = results.iter().map(RecentEntry::from).collect();
            WireResponse {
                status: STATUS_OK,
                body: json!({ "results": results }),
            }
        }
        Err(e) => {
            log::error!("Could not list results: {e}");
            WireResponse::non_field_error(STATUS_SERVER_ERROR, e.to_string())
        }
    }
}

type RawFields = BTreeMap<String, Value>;

fn parse_json_fields(body: &[u8]) -> Result<RawFields, DecodeError> {
    let text = std::str::from_utf8(body).map_err(|_| DecodeError::Malformed)?;
    let text = if text.trim().is_empty() { "{}" } else { text };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        _ => Err(DecodeError::Malformed),
    }
}

/// `application/x-www-form-urlencoded`; the last value of a repeated key wins
fn parse_form_fields(body: &[u8]) -> Result<RawFields, DecodeError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(body).map_err(|_| DecodeError::Malformed)?;
    Ok(pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect())
}

/// Missing, null and blank values all count as absent
fn present<'a>(fields: &'a RawFields, name: &str) -> Option<&'a Value> {
    match fields.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn parse_count(fields: &RawFields, name: &str, errors: &mut FieldErrors) -> Option<u32> {
    let Some(value) = present(fields, name) else {
        errors.add(name, REQUIRED);
        return None;
    };
    let parsed: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            // Integral forms only; a fraction made of zeros (`900.`, `900.00`) is dropped
            let s = match s.split_once('.') {
                Some((whole, frac)) if frac.bytes().all(|b| b == b'0') => whole,
                _ => s,
            };
            s.parse::<i64>().ok().map(|v| v as f64)
        }
        _ => None,
    };
    match parsed {
        Some(v) if v.fract() != 0.0 || !v.is_finite() => {
            errors.add(name, NOT_A_WHOLE_NUMBER);
            None
        }
        Some(v) if v < 0.0 => {
            errors.add(name, NEGATIVE_COUNT);
            None
        }
        Some(v) if v > MAX_COUNT as f64 => {
            errors.add(name, TOO_LARGE);
            None
        }
        Some(v) => Some(v as u32),
        None => {
            errors.add(name, NOT_A_WHOLE_NUMBER);
            None
        }
    }
}

fn parse_float(fields: &RawFields, name: &str, errors: &mut FieldErrors) -> Option<f64> {
    let Some(value) = present(fields, name) else {
        errors.add(name, REQUIRED);
        return None;
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            errors.add(name, NOT_A_NUMBER);
            None
        }
    }
}

fn parse_difficulty(fields: &RawFields, errors: &mut FieldErrors) -> Option<Difficulty> {
    let Some(value) = present(fields, "difficulty") else {
        errors.add("difficulty", REQUIRED);
        return None;
    };
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    match raw.parse::<Difficulty>() {
        Ok(d) => Some(d),
        Err(_) => {
            errors.add(
                "difficulty",
                format!("Select a valid choice. {raw} is not one of the available choices."),
            );
            None
        }
    }
}

fn validate_fields(fields: &RawFields) -> Result<ResultPayload, FieldErrors> {
    let mut errors = FieldErrors::new();

    let score = parse_count(fields, "score", &mut errors);
    let kills = parse_count(fields, "kills", &mut errors);
    let accuracy = parse_float(fields, "accuracy", &mut errors);
    let avg_ttk = parse_float(fields, "avg_ttk", &mut errors);
    let max_combo = parse_count(fields, "max_combo", &mut errors);
    let misses = parse_count(fields, "misses", &mut errors);
    let difficulty = parse_difficulty(fields, &mut errors);

    if let Some(accuracy) = accuracy {
        submit::validate_accuracy(accuracy, &mut errors);
    }
    if let Some(avg_ttk) = avg_ttk {
        submit::validate_avg_ttk(avg_ttk, &mut errors);
    }

    match (score, kills, accuracy, avg_ttk, max_combo, misses, difficulty) {
        (
            Some(score),
            Some(kills),
            Some(accuracy),
            Some(avg_ttk),
            Some(max_combo),
            Some(misses),
            Some(difficulty),
        ) if errors.is_empty() => Ok(ResultPayload {
            score,
            kills,
            accuracy,
            avg_ttk,
            max_combo,
            misses,
            difficulty,
        }),
        _ => Err(errors),
    }
}

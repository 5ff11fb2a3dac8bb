//! Locating the win probability inside a model-serving response.
//!
//! The canonical response is `{"predictions": [0.71]}`, but serving wrappers
//! differ. Known keys are checked first (directly, or one level inside a list
//! or record); failing that, the first float leaf in [0, 1] anywhere in the
//! document is used. A document with neither is an extraction error.

use serde_json::Value;

use crate::error::{truncate_diagnostic, PredictionError};

/// Top-level keys that may carry the probability, in priority order.
pub const PROBABILITY_KEYS: [&str; 9] = [
    "predictions",
    "prediction",
    "probability",
    "win_probability",
    "probabilities",
    "outputs",
    "output",
    "result",
    "score",
];

pub fn extract_probability(raw: &Value) -> Result<f64, PredictionError> {
    if let Some(p) = from_known_keys(raw) {
        return Ok(p);
    }
    if let Some(p) = first_probability_leaf(raw) {
        return Ok(p);
    }
    Err(PredictionError::Extraction {
        payload: truncate_diagnostic(&raw.to_string()),
    })
}

fn as_probability(v: &Value) -> Option<f64> {
    v.as_f64().filter(|p| (0.0..=1.0).contains(p))
}

fn from_known_keys(raw: &Value) -> Option<f64> {
    match raw {
        Value::Object(map) => PROBABILITY_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(unwrap_wrapper),
        // Some endpoints answer with a bare list
        Value::Array(_) => unwrap_wrapper(raw),
        _ => None,
    }
}

/// A value found under a known key: a number, or a number one level down.
fn unwrap_wrapper(v: &Value) -> Option<f64> {
    match v {
        Value::Number(_) => as_probability(v),
        Value::Array(items) => items.first().and_then(|first| match first {
            Value::Number(_) => as_probability(first),
            Value::Array(inner) => inner.first().and_then(as_probability),
            Value::Object(map) => keyed_number(map),
            _ => None,
        }),
        Value::Object(map) => keyed_number(map),
        _ => None,
    }
}

fn keyed_number(map: &serde_json::Map<String, Value>) -> Option<f64> {
    PROBABILITY_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .find_map(as_probability)
}

/// Depth-first scan for the first float (not integer) leaf in [0, 1].
fn first_probability_leaf(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) if n.is_f64() => as_probability(v),
        Value::Array(items) => items.iter().find_map(first_probability_leaf),
        Value::Object(map) => map.values().find_map(first_probability_leaf),
        _ => None,
    }
}

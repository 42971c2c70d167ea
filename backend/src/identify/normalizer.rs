//! Recovers a JSON payload from free-form model output.
//!
//! The model is told to answer with bare JSON but often wraps it in markdown
//! fences or prefixes it with prose. Recovery runs in two passes:
//! - clean the text (strip fences, trim, cut out the outermost `{...}` span
//!   when the text does not already start with `{`) and decode it;
//! - on any failure, cut the `{...}` span straight out of the raw text and
//!   decode that instead.
//!
//! A payload only counts as decoded once its required fields are present.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ScanError, ScanResult};

lazy_static! {
    /// Fence markers, optionally tagged `json`, plus trailing whitespace
    static ref CODE_FENCE: Regex = Regex::new(r"```(?:json)?\s*").unwrap();

    /// Greedy span from the first `{` to the last `}`
    static ref JSON_OBJECT: Regex = Regex::new(r"\{[\s\S]*\}").unwrap();
}

/// A structure the model is asked to produce.
pub trait ModelPayload: DeserializeOwned {
    const KIND: &'static str;

    /// Rejects objects whose required fields are absent or blank.
    fn check_required(object: &Map<String, Value>) -> ScanResult<()>;
}

/// Strips every code fence marker, including any that sit inside JSON string
/// values, so a description quoting a fence loses the backticks.
pub fn clean_json_response(raw: &str) -> String {
    let stripped = CODE_FENCE.replace_all(raw, "");
    let trimmed = stripped.trim();
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    extract_json_object(trimmed).unwrap_or(trimmed).to_string()
}

pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

pub fn normalize<T: ModelPayload>(raw: &str) -> ScanResult<T> {
    let cleaned = clean_json_response(raw);
    let primary = match decode::<T>(&cleaned) {
        Ok(payload) => return Ok(payload),
        Err(e) => e,
    };

    warn!(
        "Could not decode cleaned {} response ({}), retrying on raw text",
        T::KIND,
        primary
    );
    debug!("Cleaned {} response: {}", T::KIND, cleaned);

    match extract_json_object(raw) {
        Some(span) => decode::<T>(span).inspect_err(|e| {
            warn!("Fallback decoding of {} response failed: {}", T::KIND, e);
        }),
        None => Err(primary),
    }
}

fn decode<T: ModelPayload>(text: &str) -> ScanResult<T> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ScanError::Parse(format!("invalid JSON: {}", e)))?;

    match value.as_object() {
        Some(object) => T::check_required(object)?,
        None => {
            return Err(ScanError::Parse(
                "top-level JSON value is not an object".to_string(),
            ));
        }
    }

    serde_json::from_value(value)
        .map_err(|e| ScanError::Parse(format!("unexpected {} shape: {}", T::KIND, e)))
}

/// Fails with a validation error unless `key` holds a non-blank string.
pub fn require_text(object: &Map<String, Value>, key: &str) -> ScanResult<()> {
    let present = object
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|text| !text.trim().is_empty());

    if present {
        Ok(())
    } else {
        Err(ScanError::Validation(format!(
            "field `{}` is missing or empty",
            key
        )))
    }
}

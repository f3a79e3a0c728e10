//! Response normalization: turns whatever shape the backend answered with into
//! one predictable model.
//!
//! The backend is inconsistent: some endpoints wrap results in a
//! `{"status": "success", "data": ...}` envelope, others return a bare array or
//! object, and failures may come back as `{"status": "error", "message": ...}`.
//! Everything here is pure and total: any JSON input yields a value, never an
//! error. Callers treat an empty result as "nothing to show".

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Ordered items extracted from a list-shaped response. Never absent: an
/// unusable payload becomes an empty list.
pub type NormalizedList<T> = Vec<T>;

const SUCCESS: &str = "success";

/// Extracts the sequence carried by `payload`.
///
/// - `{"status": "success", "data": [..]}` → the items of `data`
///   (`null` data → empty, any other data → a single item)
/// - a bare array → its items
/// - anything else → empty
pub fn normalize_list(payload: Value) -> NormalizedList<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) if is_success(map.get("status")) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other],
        },
        _ => Vec::new(),
    }
}

/// Extracts the single entity carried by `payload`.
///
/// - `{"status": "success", "data": X}` → `X` (unless `X` is null)
/// - a bare array → returned unchanged
/// - a non-empty object with no `status` field → the object itself
/// - anything else (null, `{}`, error envelopes, scalars) → `None`
pub fn normalize_entity(payload: Value) -> Option<Value> {
    match payload {
        Value::Array(_) => Some(payload),
        Value::Object(mut map) => {
            if map.contains_key("status") {
                if is_success(map.get("status")) {
                    map.remove("data").filter(|data| !data.is_null())
                } else {
                    None
                }
            } else if map.is_empty() {
                None
            } else {
                Some(Value::Object(map))
            }
        }
        _ => None,
    }
}

/// Like [`normalize_list`] but deserializes each item, skipping the ones that
/// don't fit `T`.
pub fn normalize_list_as<T: DeserializeOwned>(payload: Value) -> NormalizedList<T> {
    normalize_list(payload)
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping list item that does not match expected shape: {e}");
                None
            }
        })
        .collect()
}

/// Like [`normalize_entity`] but deserializes the entity into `T`.
pub fn normalize_entity_as<T: DeserializeOwned>(payload: Value) -> Option<T> {
    normalize_entity(payload).and_then(|entity| serde_json::from_value(entity).ok())
}

/// The human-readable message of a non-success envelope
/// (`{"status": "error", "message": "..."}`), if there is one.
pub fn envelope_message(payload: &Value) -> Option<&str> {
    let map = payload.as_object()?;
    if is_success(map.get("status")) {
        return None;
    }
    map.get("message")
        .or_else(|| map.get("detail"))
        .and_then(Value::as_str)
}

fn is_success(status: Option<&Value>) -> bool {
    matches!(status, Some(Value::String(s)) if s == SUCCESS)
}

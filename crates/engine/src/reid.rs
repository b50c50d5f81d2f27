//! Identity rewriter.
//!
//! Whenever content is duplicated (import, copy-via-drag, duplicate-on-
//! drop), every id in the copied graph must be regenerated — a stale child
//! id colliding with an existing node elsewhere in the document is exactly
//! the corruption this prevents.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Assign a fresh unique id to every object in the graph carrying a string
/// `id` field, recursing into every property. Non-id values pass through
/// unchanged.
pub fn re_id_value(value: &mut Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                re_id_value(item);
            }
        }
        Value::Object(map) => {
            if let Some(id) = map.get_mut("id") {
                if id.is_string() {
                    *id = Value::String(Uuid::new_v4().to_string());
                }
            }
            for (_, child) in map.iter_mut() {
                re_id_value(child);
            }
        }
        _ => {}
    }
}

/// Deep-clone `value` with every id in the graph regenerated.
///
/// Round-trips through the JSON representation so nested heterogeneous
/// content (a drawer item wrapping a card wrapping tags) is covered by one
/// walker. Our document types serialize infallibly; should the round trip
/// ever fail the original is returned unchanged and the failure logged.
pub fn deep_re_id<T>(value: &T) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let json = match serde_json::to_value(value) {
        Ok(json) => json,
        Err(error) => {
            tracing::error!(%error, "re-id serialization failed; keeping original ids");
            return value.clone();
        }
    };
    let mut json = json;
    re_id_value(&mut json);
    match serde_json::from_value(json) {
        Ok(fresh) => fresh,
        Err(error) => {
            tracing::error!(%error, "re-id deserialization failed; keeping original ids");
            value.clone()
        }
    }
}

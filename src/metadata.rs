//! Metadata codec: free-form client metadata to/from an opaque text blob.
//!
//! Metadata is client-supplied and schema-free, so it must never be able to
//! break ingestion or retrieval. Both directions are best-effort: any failure
//! degrades to `None` instead of surfacing an error.

use serde_json::{Map, Value};

/// Serialize a metadata map for opaque storage.
///
/// Returns `None` when the map is absent or cannot be serialized.
pub fn encode(metadata: Option<&Map<String, Value>>) -> Option<String> {
    let metadata = metadata?;
    match serde_json::to_string(metadata) {
        Ok(blob) => Some(blob),
        Err(err) => {
            tracing::warn!(error = %err, "dropping unserializable metadata");
            None
        }
    }
}

/// Deserialize a stored metadata blob.
///
/// Returns `None` when the blob is absent, unparseable, or not a JSON object.
pub fn decode(blob: Option<&str>) -> Option<Map<String, Value>> {
    let blob = blob?;
    match serde_json::from_str::<Value>(blob) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            tracing::warn!("stored metadata blob is not a JSON object, dropping");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "stored metadata blob is corrupt, dropping");
            None
        }
    }
}

//! `/api/keys` and `/api/format` routes: load the key universe and the
//! save format the tracker works against.

use serde_json::json;

use crate::routes::util::{error_json, to_json};
use crate::saves::SaveFormat;
use crate::tracker::{with_tracker, with_tracker_mut};

// ── POST /api/keys ─────────────────────────────────────────────────

/// Handle POST /api/keys
/// Body: JSON array of fact keys (the contents of `save_keys.json`).
pub fn handle_keys_post(body: &str) -> String {
    let keys: Vec<String> = match serde_json::from_str(body) {
        Ok(keys) => keys,
        Err(e) => return error_json(&format!("Invalid key list JSON: {e}")),
    };
    with_tracker_mut(|tracker| {
        tracker.load_keys(keys);
        json!({
            "count": tracker.keys().len(),
            "expected": tracker.format().expected_key_count,
        })
        .to_string()
    })
}

// ── GET /api/keys ──────────────────────────────────────────────────

/// Handle GET /api/keys
/// Returns the loaded keys in wire (sorted) order.
pub fn handle_keys_get(_query: &str) -> String {
    with_tracker(|tracker| to_json(&tracker.keys()))
}

// ── POST /api/format ───────────────────────────────────────────────

/// Handle POST /api/format
/// Body: JSON object with any of `expected_key_count`, `game_version`,
/// `encoding_version`. Missing fields take the release defaults.
pub fn handle_format_post(body: &str) -> String {
    let format = match SaveFormat::from_json(body) {
        Ok(format) => format,
        Err(e) => return error_json(&format!("Invalid save format: {e}")),
    };
    let response = to_json(&format);
    with_tracker_mut(|tracker| tracker.set_format(format));
    response
}

//! `/api/save/*` routes: encode, decode and link handling against the
//! tracker's current key universe.
//!
//! Every response is JSON. A save that cannot be used is reported as a
//! `null` field, a corrupted one as `{ "error": ... }`.

use base64::prelude::*;
use serde_json::json;

use crate::link::SaveLink;
use crate::routes::util::{error_json, get_param, parse_form_body, parse_query};
use crate::saves::OpenedSet;
use crate::saves::compat::{is_allowed_to_override, is_valid_packed};
use crate::tracker::with_tracker;

fn token_response(token: Option<String>) -> String {
    with_tracker(|tracker| {
        let fragment = token.as_ref().map(|token| {
            SaveLink::new(tracker.format(), token.as_str()).to_fragment()
        });
        json!({ "token": token, "fragment": fragment }).to_string()
    })
}

// ── POST /api/save/encode ──────────────────────────────────────────

/// Handle POST /api/save/encode
/// Body: JSON array of opened fact keys.
pub fn handle_encode_post(body: &str) -> String {
    let opened: OpenedSet = match serde_json::from_str(body) {
        Ok(opened) => opened,
        Err(e) => return error_json(&format!("Invalid opened facts JSON: {e}")),
    };
    token_response(with_tracker(|tracker| tracker.encode(&opened)))
}

// ── POST /api/save/file ────────────────────────────────────────────

/// Handle POST /api/save/file
/// Body: the game's JSON save file. Revealed facts become the opened set.
pub fn handle_file_post(body: &str) -> String {
    match with_tracker(|tracker| tracker.encode_save_file(body)) {
        Ok(token) => token_response(token),
        Err(e) => error_json(&e.to_string()),
    }
}

// ── GET /api/save/decode ───────────────────────────────────────────

/// Handle GET /api/save/decode?save={token}
/// The token must be percent-encoded (`+` as `%2B`).
pub fn handle_decode_get(query: &str) -> String {
    let params = parse_query(query);
    let token = match get_param(&params, "save") {
        Some(t) if !t.is_empty() => t,
        _ => return error_json("Missing save parameter"),
    };
    match with_tracker(|tracker| tracker.decode(token)) {
        Ok(opened) => json!({ "opened": opened }).to_string(),
        Err(e) => error_json(&e.to_string()),
    }
}

// ── GET /api/save/url ──────────────────────────────────────────────

/// Handle GET /api/save/url?fragment={location.hash}
/// Returns the opened facts the map should show.
pub fn handle_url_get(query: &str) -> String {
    let params = parse_query(query);
    let fragment = get_param(&params, "fragment").unwrap_or("");
    match with_tracker(|tracker| tracker.open_from_url(fragment)) {
        Ok(view) => json!({
            "save_found": view.save_found,
            "count": view.opened.len(),
            "opened": view.opened,
        })
        .to_string(),
        Err(e) => error_json(&e.to_string()),
    }
}

// ── POST /api/save/override ────────────────────────────────────────

/// Handle POST /api/save/override
/// Body: `old={token}&new={token}`.
/// A new save is accepted only if it is well-formed for the current key
/// count and keeps every fact the old one had opened.
pub fn handle_override_post(body: &str) -> String {
    let params = parse_form_body(body);
    let (old, new) = match (get_param(&params, "old"), get_param(&params, "new")) {
        (Some(old), Some(new)) => (old, new),
        _ => return error_json("Missing old or new parameter"),
    };
    let decoded = BASE64_STANDARD
        .decode(old)
        .and_then(|old| Ok((old, BASE64_STANDARD.decode(new)?)));
    let (old, new) = match decoded {
        Ok(pair) => pair,
        Err(e) => return error_json(&format!("malformed save token: {e}")),
    };
    let key_count = with_tracker(|tracker| tracker.format().expected_key_count);
    let valid = is_valid_packed(&new, key_count);
    json!({
        "valid": valid,
        "allowed": valid && is_allowed_to_override(&old, &new),
    })
    .to_string()
}

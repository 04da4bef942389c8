//! Outer Wilds spoiler tracker save core, compiled to WASM.
//!
//! Turns the set of ship log facts a player has opened into a short base64
//! token that fits in a shareable URL, and back. Exports
//! `handle_request(method, path, query, body)` for the Web Worker bridge,
//! routed with `matchit`.

use wasm_bindgen::prelude::*;

pub mod error;
pub mod link;
pub mod logger;
pub mod routes;
pub mod saves;
pub mod tracker;

pub use error::SaveError;
pub use saves::{OpenedSet, SaveCodec, SaveFormat, decode_save, encode_save};

/// Install the tracing subscriber. Safe to call more than once.
#[wasm_bindgen]
pub fn init_logging() {
    logger::init_logging();
}

/// Process an HTTP-like request and return a JSON body.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method`: HTTP method (`GET` or `POST`)
/// * `path`:   URL path (e.g., "/api/save/decode")
/// * `query`:  Query string (e.g., "?save=oQ%3D%3D")
/// * `body`:   Request body. Empty string for GET requests.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/api/keys", "keys").ok();
    router.insert("/api/format", "format").ok();
    router.insert("/api/save/encode", "save_encode").ok();
    router.insert("/api/save/file", "save_file").ok();
    router.insert("/api/save/decode", "save_decode").ok();
    router.insert("/api/save/url", "save_url").ok();
    router.insert("/api/save/override", "save_override").ok();

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("keys", "GET") => routes::keys::handle_keys_get(query),
            ("save_decode", "GET") => routes::save::handle_decode_get(query),
            ("save_url", "GET") => routes::save::handle_url_get(query),

            ("keys", "POST") => routes::keys::handle_keys_post(body),
            ("format", "POST") => routes::keys::handle_format_post(body),
            ("save_encode", "POST") => routes::save::handle_encode_post(body),
            ("save_file", "POST") => routes::save::handle_file_post(body),
            ("save_override", "POST") => routes::save::handle_override_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    routes::util::error_json("404 route not found")
}

fn method_not_allowed() -> String {
    routes::util::error_json("405 method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker::{Tracker, replace_tracker};

    #[test]
    fn returns_404_for_unknown_route() {
        let body = handle_request("GET", "/api/nonexistent", "", "");
        assert!(body.contains("404"));
    }

    #[test]
    fn returns_405_for_wrong_method() {
        let body = handle_request("POST", "/api/save/decode", "", "");
        assert!(body.contains("405"));
        let body = handle_request("GET", "/api/save/encode", "", "");
        assert!(body.contains("405"));
    }

    #[test]
    fn load_keys_then_share_and_open() {
        replace_tracker(Tracker::default());
        handle_request("POST", "/api/format", "", r#"{"expected_key_count": 8}"#);
        handle_request("POST", "/api/keys", "", r#"["h","g","f","e","d","c","b","a"]"#);

        let encoded = handle_request("POST", "/api/save/encode", "", r#"["a","c","h"]"#);
        let encoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(encoded["token"], "oQ==");

        let fragment = encoded["fragment"].as_str().unwrap().replace('=', "%3D").replace('&', "%26");
        let view = handle_request("GET", "/api/save/url", &format!("?fragment={fragment}"), "");
        let view: serde_json::Value = serde_json::from_str(&view).unwrap();
        assert_eq!(view["save_found"], true);
        assert_eq!(view["opened"], serde_json::json!(["a", "c", "h"]));
        replace_tracker(Tracker::default());
    }

    #[test]
    fn oversized_format_is_rejected_and_encode_still_works() {
        replace_tracker(Tracker::default());
        let body = handle_request(
            "POST",
            "/api/format",
            "",
            r#"{"expected_key_count": 18446744073709551615}"#,
        );
        assert!(body.contains("error"));
        tracker::with_tracker(|t| assert_eq!(t.format().expected_key_count, 374));

        let encoded = handle_request("POST", "/api/save/encode", "", "[]");
        let encoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(encoded["token"].as_str().unwrap().len(), saves::ENCODED_SAVE_LEN);
        replace_tracker(Tracker::default());
    }

    #[test]
    fn largest_format_encodes_empty_save() {
        replace_tracker(Tracker::default());
        let body = handle_request("POST", "/api/format", "", r#"{"expected_key_count": 65535}"#);
        assert!(!body.contains("error"));
        let encoded = handle_request("POST", "/api/save/encode", "", "[]");
        let encoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            encoded["token"].as_str().unwrap().len(),
            saves::format::encoded_len(65535)
        );
        replace_tracker(Tracker::default());
    }

    #[test]
    fn reference_scenario_through_library() {
        let keys = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let codec = SaveCodec::new(SaveFormat::with_key_count(8));
        let opened: OpenedSet = ["a", "c", "h"].iter().map(|k| k.to_string()).collect();
        let token = codec.encode(&keys, &opened).unwrap();
        assert_eq!(codec.decode(&keys, &token).unwrap(), Some(opened));
    }
}

//! Shared query/form parsing and JSON response helpers for route handlers.

use serde::Serialize;
use serde_json::json;

/// Parse URL-encoded form body into key-value pairs.
/// Handles `key=value&key2=value2` format.
pub fn parse_form_body(body: &str) -> Vec<(String, String)> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, val) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(val))
        })
        .collect()
}

/// Percent-decode a URL-encoded value. `+` decodes to a space, so save
/// tokens must arrive with `+` escaped as `%2B`.
pub fn percent_decode(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    let mut iter = input.bytes();
    while let Some(b) = iter.next() {
        match b {
            b'%' => {
                let hi = iter.next();
                let lo = iter.next();
                let decoded = match (hi, lo) {
                    (Some(hi), Some(lo)) => core::str::from_utf8(&[hi, lo])
                        .ok()
                        .and_then(|s| u8::from_str_radix(s, 16).ok()),
                    _ => None,
                };
                match decoded {
                    Some(val) => bytes.push(val),
                    None => {
                        bytes.push(b'%');
                        bytes.extend(hi);
                        bytes.extend(lo);
                    }
                }
            }
            b'+' => bytes.push(b' '),
            _ => bytes.push(b),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse a query string into key-value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let q = query.strip_prefix('?').unwrap_or(query);
    parse_form_body(q)
}

/// Helper to get a value by key from a list of key-value pairs.
pub fn get_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Serialize a response body. Serialization of our own types cannot fail
/// short of a bug, which is reported as an error body.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| error_json(&e.to_string()))
}

pub fn error_json(message: &str) -> String {
    json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_form_body_works() {
        let pairs = parse_form_body("old=AAAA&new=AAAB&extra");
        assert_eq!(pairs.len(), 3);
        assert_eq!(get_param(&pairs, "old"), Some("AAAA"));
        assert_eq!(get_param(&pairs, "new"), Some("AAAB"));
        assert_eq!(get_param(&pairs, "extra"), Some(""));
    }

    #[test]
    fn parse_form_body_empty() {
        assert!(parse_form_body("").is_empty());
    }

    #[test]
    fn percent_decode_plus_as_space() {
        assert_eq!(percent_decode("hello+world"), "hello world");
    }

    #[test]
    fn percent_decode_token_chars() {
        assert_eq!(percent_decode("ab%2Bcd%2Fef%3D%3D"), "ab+cd/ef==");
    }

    #[test]
    fn percent_decode_utf8() {
        assert_eq!(percent_decode("%C3%A9"), "é");
    }

    #[test]
    fn percent_decode_keeps_bad_escape() {
        assert_eq!(percent_decode("100%zz"), "100%zz");
        assert_eq!(percent_decode("50%"), "50%");
    }

    #[test]
    fn parse_query_strips_prefix() {
        let pairs = parse_query("?save=oQ%3D%3D");
        assert_eq!(get_param(&pairs, "save"), Some("oQ=="));
    }

    #[test]
    fn error_json_shape() {
        let body: serde_json::Value = serde_json::from_str(&error_json("nope")).unwrap();
        assert_eq!(body["error"], "nope");
    }
}

//! Remote API
//!
//! Client for the home-security backend plus helpers for reading its
//! error bodies.

mod client;
pub mod dto;

pub use client::{Forwarded, HomeSecClient, UpstreamConfig, UpstreamError};

use serde_json::Value;

/// Pick the user-facing message out of an error body.
///
/// Precedence: `error` string, then the `errors` array (each entry's own
/// text, its `msg`, its `error`, or its JSON) joined with `, `, then
/// `message`. `None` when the body carries none of them.
pub fn server_message(body: &Value) -> Option<String> {
    if let Some(error) = body.get("error").and_then(Value::as_str) {
        return Some(error.to_string());
    }

    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        let parts: Vec<String> = errors.iter().map(entry_text).collect();
        return Some(parts.join(", "));
    }

    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn entry_text(entry: &Value) -> String {
    if let Some(s) = entry.as_str() {
        return s.to_string();
    }
    ["msg", "error"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| entry.to_string())
}

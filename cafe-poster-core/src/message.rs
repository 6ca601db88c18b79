//! Best-effort extraction of a human-readable message from an error response.
//!
//! Backends answer failures either with a JSON object carrying an `error` field or
//! with plain text. Extraction never fails; it degrades to a generic status message.

use serde_json::Value;

const MAX_RAW_TEXT: usize = 500;

/// Pick the most useful message out of an error response body.
///
/// Order: JSON `error` (string or object with `message`), JSON `message`,
/// non-JSON raw text (truncated), then `"<status>"`.
pub fn extract_error_message(status: impl std::fmt::Display, body: &str) -> String {
    let fallback = || status.to_string();
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return fallback();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => map
            .get("error")
            .and_then(message_from_value)
            .or_else(|| map.get("message").and_then(message_from_value))
            .unwrap_or_else(fallback),
        Ok(_) => fallback(),
        Err(_) => truncate(trimmed, MAX_RAW_TEXT),
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(inner) => inner
            .get("message")
            .and_then(message_from_value)
            .or_else(|| Some(value.to_string())),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

/// Cut `s` to at most `max` characters, on a char boundary.
pub fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

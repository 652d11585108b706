//! Best-effort extraction of a human-readable detail from an upstream error body.
//!
//! Each upstream documents its error shape differently, so callers pass an
//! ordered list of [`DetailSource`]s. The first source that yields a usable
//! value wins; if none does, the caller-provided fallback message is used.

use serde_json::Value;

/// One place to look for an error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    /// A top-level field of a JSON object body.
    Field(&'static str),
    /// The body itself.
    WholeBody,
}

/// OpenWeatherMap reports errors as `{"cod": "404", "message": "city not found"}`.
pub const OPENWEATHER_SOURCES: &[DetailSource] = &[DetailSource::Field("message")];

/// Baserow reports errors as `{"error": "ERROR_...", "detail": ...}`.
pub const BASEROW_SOURCES: &[DetailSource] = &[
    DetailSource::Field("detail"),
    DetailSource::Field("error"),
    DetailSource::WholeBody,
];

impl DetailSource {
    fn extract(self, body: &Value) -> Option<Value> {
        let candidate = match self {
            DetailSource::Field(name) => body.get(name)?,
            DetailSource::WholeBody => body,
        };
        is_meaningful(candidate).then(|| candidate.clone())
    }
}

fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Try `sources` in order against `body`, returning the first usable detail.
pub fn first_detail(body: Option<&Value>, sources: &[DetailSource]) -> Option<Value> {
    let body = body?;
    sources.iter().find_map(|source| source.extract(body))
}

/// Like [`first_detail`], falling back to `fallback` as a JSON string.
pub fn detail_or(body: Option<&Value>, sources: &[DetailSource], fallback: impl Into<String>) -> Value {
    first_detail(body, sources).unwrap_or_else(|| Value::String(fallback.into()))
}

/// Parse a raw response body, keeping non-JSON text as a JSON string.
pub fn body_to_value(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

//! Lenient lookups into a JSON params object.
//!
//! Missing keys and mistyped values fall back to the supplied default, so a
//! partial params object only overrides what it names.

use serde_json::Value;

/// `params[name]` as `f64` (integers accepted), else `default`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as an owned string, else `default`.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// `params[name]` as a list of strings.
///
/// A single string is treated as a one-element list. Non-string array
/// entries are skipped. Anything else yields `default`.
pub fn param_strings(params: &Value, name: &str, default: &[&str]) -> Vec<String> {
    match params.get(name) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => default.iter().map(|s| (*s).to_owned()).collect(),
    }
}

//! Coercion of raw, loosely-typed field values into numeric amounts.
//!
//! Every aggregator in the crate goes through [`normalize`], so a single
//! policy decides what a malformed amount is worth: zero.

use serde_json::Value;

/// Converts any raw field value into a finite amount.
///
/// Numbers pass through (negative values included). Strings are trimmed and
/// parsed as plain decimals. Anything else, including `null`, empty strings,
/// booleans, containers and non-finite results, becomes `0.0`.
pub fn normalize(value: &Value) -> f64 {
    match value {
        Value::Number(n) => finite_or_zero(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => normalize_str(s),
        _ => 0.0,
    }
}

pub fn normalize_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    trimmed.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

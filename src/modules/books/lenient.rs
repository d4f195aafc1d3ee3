//! Field decoders for request bodies that accept any JSON value.
//!
//! A mistyped field never fails deserialization, so the name and page checks
//! always get to run first.

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Falsy values are `null`, `false`, `0`, `NaN`, and `""`.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Strings pass through; other non-null values keep their JSON text.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(Value::deserialize(deserializer)?))
}

/// Like [`text`], but a falsy value counts as no name at all.
pub fn name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(if truthy(&value) { text_of(value) } else { None })
}

/// Any JSON number, integer or not; other values are dropped.
pub fn number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Some(n),
        _ => None,
    })
}

pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(truthy(&Value::deserialize(deserializer)?))
}

/// Numeric value of a JSON number for comparisons.
pub fn numeric(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

//! Coercion helpers over the loose `serde_json::Value` bag.
//!
//! Every helper takes the section name so failures carry it; numeric
//! helpers accept both JSON numbers and numeric strings (extractors
//! frequently hand over `"+7"` where a number is meant).

use serde_json::{Map, Value};
use statforge_core::BuildError;

/// Short rendering of a value's shape for error messages.
pub(crate) fn kind_of(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(s) => format!("the string '{s}'"),
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "a mapping".to_string(),
    }
}

fn missing(section: &'static str, field: &str) -> BuildError {
    BuildError::MissingField {
        section,
        field: field.to_string(),
    }
}

fn mismatch(section: &'static str, field: &str, expected: &'static str, value: &Value) -> BuildError {
    BuildError::TypeMismatch {
        section,
        field: field.to_string(),
        expected,
        actual: kind_of(value),
    }
}

/// Fetch a field, treating explicit `null` the same as absent.
pub(crate) fn get<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

pub(crate) fn require<'a>(
    section: &'static str,
    map: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Value, BuildError> {
    get(map, field).ok_or_else(|| missing(section, field))
}

pub(crate) fn str_field(
    section: &'static str,
    map: &Map<String, Value>,
    field: &str,
) -> Result<String, BuildError> {
    let value = require(section, map, field)?;
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| mismatch(section, field, "a string", value))
}

pub(crate) fn opt_str_field(
    section: &'static str,
    map: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, BuildError> {
    match get(map, field) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.trim().to_string()))
            .ok_or_else(|| mismatch(section, field, "a string", value)),
    }
}

/// Coerce a number or numeric string (optionally `+`-signed) to `i64`.
pub(crate) fn coerce_i64(
    section: &'static str,
    field: &str,
    value: &Value,
) -> Result<i64, BuildError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 {
                    return Ok(f as i64);
                }
            }
            Err(mismatch(section, field, "an integer", value))
        }
        Value::String(s) => s
            .trim()
            .trim_start_matches('+')
            .parse()
            .map_err(|_| mismatch(section, field, "an integer", value)),
        _ => Err(mismatch(section, field, "an integer", value)),
    }
}

pub(crate) fn i64_field(
    section: &'static str,
    map: &Map<String, Value>,
    field: &str,
) -> Result<i64, BuildError> {
    coerce_i64(section, field, require(section, map, field)?)
}

pub(crate) fn opt_i64_field(
    section: &'static str,
    map: &Map<String, Value>,
    field: &str,
) -> Result<Option<i64>, BuildError> {
    match get(map, field) {
        None => Ok(None),
        Some(value) => coerce_i64(section, field, value).map(Some),
    }
}

pub(crate) fn bool_field(
    section: &'static str,
    map: &Map<String, Value>,
    field: &str,
) -> Result<bool, BuildError> {
    match get(map, field) {
        None => Ok(false),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| mismatch(section, field, "a boolean", value)),
    }
}

pub(crate) fn map_field<'a>(
    section: &'static str,
    map: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Map<String, Value>, BuildError> {
    let value = require(section, map, field)?;
    value
        .as_object()
        .ok_or_else(|| mismatch(section, field, "a mapping", value))
}

pub(crate) fn opt_map_field<'a>(
    section: &'static str,
    map: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a Map<String, Value>>, BuildError> {
    match get(map, field) {
        None => Ok(None),
        Some(value) => value
            .as_object()
            .map(Some)
            .ok_or_else(|| mismatch(section, field, "a mapping", value)),
    }
}

pub(crate) fn array_field<'a>(
    section: &'static str,
    map: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Vec<Value>, BuildError> {
    let value = require(section, map, field)?;
    value
        .as_array()
        .ok_or_else(|| mismatch(section, field, "a list", value))
}

/// A list of strings, defaulting to empty when the field is absent.
pub(crate) fn str_list(
    section: &'static str,
    map: &Map<String, Value>,
    field: &str,
) -> Result<Vec<String>, BuildError> {
    match get(map, field) {
        None => Ok(Vec::new()),
        Some(value) => {
            let items = value
                .as_array()
                .ok_or_else(|| mismatch(section, field, "a list of strings", value))?;
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| s.trim().to_string())
                        .ok_or_else(|| mismatch(section, field, "a list of strings", item))
                })
                .collect()
        }
    }
}

/// Expect each element of a list to be a mapping.
pub(crate) fn as_object<'a>(
    section: &'static str,
    field: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, BuildError> {
    value
        .as_object()
        .ok_or_else(|| mismatch(section, field, "a mapping", value))
}

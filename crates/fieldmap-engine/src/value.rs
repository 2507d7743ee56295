// SPDX-License-Identifier: MIT OR Apache-2.0
//! Default transforms and predicates over source values.
//!
//! A source value is `Option<&Value>`: `None` when the field is absent from
//! the object, `Some(Value::Null)` when it is present but null. Every helper
//! here treats the two the same way.

use serde_json::Value;

/// Renders a source value as the string written to a slot.
///
/// Strings are written verbatim, null and absent values become the empty
/// string, and anything else is rendered as compact JSON.
#[must_use]
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `true` for any present, non-null value.
#[must_use]
pub fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

/// `true` for present values that are not an empty string, array or object.
#[must_use]
pub fn is_non_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// `true` for JSON numbers and for strings that parse as a finite number.
#[must_use]
pub fn is_number(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}

/// `true` for JSON booleans only.
#[must_use]
pub fn is_boolean(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(_)))
}

/// Short name of a value's JSON type, used in diagnostics.
#[must_use]
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Largest float magnitude below which every whole number is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Turns a discriminator value into a group name.
///
/// Strings are used as-is; numbers and booleans use their JSON rendering,
/// except that whole-number floats drop their fraction (`2.0` selects `"2"`).
/// Returns `None` for null, arrays and objects.
pub(crate) fn group_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

//! Emptiness and type-name helpers over `serde_json::Value`.

use serde_json::Value;

/// Whether a value carries no usable content.
///
/// `null` and the empty string are empty; everything else, including `0`,
/// `false`, and empty containers, is not. This is the emptiness notion used
/// by requiredness checks and default-value substitution.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// JSON type name for error reporting.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

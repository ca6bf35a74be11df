use indexmap::IndexMap;
use serde_json::Value;

/// Config keys whose values are structurally composite (header maps, request
/// bodies, field schemas, mock payloads) and are always stored serialized.
pub const STRINGIFIED_KEYS: &[&str] = &["headers", "body", "fields", "mockData"];

/// Scalar config keys coerced to string form regardless of arrival type.
pub const COERCED_KEYS: &[&str] = &["statusCode", "timeout"];

/// Bring a node's config mapping into canonical form.
///
/// A value already supplied as a string is kept as-is; composite values are
/// serialized before storage so every consumer sees one representation.
pub fn normalize_config(config: &mut IndexMap<String, Value>) {
    for (key, value) in config.iter_mut() {
        if STRINGIFIED_KEYS.contains(&key.as_str()) {
            if !value.is_string() {
                *value = Value::String(value.to_string());
            }
        } else if COERCED_KEYS.contains(&key.as_str()) {
            if let Some(text) = coerce_scalar(value) {
                *value = Value::String(text);
            }
        }
    }
}

/// Merge an incoming config mapping onto the existing one key-by-key.
/// New and changed keys override; keys absent from the update survive.
pub fn merge_config(existing: &mut IndexMap<String, Value>, incoming: IndexMap<String, Value>) {
    for (key, value) in incoming {
        existing.insert(key, value);
    }
    normalize_config(existing);
}

fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => None,
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

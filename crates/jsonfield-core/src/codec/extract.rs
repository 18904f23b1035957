use super::CodecError;
use serde_json::Value;

///
/// ScalarEncoding
///
/// Bare scalar form of a native value, as the engine's path extraction
/// yields it. Compound values keep their JSON text so the engine can parse
/// them with `json(..)` before comparing.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarEncoding {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Json(String),
}

/// Encode a native value the way `json_extract` returns it.
///
/// Strings are unquoted text, booleans are 1/0, numbers stay numeric.
#[must_use]
pub fn encode_scalar(value: &Value) -> ScalarEncoding {
    match value {
        Value::Null => ScalarEncoding::Null,
        Value::Bool(b) => ScalarEncoding::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ScalarEncoding::Integer(i),
            // u64 above i64::MAX and floats both extract as REAL
            None => ScalarEncoding::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => ScalarEncoding::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => ScalarEncoding::Json(value.to_string()),
    }
}

/// Decode the text returned by a JSON-text path extraction.
///
/// - `"Alice"` decodes to the string `Alice`, with JSON escapes resolved
/// - `null` decodes to `Value::Null`
/// - numeric and boolean literals decode to numbers and booleans
/// - object and array literals decode structurally and are never unwrapped
pub fn unwrap_extracted(text: &str) -> Result<Value, CodecError> {
    let trimmed = text.trim();

    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return serde_json::from_str::<String>(trimmed)
            .map(Value::String)
            .map_err(|err| CodecError::deserialize(text, err));
    }

    match trimmed {
        "null" => Ok(Value::Null),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => serde_json::from_str(trimmed).map_err(|err| CodecError::deserialize(text, err)),
    }
}

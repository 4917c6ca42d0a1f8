use serde_json::Value;

use super::CanonicalResult;
use crate::xml::TEXT_KEY;

/// Source code is returned as-is apart from surrounding whitespace.
pub fn source_text(raw: &Value) -> CanonicalResult {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        Value::Object(map) => match map.get(TEXT_KEY).and_then(Value::as_str) {
            Some(s) => s.trim().to_string(),
            None => raw.to_string(),
        },
        other => other.to_string(),
    };
    CanonicalResult::Text(text)
}

use serde_json::{Map, Number, Value};

/// Fields never shown to the caller, at any depth.
pub const BLOCKED_FIELDS: [&str; 7] = [
    "links",
    "etag",
    "annex",
    "changed_by",
    "created_by",
    "changed_at",
    "parent_uri",
];

/// Largest integer a JSON consumer can hold exactly (2^53 - 1).
const MAX_EXACT_INTEGER: u64 = 9_007_199_254_740_991;

pub fn is_blocked(key: &str) -> bool {
    BLOCKED_FIELDS.contains(&key)
}

/// Drop blocked fields everywhere in the tree and turn integers that would
/// lose precision into decimal strings. Idempotent.
pub fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut kept = Map::with_capacity(map.len());
            for (key, child) in map {
                if is_blocked(&key) {
                    continue;
                }
                kept.insert(key, redact(child));
            }
            Value::Object(kept)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        Value::Number(n) => normalize_number(n),
        other => other,
    }
}

fn normalize_number(n: Number) -> Value {
    let oversized = if let Some(i) = n.as_i64() {
        i.unsigned_abs() > MAX_EXACT_INTEGER
    } else if let Some(u) = n.as_u64() {
        u > MAX_EXACT_INTEGER
    } else {
        false
    };

    if oversized {
        Value::String(n.to_string())
    } else {
        Value::Number(n)
    }
}

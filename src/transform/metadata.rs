use serde_json::{Map, Value};

use super::path::single_level_path;
use super::{AdtRoot, CanonicalResult};

/// Output key paired with the attribute aliases it is read from.
const ATTRIBUTES: &[(&str, &[&str])] = &[
    ("name", &["adtcore:name", "name"]),
    ("type", &["adtcore:type", "type"]),
    ("description", &["adtcore:description", "description"]),
    ("version", &["adtcore:version", "version"]),
    ("language", &["adtcore:language", "adtcore:masterLanguage"]),
    ("master_system", &["adtcore:masterSystem"]),
    ("responsible", &["adtcore:responsible", "responsible"]),
    ("created_at", &["adtcore:createdAt"]),
];

/// Summarise an object response. Attributes that are absent are omitted.
pub fn object_metadata(raw: &Value) -> CanonicalResult {
    let root = AdtRoot::resolve(raw);
    let mut record = Map::new();

    record.insert(
        "kind".into(),
        Value::String(root.kind().map(|k| k.label()).unwrap_or("unknown").into()),
    );

    for (key, aliases) in ATTRIBUTES {
        if let Some(value) = root.attribute(aliases) {
            record.insert((*key).into(), Value::String(value));
        }
    }

    if let Some(package) = root.package_name() {
        record.insert("package".into(), Value::String(package));
    }
    record.insert("path".into(), Value::String(single_level_path(&root)));

    CanonicalResult::Record(record)
}

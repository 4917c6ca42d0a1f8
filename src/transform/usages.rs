use serde_json::Value;

use super::{as_list, descend, field, field_or_empty, CanonicalResult, ObjectSummary};

const REFERENCED: &[&str] = &[
    "usageReferences:usageReferenceResult",
    "usageReferences:referencedObjects",
    "usageReferences:referencedObject",
];
const ADT_OBJECT: &str = "usageReferences:adtObject";

/// Where-used list from a `usageReferences` response.
///
/// Only nodes flagged `isResult` are real usages; the rest are the package
/// tree the server wraps around them. Nodes carrying no flag are kept.
pub fn where_used(raw: &Value) -> CanonicalResult {
    let rows = as_list(descend(raw, REFERENCED))
        .into_iter()
        .filter(|node| field(node, &["isResult"]).map_or(true, |flag| flag == "true"))
        .filter_map(|node| {
            let object = node.get(ADT_OBJECT).unwrap_or(node);
            let summary = ObjectSummary {
                name: field_or_empty(object, &["adtcore:name", "name"]),
                object_type: field_or_empty(object, &["adtcore:type", "type"]),
                description: field_or_empty(object, &["adtcore:description", "description"]),
                uri: field_or_empty(node, &["uri", "adtcore:uri"]),
            };
            if summary.name.is_empty() {
                return None;
            }

            let mut row = summary.into_value();
            let package = object
                .get("adtcore:packageRef")
                .and_then(|pkg| field(pkg, &["adtcore:name", "name"]));
            if let (Some(package), Some(map)) = (package, row.as_object_mut()) {
                map.insert("package".into(), Value::String(package));
            }
            Some(row)
        })
        .collect();

    CanonicalResult::List(rows)
}

use serde_json::Value;

use super::{as_list, descend, field_or_empty, CanonicalResult, ObjectSummary};

const NODES: &[&str] = &[
    "asx:abap",
    "asx:values",
    "DATA",
    "TREE_CONTENT",
    "SEOADT_REPOSITORY_OBJ_NODE",
];

/// Flatten a `nodestructure` response into `{name, type, description, uri}`
/// rows. Nodes without a name (section headers) are skipped.
pub fn package_contents(raw: &Value) -> CanonicalResult {
    let rows = as_list(descend(raw, NODES))
        .into_iter()
        .map(|node| ObjectSummary {
            name: field_or_empty(node, &["OBJECT_NAME", "ObjectName", "name"]),
            object_type: field_or_empty(node, &["OBJECT_TYPE", "ObjectType", "type"]),
            description: field_or_empty(node, &["DESCRIPTION", "description"]),
            uri: field_or_empty(node, &["OBJECT_URI", "uri"]),
        })
        .filter(|row| !row.name.is_empty())
        .map(ObjectSummary::into_value)
        .collect();

    CanonicalResult::List(rows)
}

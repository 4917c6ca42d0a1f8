use serde_json::Value;

use super::{as_list, descend, field_or_empty, CanonicalResult, ObjectSummary};

/// Marker returned instead of an empty list so a blank search is visible.
pub const NO_RESULTS: &str = "No results found.";

// Direct REST responses use the namespaced attribute; the typed client
// flavour exposes plain keys.
const NAME: &[&str] = &["adtcore:name", "name"];
const TYPE: &[&str] = &["adtcore:type", "type"];
const DESCRIPTION: &[&str] = &["adtcore:description", "description"];
const URI: &[&str] = &["adtcore:uri", "uri"];

/// Treat the user's query as a simple glob: `.*` becomes `*`.
pub fn normalize_query(query: &str) -> String {
    query.trim().replace(".*", "*")
}

/// Flatten search hits into `{name, type, description, uri}` rows.
pub fn search_hits(hits: &[Value]) -> CanonicalResult {
    if hits.is_empty() {
        return CanonicalResult::Text(NO_RESULTS.into());
    }

    let rows = hits
        .iter()
        .map(|hit| {
            ObjectSummary {
                name: field_or_empty(hit, NAME),
                object_type: field_or_empty(hit, TYPE),
                description: field_or_empty(hit, DESCRIPTION),
                uri: field_or_empty(hit, URI),
            }
            .into_value()
        })
        .collect();

    CanonicalResult::List(rows)
}

/// Locate the hit sequence in a quick-search response, then flatten it.
pub fn search_response(raw: &Value) -> CanonicalResult {
    if let Value::Array(hits) = raw {
        return search_hits(hits);
    }

    let hits: Vec<Value> = as_list(descend(
        raw,
        &["adtcore:objectReferences", "adtcore:objectReference"],
    ))
    .into_iter()
    .cloned()
    .collect();

    search_hits(&hits)
}

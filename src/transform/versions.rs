use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{as_list, descend, field, field_or_empty, CanonicalResult, ObjectSummary};
use crate::xml::ATTRIBUTES_KEY;

/// Revision list from an atom feed of source versions.
///
/// Each entry becomes a listing row: `name` is the version id, `type` is
/// `version`, and `description` carries timestamp, author and title.
pub fn version_history(raw: &Value) -> CanonicalResult {
    let rows = as_list(descend(raw, &["atom:feed", "atom:entry"]))
        .into_iter()
        .map(|entry| {
            let id = field_or_empty(entry, &["atom:id", "id"]);
            let title = field_or_empty(entry, &["atom:title", "title"]);
            let author = entry
                .get("atom:author")
                .and_then(|author| field(author, &["atom:name", "name"]))
                .unwrap_or_default();
            let updated = field(entry, &["atom:updated", "updated"])
                .map(|stamp| normalize_timestamp(&stamp))
                .unwrap_or_default();
            let uri = entry
                .get("atom:content")
                .and_then(|content| content.get(ATTRIBUTES_KEY))
                .and_then(|attrs| attrs.get("src"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let description = [updated, author, title]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" | ");

            ObjectSummary {
                name: id,
                object_type: "version".into(),
                description,
                uri,
            }
            .into_value()
        })
        .collect();

    CanonicalResult::List(rows)
}

/// RFC 3339 stamps are shown as UTC; anything else passes through.
fn normalize_timestamp(stamp: &str) -> String {
    match DateTime::parse_from_rfc3339(stamp) {
        Ok(parsed) => parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        Err(_) => stamp.to_string(),
    }
}

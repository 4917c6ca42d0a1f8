//! Shape transformers: raw ADT responses in, tool-specific canonical shapes out.
//!
//! The raw tree never has a guaranteed shape. Every reader here degrades to
//! an empty string or an omitted field instead of failing.

pub mod class_structure;
pub mod metadata;
pub mod package;
pub mod path;
pub mod root;
pub mod search;
pub mod source;
pub mod usages;
pub mod versions;

use serde_json::{Map, Value};

use crate::xml::{ATTRIBUTES_KEY, TEXT_KEY};

pub use class_structure::{class_structure_clean, class_structure_raw};
pub use metadata::object_metadata;
pub use package::package_contents;
pub use path::{ancestor_path, object_path, package_node, PackageNode, FALLBACK_PACKAGE};
pub use root::{AdtRoot, RootKind};
pub use search::{normalize_query, search_hits, search_response};
pub use source::source_text;
pub use usages::where_used;
pub use versions::version_history;

/// Output of a shape transformer, free of server tag names.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalResult {
    Text(String),
    Record(Map<String, Value>),
    List(Vec<Value>),
}

impl From<CanonicalResult> for Value {
    fn from(result: CanonicalResult) -> Self {
        match result {
            CanonicalResult::Text(text) => Value::String(text),
            CanonicalResult::Record(record) => Value::Object(record),
            CanonicalResult::List(items) => Value::Array(items),
        }
    }
}

/// The `{name, type, description, uri}` row shared by every listing tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSummary {
    pub name: String,
    pub object_type: String,
    pub description: String,
    pub uri: String,
}

impl ObjectSummary {
    pub fn into_value(self) -> Value {
        let mut row = Map::new();
        row.insert("name".into(), Value::String(self.name));
        row.insert("type".into(), Value::String(self.object_type));
        if !self.description.is_empty() {
            row.insert("description".into(), Value::String(self.description));
        }
        if !self.uri.is_empty() {
            row.insert("uri".into(), Value::String(self.uri));
        }
        Value::Object(row)
    }
}

/// Read the first non-empty alias from a node, looking at direct children
/// (scalar or `_text`) and then at the node's attribute bag.
pub(crate) fn field(node: &Value, aliases: &[&str]) -> Option<String> {
    let attributes = node.get(ATTRIBUTES_KEY);
    for alias in aliases {
        let found = node
            .get(*alias)
            .and_then(scalar_text)
            .or_else(|| attributes.and_then(|a| a.get(*alias)).and_then(scalar_text));
        if let Some(text) = found.filter(|t| !t.is_empty()) {
            return Some(text);
        }
    }
    None
}

/// Same as [`field`] but missing values become an empty string.
pub(crate) fn field_or_empty(node: &Value, aliases: &[&str]) -> String {
    field(node, aliases).unwrap_or_default()
}

/// A scalar rendered as text. Elements carrying only character data count
/// as scalars.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get(TEXT_KEY).and_then(Value::as_str).map(|s| s.trim().to_string()),
        _ => None,
    }
}

/// View a child that may be absent, single, or repeated as a slice-like list.
pub(crate) fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Follow a chain of child keys.
pub(crate) fn descend<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |node, key| node.get(*key))
}

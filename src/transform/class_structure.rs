//! Class structure listings built from `/objectstructure` responses.
//!
//! The raw variant keeps every element attribute plus its atom links. The
//! clean variant strips the ADT boilerplate fields from every entry, since
//! structures of large classes are mostly links and change stamps.

use serde_json::{Map, Value};

use super::{as_list, AdtRoot, CanonicalResult};
use crate::present::redaction::redact;
use crate::xml::ATTRIBUTES_KEY;

const ELEMENT: &str = "abapsource:objectStructureElement";
const LINK: &str = "atom:link";

pub fn class_structure_raw(raw: &Value) -> CanonicalResult {
    CanonicalResult::Record(build(raw))
}

pub fn class_structure_clean(raw: &Value) -> CanonicalResult {
    match redact(Value::Object(build(raw))) {
        Value::Object(cleaned) => CanonicalResult::Record(cleaned),
        _ => CanonicalResult::Record(Map::new()),
    }
}

#[derive(Default)]
struct Components {
    methods: Vec<Value>,
    attributes: Vec<Value>,
    other: Vec<Value>,
}

impl Components {
    fn push(&mut self, entry: Map<String, Value>) {
        let kind = entry.get("type").and_then(Value::as_str).unwrap_or("");
        // CLAS/OM, INTF/IO: methods. CLAS/OA, INTF/IA: attributes.
        let bucket = if kind.ends_with("/OM") || kind.ends_with("/IO") {
            &mut self.methods
        } else if kind.ends_with("/OA") || kind.ends_with("/IA") {
            &mut self.attributes
        } else {
            &mut self.other
        };
        bucket.push(Value::Object(entry));
    }

    fn collect(&mut self, node: &Value) {
        for child in as_list(node.get(ELEMENT)) {
            self.push(entry(child));
            self.collect(child);
        }
    }
}

fn build(raw: &Value) -> Map<String, Value> {
    let root = raw
        .get(ELEMENT)
        .or_else(|| match AdtRoot::resolve(raw) {
            AdtRoot::Known { node, .. } => Some(node),
            AdtRoot::Unknown => None,
        })
        .unwrap_or(raw);

    let mut record = entry(root);
    let mut components = Components::default();
    components.collect(root);

    for (key, items) in [
        ("methods", components.methods),
        ("attributes", components.attributes),
        ("other_components", components.other),
    ] {
        if !items.is_empty() {
            record.insert(key.into(), Value::Array(items));
        }
    }
    record
}

/// One structure element: its attributes with namespaces dropped and keys
/// in snake_case, plus its links.
fn entry(node: &Value) -> Map<String, Value> {
    let mut out = local_attributes(node);

    let links: Vec<Value> = as_list(node.get(LINK))
        .into_iter()
        .map(|link| Value::Object(local_attributes(link)))
        .filter(|link| link.as_object().is_some_and(|l| !l.is_empty()))
        .collect();
    if !links.is_empty() {
        out.insert("links".into(), Value::Array(links));
    }
    out
}

fn local_attributes(node: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(attributes) = node.get(ATTRIBUTES_KEY).and_then(Value::as_object) {
        for (key, value) in attributes {
            out.entry(local_key(key)).or_insert_with(|| value.clone());
        }
    }
    out
}

/// `adtcore:changedBy` → `changed_by`.
fn local_key(key: &str) -> String {
    let local = key.rsplit(':').next().unwrap_or(key);
    let mut out = String::with_capacity(local.len() + 4);
    for (i, c) in local.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

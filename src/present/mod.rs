//! Final stage of every tool call: any transformer output (or raw response)
//! becomes one bounded, redacted text block.

pub mod projector;
pub mod redaction;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

pub use projector::project_error;

/// Rendered list entries before the remainder is summarised.
pub const MAX_LIST_ENTRIES: usize = 50;

pub const NO_DATA: &str = "No data";
pub const EMPTY_LIST: &str = "Empty list";

const NAME: &[&str] = &["name", "ObjectName"];
const TYPE: &[&str] = &["type", "ObjectType"];
const DESCRIPTION: &[&str] = &["description", "Description"];
const URI: &[&str] = &["uri", "ObjectUri"];

static OPENING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z][\w:.\-]*)(\s[^<>]*)?/?>").expect("valid regex"));
static TAG_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\w:.\-]+\s*=\s*["']"#).expect("valid regex"));
static TAG_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub text: String,
}

/// What a tool call returns across the boundary, success or failure.
///
/// Only the presenter and the error projector build the error form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    content: Vec<TextContent>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

impl ToolOutput {
    fn success(text: String) -> Self {
        Self {
            content: vec![TextContent {
                kind: ContentKind::Text,
                text,
            }],
            is_error: false,
        }
    }

    fn failure(text: String) -> Self {
        Self {
            content: vec![TextContent {
                kind: ContentKind::Text,
                text,
            }],
            is_error: true,
        }
    }

    pub fn content(&self) -> &[TextContent] {
        &self.content
    }

    /// All text blocks joined.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

#[derive(Debug, thiserror::Error)]
enum PresentError {
    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Render a result. Never fails: rendering errors come back as an error
/// output instead.
pub fn present(value: impl Into<Value>) -> ToolOutput {
    match render(value.into()) {
        Ok(text) => ToolOutput::success(text),
        Err(e) => {
            error!(error = %e, "failed to render tool result");
            ToolOutput::failure(e.to_string())
        }
    }
}

fn render(value: Value) -> Result<String, PresentError> {
    match value {
        Value::Null => Ok(NO_DATA.into()),
        Value::String(text) => Ok(render_text(&text)),
        Value::Object(ref map) if map.is_empty() => Ok(NO_DATA.into()),
        other => match redaction::redact(other) {
            Value::Array(items) => Ok(render_list(&items)),
            Value::Object(map) if map.is_empty() => Ok(NO_DATA.into()),
            cleaned => Ok(serde_json::to_string_pretty(&cleaned)?),
        },
    }
}

fn render_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return NO_DATA.into();
    }
    if trimmed.starts_with("<?xml") || has_markup(trimmed) {
        let stripped = TAG_SPAN.replace_all(trimmed, "");
        let stripped = stripped.trim();
        return if stripped.is_empty() {
            NO_DATA.into()
        } else {
            stripped.to_string()
        };
    }
    trimmed.to_string()
}

/// Self-closing, namespaced or attributed tags are always markup. A bare
/// `<ident>` only counts when its closing tag follows, so ABAP field symbols
/// such as `<ls_row>` are left alone.
fn has_markup(text: &str) -> bool {
    OPENING_TAG.captures_iter(text).any(|caps| {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            return false;
        };
        caps[0].ends_with("/>")
            || name.contains(':')
            || caps
                .get(2)
                .is_some_and(|attrs| TAG_ATTRIBUTE.is_match(attrs.as_str()))
            || text.contains(&format!("</{name}>"))
    })
}

fn render_list(items: &[Value]) -> String {
    if items.is_empty() {
        return EMPTY_LIST.into();
    }

    let mut lines: Vec<String> = items
        .iter()
        .take(MAX_LIST_ENTRIES)
        .map(render_entry)
        .collect();

    if items.len() > MAX_LIST_ENTRIES {
        lines.push(format!(
            "...and {} more objects.",
            items.len() - MAX_LIST_ENTRIES
        ));
    }
    lines.join("\n")
}

fn render_entry(entry: &Value) -> String {
    match entry {
        Value::Object(_) => {
            let name = entry_field(entry, NAME);
            let kind = entry_field(entry, TYPE);
            let description = entry_field(entry, DESCRIPTION);
            let uri = entry_field(entry, URI);

            let line = format!("- {name} ({kind}) {description}");
            if uri.is_empty() {
                line.trim_end().to_string()
            } else {
                format!("{line} URL: {uri}")
            }
        }
        Value::String(s) => format!("- {s}"),
        other => format!("- {other}"),
    }
}

fn entry_field(entry: &Value, aliases: &[&str]) -> String {
    aliases
        .iter()
        .find_map(|alias| match entry.get(*alias) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{object_path, search_hits, CanonicalResult};
    use serde_json::json;

    fn plain_entries(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({"name": format!("ZOBJ_{i}"), "type": "PROG/P"}))
                .collect(),
        )
    }

    #[test]
    fn empty_list_is_labelled() {
        let out = present(json!([]));
        assert_eq!(out.text(), "Empty list");
        assert!(!out.is_error());
    }

    #[test]
    fn absent_input_is_no_data() {
        assert_eq!(present(Value::Null).text(), "No data");
        assert_eq!(present(json!("   ")).text(), "No data");
        assert_eq!(present(json!({})).text(), "No data");
    }

    #[test]
    fn long_lists_are_capped_with_summary() {
        let out = present(plain_entries(64));
        let text = out.text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 51);
        assert_eq!(lines.iter().filter(|l| l.starts_with("- ")).count(), 50);
        assert!(text.ends_with("...and 14 more objects."), "got: {text}");
        assert_eq!(lines[0], "- ZOBJ_0 (PROG/P)");
    }

    #[test]
    fn exactly_fifty_has_no_summary() {
        let text = present(plain_entries(50)).text();
        assert_eq!(text.lines().count(), 50);
        assert!(!text.contains("more objects"));
    }

    #[test]
    fn search_hit_line_carries_url() {
        let hits = vec![json!({
            "adtcore:name": "ZCL_FOO",
            "adtcore:type": "CLAS/OC",
            "adtcore:uri": "/sap/bc/adt/oo/classes/zcl_foo"
        })];
        let text = present(search_hits(&hits)).text();
        assert!(
            text.contains("- ZCL_FOO (CLAS/OC)  URL: /sap/bc/adt/oo/classes/zcl_foo"),
            "got: {text}"
        );
    }

    #[test]
    fn object_name_aliases_are_used() {
        let text = present(json!([
            {"ObjectName": "ZPKG_SUB", "ObjectType": "DEVC/K", "description": "Sub package"}
        ]))
        .text();
        assert_eq!(text, "- ZPKG_SUB (DEVC/K) Sub package");
    }

    #[test]
    fn xml_strings_are_stripped() {
        let text = present(json!(
            "<?xml version=\"1.0\"?><asx:abap><asx:values><DATA>hello</DATA></asx:values></asx:abap>"
        ))
        .text();
        assert_eq!(text, "hello");
        assert!(!TAG_SPAN.is_match(&text));
    }

    #[test]
    fn plain_source_passes_through() {
        let source = "IF lv_a < lv_b.\n  WRITE 'x'.\nENDIF.";
        assert_eq!(present(json!(source)).text(), source);
    }

    #[test]
    fn markup_without_declaration_is_stripped() {
        let text = present(json!("<message lang=\"EN\">Object locked</message>")).text();
        assert_eq!(text, "Object locked");
    }

    #[test]
    fn field_symbols_are_not_markup() {
        let source = "LOOP AT lt_rows ASSIGNING <ls_row>.\n  <ls_row>-flag = abap_true.\nENDLOOP.";
        assert_eq!(present(json!(source)).text(), source);
    }

    #[test]
    fn self_closing_elements_are_stripped() {
        let text = present(json!(
            "Found <adtcore:objectReference adtcore:name=\"ZCL_FOO\" adtcore:type=\"CLAS/OC\"/> once"
        ))
        .text();
        assert_eq!(text, "Found  once");
        assert_eq!(present(json!("before <br/> after")).text(), "before  after");
    }

    #[test]
    fn namespaced_or_attributed_tags_are_stripped_without_closing_tag() {
        assert_eq!(present(json!("<asx:abap>payload")).text(), "payload");
        assert_eq!(present(json!("<entry kind=\"x\">payload")).text(), "payload");
    }

    #[test]
    fn abap_comparisons_are_not_markup() {
        let source = "IF a<b AND c>d.\nENDIF.";
        assert_eq!(present(json!(source)).text(), source);
    }

    #[test]
    fn markup_that_strips_to_nothing_is_no_data() {
        let xml = "<?xml version=\"1.0\"?><a/>";
        assert_eq!(present(json!(xml)).text(), NO_DATA);
    }

    #[test]
    fn record_of_only_blocked_fields_is_no_data() {
        let out = present(json!({"links": [], "etag": "1", "changed_by": "ME"}));
        assert_eq!(out.text(), NO_DATA);
        assert!(!out.is_error());
    }

    #[test]
    fn objects_are_pretty_printed_without_blocked_fields() {
        let out = present(json!({
            "name": "ZCL_FOO",
            "links": [{"href": "/x"}],
            "detail": {"etag": "1", "size": 18_446_744_073_709_551_615_u64}
        }));
        let text = out.text();
        assert!(text.contains("\"name\": \"ZCL_FOO\""));
        assert!(text.contains("\"size\": \"18446744073709551615\""));
        assert!(!text.contains("links"));
        assert!(!text.contains("etag"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn blocked_fields_are_removed_from_list_entries() {
        let text = present(json!([{"name": "A", "type": "T", "description": "d", "links": ["x"]}])).text();
        assert_eq!(text, "- A (T) d");
    }

    #[test]
    fn canonical_text_renders_directly() {
        let raw = json!({"table:abapTable": {"_attributes": {"adtcore:name": "ZTAB"}}});
        assert_eq!(present(object_path(&raw)).text(), "TMP > ZTAB");
        assert_eq!(
            present(CanonicalResult::Text("No results found.".into())).text(),
            "No results found."
        );
    }

    #[test]
    fn output_serializes_to_wire_shape() {
        let value = serde_json::to_value(present(json!("ok"))).unwrap();
        assert_eq!(value, json!({"content": [{"type": "text", "text": "ok"}]}));
    }
}

//! ADT XML bodies decoded into a generic [`Value`] tree.
//!
//! Each element becomes a mapping keyed by its child element names
//! (namespace prefixes kept, e.g. `adtcore:objectReference`). Attributes
//! land under [`ATTRIBUTES_KEY`], character data under [`TEXT_KEY`], and a
//! child name seen more than once turns into a sequence.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::FetchError;

pub const ATTRIBUTES_KEY: &str = "_attributes";
pub const TEXT_KEY: &str = "_text";

pub fn parse(xml: &str) -> Result<Value, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Bottom frame is the document itself.
    let mut stack: Vec<(String, Map<String, Value>)> = vec![(String::new(), Map::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = element_name(&start)?;
                let attributes = element_attributes(&start)?;
                stack.push((name, attributes));
            }
            Ok(Event::Empty(start)) => {
                let name = element_name(&start)?;
                let attributes = element_attributes(&start)?;
                let parent = current(&mut stack)?;
                insert_child(parent, name, Value::Object(attributes));
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| FetchError::Parse(format!("bad character data: {e}")))?;
                append_text(current(&mut stack)?, &text);
            }
            Ok(Event::CData(data)) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                append_text(current(&mut stack)?, &text);
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(FetchError::Parse("unbalanced closing tag".into()));
                }
                let (name, element) = stack
                    .pop()
                    .ok_or_else(|| FetchError::Parse("unbalanced closing tag".into()))?;
                insert_child(current(&mut stack)?, name, Value::Object(element));
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctypes.
            Ok(_) => {}
            Err(e) => {
                return Err(FetchError::Parse(format!(
                    "invalid XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    if stack.len() != 1 {
        return Err(FetchError::Parse("unexpected end of document".into()));
    }
    let (_, document) = stack
        .pop()
        .ok_or_else(|| FetchError::Parse("empty document".into()))?;
    Ok(Value::Object(document))
}

fn current(
    stack: &mut [(String, Map<String, Value>)],
) -> Result<&mut Map<String, Value>, FetchError> {
    stack
        .last_mut()
        .map(|(_, element)| element)
        .ok_or_else(|| FetchError::Parse("text outside of any element".into()))
}

fn element_name(start: &BytesStart<'_>) -> Result<String, FetchError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| FetchError::Parse(format!("element name is not UTF-8: {e}")))
}

fn element_attributes(start: &BytesStart<'_>) -> Result<Map<String, Value>, FetchError> {
    let mut attributes = Map::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FetchError::Parse(format!("bad attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| FetchError::Parse(format!("attribute name is not UTF-8: {e}")))?;
        // Namespace declarations carry no artifact data.
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| FetchError::Parse(format!("bad attribute value: {e}")))?;
        attributes.insert(key.to_string(), Value::String(value.into_owned()));
    }

    let mut element = Map::new();
    if !attributes.is_empty() {
        element.insert(ATTRIBUTES_KEY.into(), Value::Object(attributes));
    }
    Ok(element)
}

fn insert_child(parent: &mut Map<String, Value>, name: String, child: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(siblings)) => siblings.push(child),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, child]);
        }
        None => {
            parent.insert(name, child);
        }
    }
}

fn append_text(element: &mut Map<String, Value>, text: &str) {
    match element.get_mut(TEXT_KEY) {
        Some(Value::String(existing)) => existing.push_str(text),
        _ => {
            element.insert(TEXT_KEY.into(), Value::String(text.to_string()));
        }
    }
}

//! Argument readers. All checks run before any request is sent.

use serde_json::Value;

use crate::error::ToolError;

const ADT_PREFIX: &str = "/sap/bc/adt/";

pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim()),
        Some(Value::String(_)) => Err(ToolError::invalid(format!("{key} must not be empty"))),
        Some(_) => Err(ToolError::invalid(format!("{key} must be a string"))),
        None => Err(ToolError::invalid(format!("missing required argument: {key}"))),
    }
}

pub(crate) fn optional_bool(args: &Value, key: &str) -> Result<bool, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(false),
        Some(_) => Err(ToolError::invalid(format!("{key} must be a boolean"))),
    }
}

/// Optional positive count, capped at `max`.
pub(crate) fn optional_count(
    args: &Value,
    key: &str,
    default: u32,
    max: u32,
) -> Result<u32, ToolError> {
    let raw = match args.get(key) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    match raw {
        Some(0) | None => Err(ToolError::invalid(format!(
            "{key} must be a positive integer"
        ))),
        Some(n) => Ok(n.min(u64::from(max)) as u32),
    }
}

/// A server-relative ADT object URL, without trailing slash or query.
pub(crate) fn adt_path(args: &Value, key: &str) -> Result<String, ToolError> {
    let raw = required_str(args, key)?;
    let path = raw.split(['?', '#']).next().unwrap_or(raw).trim_end_matches('/');
    if !path.starts_with(ADT_PREFIX) || path.len() <= ADT_PREFIX.len() {
        return Err(ToolError::invalid(format!(
            "{key} must be an ADT path starting with {ADT_PREFIX}"
        )));
    }
    Ok(path.to_string())
}

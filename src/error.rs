use serde::Serialize;
use serde_json::Value;

use crate::xml;

/// Longest upstream message carried into a tool result.
const MAX_UPSTREAM_MESSAGE: usize = 240;

/// Failure reported by an [`AdtTransport`](crate::client::AdtTransport).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("ADT returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("request cancelled")]
    Cancelled,
}

/// Stable codes attached to every projected error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    InvalidParams,
    MethodNotFound,
    InternalError,
}

/// Errors a tool is allowed to surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidParams(String),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("SAP request failed: {message}")]
    Upstream { status: Option<u16>, message: String },
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::InvalidParams(_) => ErrorCode::InvalidParams,
            ToolError::UnknownTool(_) => ErrorCode::MethodNotFound,
            ToolError::Upstream { .. } => ErrorCode::InternalError,
        }
    }
}

impl From<FetchError> for ToolError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::ApiError { status, body } => ToolError::Upstream {
                status: Some(status),
                message: format!("HTTP {status}: {}", summarize_fault(&body)),
            },
            FetchError::Request(message) | FetchError::Parse(message) => ToolError::Upstream {
                status: None,
                message: clip(&message),
            },
            FetchError::Cancelled => ToolError::Upstream {
                status: None,
                message: "request cancelled".into(),
            },
        }
    }
}

/// Pull the human-readable message out of an ADT fault body.
///
/// ADT reports failures as `<exc:exception>` documents; only the
/// `<message>` text is kept. Anything else collapses to a fixed phrase so
/// raw server payloads never reach the caller.
fn summarize_fault(body: &str) -> String {
    let parsed = match xml::parse(body) {
        Ok(value) => value,
        Err(_) => return "no details available".into(),
    };
    let message = parsed
        .get("exc:exception")
        .and_then(|exc| exc.get("message"))
        .and_then(|msg| match msg {
            Value::String(s) => Some(s.as_str()),
            other => other.get(xml::TEXT_KEY).and_then(Value::as_str),
        })
        .map(str::trim)
        .filter(|m| !m.is_empty());

    match message {
        Some(m) => clip(m),
        None => "no details available".into(),
    }
}

fn clip(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("").trim();
    if first_line.chars().count() <= MAX_UPSTREAM_MESSAGE {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(MAX_UPSTREAM_MESSAGE).collect();
    format!("{cut}...")
}

/// Problems loading [`AdtConfig`](crate::config::AdtConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

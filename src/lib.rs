//! Read-only ABAP repository lookups over the ADT REST API, shaped for LLM tool calls.
//!
//! A call flows through three stages: the [`AdtTransport`] fetches a raw
//! response, a [`transform`] function reduces it to a [`CanonicalResult`],
//! and [`present`] renders that into a bounded, redacted [`ToolOutput`].
//! Failures at any stage end in [`project_error`] instead.

pub mod client;
pub mod config;
pub mod error;
pub mod present;
pub mod tools;
pub mod transform;
pub mod xml;

pub use client::{AdtMethod, AdtRequest, AdtResponse, AdtTransport, HttpTransport};
pub use config::AdtConfig;
pub use error::{ConfigError, ErrorCode, FetchError, ToolError};
pub use present::{present, project_error, TextContent, ToolOutput};
pub use tools::{AdtTool, ToolRegistry};
pub use transform::{AdtRoot, CanonicalResult, ObjectSummary, RootKind};

use serde::Serialize;
use tracing::warn;

use super::ToolOutput;
use crate::error::{ErrorCode, ToolError};

const GENERIC_MESSAGE: &str = "Internal server error";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: ErrorCode,
}

/// Turn any failure into an error output.
///
/// A [`ToolError`] keeps its message and code. Anything else is reported
/// generically so unexpected payloads never reach the caller.
pub fn project_error(err: &(dyn std::error::Error + 'static)) -> ToolOutput {
    let body = match err.downcast_ref::<ToolError>() {
        Some(tool_error) => {
            warn!(code = ?tool_error.code(), error = %tool_error, "tool call failed");
            ErrorBody {
                error: tool_error.to_string(),
                code: tool_error.code(),
            }
        }
        None => {
            warn!(error = %err, "unexpected failure in tool call");
            ErrorBody {
                error: GENERIC_MESSAGE.into(),
                code: ErrorCode::InternalError,
            }
        }
    };

    let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| {
        format!("{{\"error\": \"{GENERIC_MESSAGE}\", \"code\": \"InternalError\"}}")
    });
    ToolOutput::failure(text)
}

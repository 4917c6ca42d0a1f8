use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::AdtTransport;
use crate::error::ToolError;
use crate::transform::CanonicalResult;

/// One ADT lookup exposed as a tool. Implementations validate their
/// arguments, fetch through the transport and return a canonical shape;
/// presentation happens in the registry.
#[async_trait]
pub trait AdtTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the argument record.
    fn input_schema(&self) -> Value;

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError>;

    /// Complete tool definition (name, description, input_schema).
    fn schema(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "input_schema": self.input_schema(),
        })
    }
}

use async_trait::async_trait;
use serde_json::{json, Value};

use super::args::required_str;
use super::handler::AdtTool;
use crate::client::{AdtRequest, AdtTransport};
use crate::error::ToolError;
use crate::transform::{package_contents, CanonicalResult};

pub struct GetPackageContents;

#[async_trait]
impl AdtTool for GetPackageContents {
    fn name(&self) -> &str {
        "get_package_contents"
    }

    fn description(&self) -> &str {
        "List the objects and sub-packages contained in an ABAP package."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "package_name": {"type": "string", "description": "Package name, e.g. ZSALES or /ABC/CORE"}
            },
            "required": ["package_name"]
        })
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let package = required_str(args, "package_name")?.to_ascii_uppercase();
        if package.contains(char::is_whitespace) {
            return Err(ToolError::invalid("package_name must not contain spaces"));
        }

        let resp = transport
            .send(
                AdtRequest::post("/sap/bc/adt/repository/nodestructure")
                    .query("parent_type", "DEVC/K")
                    .query("parent_name", package)
                    .query("withShortDescriptions", "true")
                    .accept("application/vnd.sap.as+xml"),
            )
            .await?;
        Ok(package_contents(&resp.data))
    }
}

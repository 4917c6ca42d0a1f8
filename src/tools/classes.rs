use async_trait::async_trait;
use serde_json::{json, Value};

use super::args::{adt_path, optional_bool};
use super::handler::AdtTool;
use crate::client::{AdtRequest, AdtTransport};
use crate::error::ToolError;
use crate::transform::{class_structure_clean, class_structure_raw, CanonicalResult};

pub struct GetClassStructure;

#[async_trait]
impl AdtTool for GetClassStructure {
    fn name(&self) -> &str {
        "get_class_structure"
    }

    fn description(&self) -> &str {
        "List the methods, attributes and other components of an ABAP class or interface."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "class_url": {
                    "type": "string",
                    "description": "ADT URL of the class, e.g. /sap/bc/adt/oo/classes/zcl_example"
                },
                "raw": {
                    "type": "boolean",
                    "description": "Keep every server attribute instead of the cleaned listing (default false)"
                }
            },
            "required": ["class_url"]
        })
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let url = adt_path(args, "class_url")?;
        let raw = optional_bool(args, "raw")?;
        let resp = transport
            .send(AdtRequest::get(format!("{url}/objectstructure")).accept("application/xml"))
            .await?;

        Ok(if raw {
            class_structure_raw(&resp.data)
        } else {
            class_structure_clean(&resp.data)
        })
    }
}

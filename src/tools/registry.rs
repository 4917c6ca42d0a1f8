use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::classes::GetClassStructure;
use super::handler::AdtTool;
use super::objects::{
    FindWhereUsed, GetObjectInfo, GetObjectPath, GetObjectSource, GetObjectVersions,
    SearchObjects,
};
use super::packages::GetPackageContents;
use crate::client::AdtTransport;
use crate::error::{FetchError, ToolError};
use crate::present::{present, project_error, ToolOutput};
use crate::transform::CanonicalResult;

/// Catalog of ADT tools bound to one transport.
///
/// Every call ends in a [`ToolOutput`]: successes go through the presenter,
/// failures through the error projector.
pub struct ToolRegistry {
    transport: Box<dyn AdtTransport>,
    tools: Vec<Box<dyn AdtTool>>,
}

impl ToolRegistry {
    /// An empty registry. Add tools with [`ToolRegistry::add`].
    pub fn new(transport: impl AdtTransport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            tools: Vec::new(),
        }
    }

    /// A registry with every built-in ADT tool.
    pub fn with_defaults(transport: impl AdtTransport + 'static) -> Self {
        Self::new(transport)
            .add(SearchObjects)
            .add(GetObjectInfo)
            .add(GetObjectSource)
            .add(GetObjectPath)
            .add(GetClassStructure)
            .add(GetPackageContents)
            .add(FindWhereUsed)
            .add(GetObjectVersions)
    }

    pub fn add(mut self, tool: impl AdtTool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// All tool definitions for the protocol layer.
    pub fn schemas(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    pub fn schema(&self, name: &str) -> Option<Value> {
        self.find(name).map(|t| t.schema())
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    fn find(&self, name: &str) -> Option<&dyn AdtTool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
    }

    /// Run a tool and return its canonical result without presenting it.
    pub async fn call(&self, name: &str, args: &Value) -> Result<CanonicalResult, ToolError> {
        let tool = self
            .find(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.run(&*self.transport, args).await
    }

    /// Run a tool by name and render the outcome.
    pub async fn execute(&self, name: &str, args: &Value) -> ToolOutput {
        info!(tool = name, "tool call");
        let started = Instant::now();

        let output = match self.call(name, args).await {
            Ok(result) => present(result),
            Err(e) => project_error(&e),
        };

        debug!(
            tool = name,
            is_error = output.is_error(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tool call finished"
        );
        output
    }

    /// [`execute`](Self::execute) that gives up when `cancel` fires.
    pub async fn execute_with_cancel(
        &self,
        name: &str,
        args: &Value,
        cancel: CancellationToken,
    ) -> ToolOutput {
        tokio::select! {
            output = self.execute(name, args) => output,
            _ = cancel.cancelled() => {
                info!(tool = name, "tool call cancelled");
                project_error(&ToolError::from(FetchError::Cancelled))
            }
        }
    }
}

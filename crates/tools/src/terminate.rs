//! Terminate tool — the designated run-ending capability.
//!
//! The engine matches tool-result entries against [`TERMINATE_TOOL`];
//! invoking this tool ends the run regardless of what else executed in
//! the same batch.

use async_trait::async_trait;
use reagent_core::backend::TERMINATE_TOOL;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolOutput};

pub struct TerminateTool;

#[async_trait]
impl Tool for TerminateTool {
    fn name(&self) -> &str {
        TERMINATE_TOOL
    }

    fn description(&self) -> &str {
        "Terminate the interaction when the request is met or when the assistant cannot proceed further with the task. When you have finished all the tasks, call this tool to end the work."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::ok("Task finished"))
    }
}

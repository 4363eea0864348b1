//! File read tool — read file contents from the sandbox directory.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolOutput};
use std::path::PathBuf;

use crate::sandbox_path;

pub struct FileReadTool {
    /// Root directory all file names resolve under.
    root: PathBuf,
}

impl FileReadTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file with the given name."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the file to read"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let name = arguments["name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;

        let path = sandbox_path(&self.root, name).map_err(|reason| ToolError::PermissionDenied {
            tool_name: "file_read".into(),
            reason,
        })?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(ToolOutput::ok(content)),
            Err(e) => Ok(ToolOutput::failed(format!("Error reading file: {e}"))),
        }
    }
}

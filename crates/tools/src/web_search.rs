//! Web search tool — stub that returns mock search results.
//!
//! In production this would call a real search API. The stub returns
//! deterministic, plausible results so the step loop can be exercised
//! end-to-end without network access.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolOutput};

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let num_results = arguments["num_results"].as_u64().unwrap_or(3).min(5) as usize;

        let results = generate_mock_results(query, num_results);
        let output = serde_json::to_string_pretty(&results)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?;

        Ok(ToolOutput::ok(output))
    }
}

#[derive(Clone, serde::Serialize)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

fn generate_mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?p={}", i + 1),
            snippet: format!(
                "This is a mock search result for the query '{query}'. In production, this would contain real content."
            ),
        })
        .collect()
}

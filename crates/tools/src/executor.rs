//! Registry-backed tool execution backend.
//!
//! Implements the engine's `ToolExecutor` contract over a [`ToolRegistry`]:
//! every proposed invocation yields exactly one tool-result message, in
//! invocation order, with per-tool failures encoded as result text. This
//! boundary never raises.

use async_trait::async_trait;
use reagent_core::backend::ToolExecutor;
use reagent_core::message::{Conversation, Message, MessageToolCall};
use reagent_core::tool::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub struct RegistryExecutor {
    registry: Arc<ToolRegistry>,
}

impl RegistryExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolExecutor for RegistryExecutor {
    async fn execute(
        &self,
        mut conversation: Conversation,
        calls: &[MessageToolCall],
    ) -> Conversation {
        for call in calls {
            let arguments: serde_json::Value =
                serde_json::from_str(&call.arguments).unwrap_or_default();

            let start = Instant::now();
            let text = match self.registry.execute(&call.name, arguments).await {
                Ok(output) => {
                    debug!(
                        tool = %call.name,
                        success = output.success,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "tool executed"
                    );
                    output.output
                }
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "tool execution failed");
                    format!("Error: {e}")
                }
            };

            conversation.push(Message::tool_result(&call.id, &call.name, text));
        }

        conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminate::TerminateTool;
    use reagent_core::message::Role;

    fn make_call(name: &str, args: serde_json::Value) -> MessageToolCall {
        MessageToolCall {
            id: format!("call_{name}"),
            name: name.into(),
            arguments: serde_json::to_string(&args).unwrap(),
        }
    }

    #[tokio::test]
    async fn appends_one_result_per_call_in_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(TerminateTool));
        registry.register(Box::new(crate::web_search::WebSearchTool));
        let executor = RegistryExecutor::new(Arc::new(registry));

        let calls = vec![
            make_call("web_search", serde_json::json!({"query": "x"})),
            make_call("doTerminate", serde_json::json!({})),
        ];

        let conv = executor.execute(Conversation::new(), &calls).await;
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages[0].role, Role::Tool);
        assert_eq!(conv.messages[0].tool_name.as_deref(), Some("web_search"));
        assert_eq!(conv.messages[1].tool_name.as_deref(), Some("doTerminate"));
        assert_eq!(conv.messages[1].content, "Task finished");
    }

    #[tokio::test]
    async fn failing_tool_does_not_mask_the_terminate_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(TerminateTool));
        let executor = RegistryExecutor::new(Arc::new(registry));

        let calls = vec![
            make_call("nonexistent_tool", serde_json::json!({})),
            make_call("doTerminate", serde_json::json!({})),
        ];
        let conv = executor.execute(Conversation::new(), &calls).await;

        // One result per call in order; the failure text does not displace
        // the terminate entry the engine scans for.
        assert_eq!(conv.len(), 2);
        assert!(conv.messages[0].content.contains("Error:"));
        assert_eq!(
            conv.messages[0].tool_name.as_deref(),
            Some("nonexistent_tool")
        );
        assert_eq!(conv.messages[1].tool_name.as_deref(), Some("doTerminate"));
        assert_eq!(conv.messages[1].content, "Task finished");
    }

    #[tokio::test]
    async fn unknown_tool_failure_is_encoded_as_text() {
        let executor = RegistryExecutor::new(Arc::new(ToolRegistry::new()));

        let calls = vec![make_call("nonexistent", serde_json::json!({}))];
        let conv = executor.execute(Conversation::new(), &calls).await;

        assert_eq!(conv.len(), 1);
        assert!(conv.messages[0].content.contains("Error:"));
        assert!(conv.messages[0].content.contains("nonexistent"));
    }

    #[tokio::test]
    async fn malformed_arguments_do_not_raise() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(crate::web_search::WebSearchTool));
        let executor = RegistryExecutor::new(Arc::new(registry));

        let calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "web_search".into(),
            arguments: "not json".into(),
        }];
        let conv = executor.execute(Conversation::new(), &calls).await;

        // Arguments fall back to null; the tool reports the missing query.
        assert_eq!(conv.len(), 1);
        assert!(conv.messages[0].content.contains("Error:"));
    }
}

//! Shared test helpers for engine tests.

use async_trait::async_trait;
use reagent_core::backend::{Reasoning, ReasoningBackend, ToolExecutor};
use reagent_core::error::BackendError;
use reagent_core::message::{Conversation, Message, MessageToolCall};
use reagent_core::tool::ToolDefinition;
use std::sync::Mutex;
use std::time::Duration;

/// A mock reasoning backend that returns a sequence of scripted outcomes.
///
/// Each call to `reason` pops the next outcome in the queue. Panics if more
/// calls are made than outcomes provided.
pub struct ScriptedBackend {
    outcomes: Mutex<Vec<Result<Reasoning, BackendError>>>,
    call_count: Mutex<usize>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    pub fn new(outcomes: Vec<Result<Reasoning, BackendError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            call_count: Mutex::new(0),
            delay: None,
        }
    }

    /// A backend that returns a single conversational reply.
    pub fn single_reply(text: &str) -> Self {
        Self::new(vec![Ok(reply(text))])
    }

    /// Sleep before answering, to widen step boundaries in timing tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn reason(
        &self,
        _conversation: &Conversation,
        _system_prompt: &str,
        _tools: &[ToolDefinition],
    ) -> Result<Reasoning, BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut count = self.call_count.lock().unwrap();
        let outcomes = self.outcomes.lock().unwrap();

        if *count >= outcomes.len() {
            panic!(
                "ScriptedBackend: no more outcomes (call #{}, have {})",
                *count,
                outcomes.len()
            );
        }

        let outcome = outcomes[*count].clone();
        *count += 1;
        outcome
    }
}

/// A tool execution backend that appends one successful tool-result message
/// per call, in invocation order, without running anything.
pub struct RecordingExecutor;

impl RecordingExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolExecutor for RecordingExecutor {
    async fn execute(
        &self,
        mut conversation: Conversation,
        calls: &[MessageToolCall],
    ) -> Conversation {
        for call in calls {
            conversation.push(Message::tool_result(
                &call.id,
                &call.name,
                format!("{} completed", call.name),
            ));
        }
        conversation
    }
}

/// A purely conversational reasoning outcome.
pub fn reply(text: &str) -> Reasoning {
    Reasoning {
        reply: text.to_string(),
        tool_calls: vec![],
    }
}

/// A reasoning outcome proposing one invocation per named tool.
pub fn reasoning_with_tools(text: &str, tools: &[&str]) -> Reasoning {
    Reasoning {
        reply: text.to_string(),
        tool_calls: tools
            .iter()
            .map(|name| make_tool_call(name, serde_json::json!({})))
            .collect(),
    }
}

/// Helper to create a proposed tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

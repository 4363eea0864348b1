//! Backend traits — the two consumed collaborators of the execution engine.
//!
//! The engine never talks to a model or runs a tool directly. It calls a
//! [`ReasoningBackend`] to turn the conversation into a reply and/or a batch
//! of proposed tool invocations, and a [`ToolExecutor`] to run a proposed
//! batch and fold the results back into the conversation. Both are stateless,
//! shared collaborators that multiple executors may call concurrently.

use crate::error::BackendError;
use crate::message::{Conversation, MessageToolCall};
use crate::tool::ToolDefinition;
use async_trait::async_trait;

/// The designated termination tool. Any tool-result entry bearing this name
/// ends the run, independent of its own success or failure content.
pub const TERMINATE_TOOL: &str = "doTerminate";

/// The outcome of one reasoning call.
#[derive(Debug, Clone)]
pub struct Reasoning {
    /// The backend's textual reply (may be empty when only tools are proposed).
    pub reply: String,

    /// Proposed tool invocations, in invocation order. Empty means the
    /// backend considers the turn purely conversational.
    pub tool_calls: Vec<MessageToolCall>,
}

impl Reasoning {
    /// Whether this reasoning step proposed any action.
    pub fn proposes_action(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// The reasoning backend: turns a conversation into a proposed reply and/or
/// a set of tool invocations.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai-compat").
    fn name(&self) -> &str;

    /// Consult the model with the full conversation log, the static system
    /// prompt, and the declared tool capability set.
    async fn reason(
        &self,
        conversation: &Conversation,
        system_prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<Reasoning, BackendError>;
}

/// The tool execution backend: runs a batch of proposed invocations and
/// returns the updated conversation.
///
/// The returned log is the input log plus one tool-result message per
/// invocation, in invocation order. Per-tool failures are encoded as
/// tool-result text; this boundary never raises.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, conversation: Conversation, calls: &[MessageToolCall])
    -> Conversation;
}

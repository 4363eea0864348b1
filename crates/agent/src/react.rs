//! ReAct step protocol — the think/act cycle.
//!
//! One step = a reasoning phase that decides whether an action is needed,
//! followed (conditionally) by an action phase that executes the proposed
//! tool batch. The split between recoverable outcomes and fatal contract
//! violations is explicit in the types: backend hiccups become
//! conversational turns, `StepError::Logic` fails the run.

use async_trait::async_trait;
use reagent_core::backend::{ReasoningBackend, TERMINATE_TOOL, ToolExecutor};
use reagent_core::error::StepError;
use reagent_core::message::Message;
use reagent_core::state::AgentState;
use reagent_core::tool::ToolDefinition;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::executor::RunState;

/// What the reasoning phase decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThinkOutcome {
    /// Pure conversational turn; the iteration ends with this reply text.
    Reply(String),

    /// A tool batch was proposed and stashed; act must run next.
    ActionProposed,
}

/// Polymorphic step behavior: distinct think/act implementations compose
/// into one atomic step via the provided [`ReactStep::step`].
#[async_trait]
pub trait ReactStep: Send + Sync {
    /// Consult the reasoning backend and decide whether an action is needed.
    async fn think(&self, run: &mut RunState) -> Result<ThinkOutcome, StepError>;

    /// Execute the pending tool batch and fold results into the conversation.
    async fn act(&self, run: &mut RunState) -> Result<String, StepError>;

    /// One ReAct iteration: think, then conditionally act.
    ///
    /// Non-fatal failures from either phase are converted into the
    /// iteration's textual result here; only fatal contract violations
    /// escape to the lifecycle loop.
    async fn step(&self, run: &mut RunState) -> Result<String, StepError> {
        let outcome = match self.think(run).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => return Ok(format!("Error running agent: {e}")),
        };

        match outcome {
            ThinkOutcome::Reply(text) => Ok(text),
            ThinkOutcome::ActionProposed => match self.act(run).await {
                Ok(summary) => Ok(summary),
                Err(e) if e.is_fatal() => Err(e),
                Err(e) => Ok(format!("Error running agent: {e}")),
            },
        }
    }
}

/// The tool-calling step implementation.
///
/// Think sends the full conversation log, the static system prompt, and the
/// declared tool capability set to the reasoning backend; act submits the
/// proposed batch to the tool execution backend and detects the termination
/// tool.
pub struct ToolCallStep {
    /// The reasoning backend.
    backend: Arc<dyn ReasoningBackend>,

    /// The tool execution backend.
    tool_executor: Arc<dyn ToolExecutor>,

    /// Static guidance injected into every reasoning call.
    system_prompt: String,

    /// Optional prompt appended as a fresh user message before each
    /// reasoning call.
    next_step_prompt: String,

    /// Declared tool capability set.
    tool_definitions: Vec<ToolDefinition>,
}

impl ToolCallStep {
    pub fn new(
        backend: Arc<dyn ReasoningBackend>,
        tool_executor: Arc<dyn ToolExecutor>,
        tool_definitions: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            backend,
            tool_executor,
            system_prompt: String::new(),
            next_step_prompt: String::new(),
            tool_definitions,
        }
    }

    /// Set the static system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the per-step guidance prompt.
    pub fn with_next_step_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.next_step_prompt = prompt.into();
        self
    }
}

#[async_trait]
impl ReactStep for ToolCallStep {
    async fn think(&self, run: &mut RunState) -> Result<ThinkOutcome, StepError> {
        if !self.next_step_prompt.is_empty() {
            run.conversation.push(Message::user(&self.next_step_prompt));
        }

        let reasoning = match self
            .backend
            .reason(&run.conversation, &self.system_prompt, &self.tool_definitions)
            .await
        {
            Ok(reasoning) => reasoning,
            Err(e) => {
                // Reasoning failures are recoverable conversational turns,
                // never run-terminating errors.
                warn!(backend = self.backend.name(), error = %e, "reasoning backend failed");
                let text = format!("Error while reasoning: {e}");
                run.conversation.push(Message::assistant(&text));
                run.pending_action = None;
                run.buffer.push_text(&text);
                return Ok(ThinkOutcome::Reply(text));
            }
        };

        debug!(
            tools = reasoning.tool_calls.len(),
            reply_len = reasoning.reply.len(),
            "reasoning complete"
        );

        if !reasoning.proposes_action() {
            run.conversation.push(Message::assistant(&reasoning.reply));
            run.pending_action = None;
            run.buffer.push_text(&reasoning.reply);
            return Ok(ThinkOutcome::Reply(reasoning.reply));
        }

        let names: Vec<String> = reasoning
            .tool_calls
            .iter()
            .map(|tc| tc.name.clone())
            .collect();
        info!(tools = ?names, "step proposed tool invocations");

        run.buffer.note_thinking(names);
        run.buffer.push_text(&reasoning.reply);

        // The proposal is appended to the conversation during act, as part
        // of the execution backend's conversation-update contract.
        let mut assistant = Message::assistant(&reasoning.reply);
        assistant.tool_calls = reasoning.tool_calls;
        run.pending_action = Some(assistant);

        Ok(ThinkOutcome::ActionProposed)
    }

    async fn act(&self, run: &mut RunState) -> Result<String, StepError> {
        let Some(assistant) = run.pending_action.take() else {
            return Err(StepError::Logic(
                "act invoked without a pending tool proposal".into(),
            ));
        };

        let calls = assistant.tool_calls.clone();
        run.conversation.push(assistant);

        let watermark = run.conversation.len();
        let conversation = std::mem::take(&mut run.conversation);
        run.conversation = self.tool_executor.execute(conversation, &calls).await;

        let terminated = run.conversation.messages[watermark.min(run.conversation.len())..]
            .iter()
            .any(|m| m.tool_name.as_deref() == Some(TERMINATE_TOOL));

        if terminated {
            info!("termination tool invoked; finishing run");
            run.state = AgentState::Finished;
        }

        let summary = calls
            .iter()
            .map(|c| format!("Tool {} executed", c.name))
            .collect::<Vec<_>>()
            .join("\n");
        run.buffer.push_text(&summary);

        Ok(summary)
    }
}

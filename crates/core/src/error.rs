//! Error types for the ReAgent domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The taxonomy keeps
//! recoverable step outcomes and fatal call errors in separate types:
//! a `BackendError` is absorbed into a conversational turn, a
//! `StepError::Logic` fails the whole run.

use crate::state::AgentState;
use thiserror::Error;

/// Errors that reject a run before the loop starts.
///
/// Neither variant mutates the conversation or the lifecycle state.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("cannot run agent from state: {state}")]
    InvalidState { state: AgentState },

    #[error("cannot run agent with an empty user prompt")]
    EmptyInput,
}

/// Errors raised inside one loop iteration.
#[derive(Debug, Error)]
pub enum StepError {
    /// A programming-contract violation: act invoked without a pending
    /// proposal. Always fatal to the call.
    #[error("step contract violated: {0}")]
    Logic(String),

    /// Any other failure inside the iteration. Absorbed into that
    /// iteration's textual result; the run continues.
    #[error("step failed: {0}")]
    Failed(String),
}

impl StepError {
    /// Whether this error must escalate the run to the `Error` state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Logic(_))
    }
}

/// Errors from the reasoning backend.
///
/// Always recoverable at the step level: the think phase converts them into
/// a synthetic assistant message and the run continues.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("backend request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

/// Errors from individual tool implementations.
///
/// Never crosses the tool-execution boundary: the executor encodes these
/// into tool-result text so the reasoning backend can recover.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("permission denied: {tool_name} — {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_the_state() {
        let err = AgentError::InvalidState {
            state: AgentState::Running,
        };
        assert!(err.to_string().contains("running"));
    }

    #[test]
    fn logic_errors_are_fatal() {
        assert!(StepError::Logic("act without proposal".into()).is_fatal());
        assert!(!StepError::Failed("tool summary glitch".into()).is_fatal());
    }

    #[test]
    fn backend_error_displays_status() {
        let err = BackendError::Api {
            status_code: 429,
            message: "too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn tool_error_displays_tool_name() {
        let err = ToolError::ExecutionFailed {
            tool_name: "file_write".into(),
            reason: "disk full".into(),
        };
        assert!(err.to_string().contains("file_write"));
        assert!(err.to_string().contains("disk full"));
    }
}

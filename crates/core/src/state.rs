//! Agent lifecycle state.

use serde::{Deserialize, Serialize};

/// The lifecycle state of an agent executor.
///
/// Transitions: `Idle → Running → {Finished, Error}`, with cleanup always
/// restoring `Idle` regardless of the terminal state reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Ready to accept a run; conversation empty, step counter at zero.
    #[default]
    Idle,
    /// A step loop is actively executing.
    Running,
    /// The run ended normally (termination tool, max steps, or interruption).
    Finished,
    /// The run ended on a failure outside the step boundary.
    Error,
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_idle() {
        assert_eq!(AgentState::default(), AgentState::Idle);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&AgentState::Running).unwrap();
        assert_eq!(json, r#""running""#);
    }
}

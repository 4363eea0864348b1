//! # ReAgent Core
//!
//! Domain types, traits, and error definitions for the ReAgent execution
//! engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The engine's collaborators are defined as traits here. Implementations
//! live in their respective crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with scripted mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod message;
pub mod state;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use backend::{Reasoning, ReasoningBackend, TERMINATE_TOOL, ToolExecutor};
pub use error::{AgentError, BackendError, StepError, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use state::AgentState;
pub use tool::{Tool, ToolDefinition, ToolOutput, ToolRegistry};

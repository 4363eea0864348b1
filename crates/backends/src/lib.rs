//! Reasoning backend implementations.
//!
//! Currently a single OpenAI-compatible HTTP backend, which covers OpenAI,
//! OpenRouter, DashScope, Ollama, vLLM and friends.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatBackend;

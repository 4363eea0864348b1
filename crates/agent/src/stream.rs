//! Streaming fragments and the per-step stream buffer.
//!
//! `StreamFragment` is what the streaming driver pushes onto the output
//! channel; the gateway forwards fragments to clients over SSE.

use serde::{Deserialize, Serialize};

/// Fragments emitted by the streaming driver as a run progresses.
///
/// - `thinking`    — proposed tool names for the step, in invocation order
/// - `content`     — reply or tool-summary text from the step
/// - `interrupted` — the run was stopped by a cooperative interrupt
/// - `done`        — the run completed; final fragment on the channel
/// - `error`       — the run failed outside the step boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFragment {
    /// Thinking-process annotation: which tools the step proposed.
    Thinking { tools: Vec<String> },

    /// Reply or summary text produced by a step.
    Content { content: String },

    /// The run was interrupted by the user.
    Interrupted { message: String },

    /// The run is complete — final metadata.
    Done { steps: u32 },

    /// The run failed.
    Error { message: String },
}

impl StreamFragment {
    /// SSE event name for this fragment type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Thinking { .. } => "thinking",
            Self::Content { .. } => "content",
            Self::Interrupted { .. } => "interrupted",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}

/// Transient per-step output, drained by the streaming driver after each
/// step and cleared on drain to avoid duplicate emission.
#[derive(Debug, Clone, Default)]
pub struct StreamBuffer {
    thinking: Vec<String>,
    text: String,
}

impl StreamBuffer {
    /// Record the thinking-process annotation for the current step.
    pub fn note_thinking(&mut self, tools: Vec<String>) {
        self.thinking = tools;
    }

    /// Append reply or summary text for the current step.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(text);
    }

    /// Take the buffered fragments in emission order: thinking annotation
    /// first, then reply/summary text. Empty fragments are skipped. The
    /// buffer is cleared.
    pub fn drain(&mut self) -> Vec<StreamFragment> {
        let mut fragments = Vec::with_capacity(2);
        if !self.thinking.is_empty() {
            fragments.push(StreamFragment::Thinking {
                tools: std::mem::take(&mut self.thinking),
            });
        }
        if !self.text.is_empty() {
            fragments.push(StreamFragment::Content {
                content: std::mem::take(&mut self.text),
            });
        }
        fragments
    }

    pub fn clear(&mut self) {
        self.thinking.clear();
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.thinking.is_empty() && self.text.is_empty()
    }
}

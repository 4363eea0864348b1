//! The ReAgent execution engine — the heart of the runtime.
//!
//! An agent run follows a **bounded, observable, interruptible** loop:
//!
//! 1. **Start** from `Idle` with a non-blank user prompt
//! 2. **Think**: the reasoning backend decides whether an action is needed
//! 3. **Act**: if a tool batch was proposed, execute it and fold the
//!    results into the conversation
//! 4. **Repeat** until the termination tool fires, the step bound is
//!    reached, or the run is interrupted
//! 5. **Cleanup** unconditionally restores `Idle`
//!
//! The blocking entry point collects step results into one string; the
//! streaming entry point emits fragments on a channel after every step.

pub mod executor;
pub mod react;
pub mod registry;
pub mod stream;

pub use executor::{AgentExecutor, RunState};
pub use react::{ReactStep, ThinkOutcome, ToolCallStep};
pub use registry::SessionRegistry;
pub use stream::{StreamBuffer, StreamFragment};

#[cfg(test)]
pub(crate) mod test_helpers;

//! The lifecycle state machine and streaming driver.
//!
//! An [`AgentExecutor`] owns one conversation and drives the ReAct step
//! loop through `Idle → Running → {Finished, Error}`, with cleanup always
//! restoring `Idle`. The blocking entry point runs on the caller's task;
//! the streaming entry point runs the same machine on a spawned task and
//! returns a live output channel immediately.
//!
//! Single-writer discipline: all mutable run state sits behind one
//! `tokio::sync::Mutex`, taken with `try_lock` at run entry, so exactly one
//! loop may mutate a given executor at a time. The `interrupted` flag is
//! the single sanctioned cross-task write.

use reagent_core::error::{AgentError, StepError};
use reagent_core::message::{Conversation, Message};
use reagent_core::state::AgentState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

use crate::react::ReactStep;
use crate::stream::{StreamBuffer, StreamFragment};

/// Mutable state of one run, exclusively owned by the executing loop.
#[derive(Default)]
pub struct RunState {
    /// Lifecycle state.
    pub state: AgentState,

    /// Loop iteration counter; 0 when idle, never exceeds `max_steps`.
    pub current_step: u32,

    /// The conversation log.
    pub conversation: Conversation,

    /// Assistant message carrying the tool batch proposed by the last
    /// think phase; present only until the immediately following act.
    pub pending_action: Option<Message>,

    /// Per-step output drained by the streaming driver.
    pub buffer: StreamBuffer,
}

impl RunState {
    fn reset(&mut self) {
        self.state = AgentState::Idle;
        self.current_step = 0;
        self.conversation.clear();
        self.pending_action = None;
        self.buffer.clear();
    }
}

/// Drives a [`ReactStep`] through a bounded, observable, interruptible loop.
pub struct AgentExecutor {
    name: String,
    max_steps: u32,
    step: Arc<dyn ReactStep>,
    run_state: Mutex<RunState>,
    interrupted: AtomicBool,
}

impl AgentExecutor {
    /// Create an executor with the default step bound.
    pub fn new(name: impl Into<String>, step: Arc<dyn ReactStep>) -> Self {
        Self {
            name: name.into(),
            max_steps: 10,
            step,
            run_state: Mutex::new(RunState::default()),
            interrupted: AtomicBool::new(false),
        }
    }

    /// Set the maximum number of loop iterations per run.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Current lifecycle state. Reports `Running` while a loop holds the
    /// run state.
    pub fn state(&self) -> AgentState {
        match self.run_state.try_lock() {
            Ok(run) => run.state,
            Err(_) => AgentState::Running,
        }
    }

    /// Request cooperative interruption. Advisory: the flag is polled at
    /// step boundaries only; an in-flight backend call is never aborted.
    pub fn interrupt(&self) {
        info!(agent = %self.name, "interrupt requested");
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Restore the executor to `Idle`: clear the interrupt flag, the step
    /// counter, the conversation, and any pending proposal. Idempotent.
    pub async fn reset(&self) {
        let mut run = self.run_state.lock().await;
        Self::cleanup(&mut run, &self.interrupted);
    }

    fn cleanup(run: &mut RunState, interrupted: &AtomicBool) {
        interrupted.store(false, Ordering::SeqCst);
        run.reset();
        debug!("agent cleanup completed");
    }

    /// Run the loop to completion, blocking the caller's task.
    ///
    /// Fails fast with [`AgentError`] if the executor is not `Idle` or the
    /// prompt is blank, without mutating conversation or state. Failures
    /// inside the loop are recorded as the call's result rather than
    /// returned as errors; cleanup runs on every exit path.
    pub async fn run(&self, user_prompt: &str) -> Result<String, AgentError> {
        let mut run = self
            .run_state
            .try_lock()
            .map_err(|_| AgentError::InvalidState {
                state: AgentState::Running,
            })?;

        if run.state != AgentState::Idle {
            return Err(AgentError::InvalidState { state: run.state });
        }
        if user_prompt.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }

        run.conversation.push(Message::user(user_prompt));
        run.state = AgentState::Running;
        run.current_step = 0;

        let mut results: Vec<String> = Vec::new();
        let mut failure: Option<StepError> = None;

        while run.current_step < self.max_steps && run.state != AgentState::Finished {
            run.current_step += 1;
            let n = run.current_step;
            info!(agent = %self.name, step = n, max = self.max_steps, "executing step");

            match self.step.step(&mut run).await {
                Ok(text) => results.push(format!("Step {n}: {text}")),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }

            // The blocking path has no channel to drain into.
            run.buffer.clear();
        }

        let outcome = match failure {
            Some(e) => {
                error!(agent = %self.name, error = %e, "error running agent");
                run.state = AgentState::Error;
                format!("Error running agent: {e}")
            }
            None => {
                if run.current_step >= self.max_steps && run.state == AgentState::Running {
                    run.state = AgentState::Finished;
                    results.push(format!("Terminated: reached max steps ({})", self.max_steps));
                }
                results.join("\n")
            }
        };

        Self::cleanup(&mut run, &self.interrupted);
        Ok(outcome)
    }

    /// Run the loop on a spawned task, returning the output channel
    /// immediately.
    ///
    /// A non-`Idle` executor is reset before starting — streamed runs
    /// always begin from a clean state. Blank input produces a single
    /// error fragment and a closed channel without starting the loop.
    /// Cleanup sits on the task's single exit path, so transport timeout,
    /// receiver drop, and normal completion all trigger it exactly once.
    pub fn run_stream(self: &Arc<Self>, user_prompt: &str) -> mpsc::Receiver<StreamFragment> {
        // An interrupt delivered while Idle targets no run; clear it here,
        // before the task spawns, so it cannot stop the new run at step 0.
        // Interrupts arriving after this point target the new run, and one
        // aimed at a loop currently holding the lock is left in place.
        if let Ok(run) = self.run_state.try_lock() {
            if run.state == AgentState::Idle {
                self.interrupted.store(false, Ordering::SeqCst);
            }
        }

        let (tx, rx) = mpsc::channel::<StreamFragment>(128);
        let agent = Arc::clone(self);
        let prompt = user_prompt.to_string();

        tokio::spawn(async move {
            let Ok(mut run) = agent.run_state.try_lock() else {
                let _ = tx
                    .send(StreamFragment::Error {
                        message: "agent is already running".into(),
                    })
                    .await;
                return;
            };

            if run.state != AgentState::Idle {
                warn!(agent = %agent.name, state = %run.state, "not idle, resetting before streamed run");
                Self::cleanup(&mut run, &agent.interrupted);
            }

            if prompt.trim().is_empty() {
                let _ = tx
                    .send(StreamFragment::Error {
                        message: "cannot run agent with an empty user prompt".into(),
                    })
                    .await;
                return;
            }

            run.conversation.push(Message::user(&prompt));
            run.state = AgentState::Running;
            run.current_step = 0;

            let mut failure: Option<StepError> = None;

            while run.current_step < agent.max_steps && run.state != AgentState::Finished {
                if agent.interrupted.load(Ordering::SeqCst) {
                    info!(agent = %agent.name, step = run.current_step, "run interrupted");
                    run.state = AgentState::Finished;
                    let _ = tx
                        .send(StreamFragment::Interrupted {
                            message: "run interrupted by user".into(),
                        })
                        .await;
                    break;
                }

                // Receiver gone (client disconnect or transport timeout):
                // stop starting iterations, still run cleanup below.
                if tx.is_closed() {
                    warn!(agent = %agent.name, "output channel closed, stopping run");
                    run.state = AgentState::Finished;
                    break;
                }

                run.current_step += 1;
                info!(agent = %agent.name, step = run.current_step, max = agent.max_steps, "executing step");

                match agent.step.step(&mut run).await {
                    Ok(_) => {
                        for fragment in run.buffer.drain() {
                            let _ = tx.send(fragment).await;
                        }
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            match failure {
                Some(e) => {
                    error!(agent = %agent.name, error = %e, "error running agent");
                    run.state = AgentState::Error;
                    let _ = tx
                        .send(StreamFragment::Error {
                            message: format!("Error running agent: {e}"),
                        })
                        .await;
                }
                None => {
                    if run.current_step >= agent.max_steps && run.state == AgentState::Running {
                        run.state = AgentState::Finished;
                        let _ = tx
                            .send(StreamFragment::Content {
                                content: format!(
                                    "Terminated: reached max steps ({})",
                                    agent.max_steps
                                ),
                            })
                            .await;
                    }
                    let _ = tx
                        .send(StreamFragment::Done {
                            steps: run.current_step,
                        })
                        .await;
                }
            }

            Self::cleanup(&mut run, &agent.interrupted);
        });

        rx
    }
}

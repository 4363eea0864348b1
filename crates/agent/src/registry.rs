//! Session registry — routes out-of-band interrupt requests.
//!
//! Each logical session owns a dedicated [`AgentExecutor`]; the registry
//! maps session identifiers to their executor so the serving layer can
//! deliver an interrupt to the right instance. It is owned by whoever
//! serves the sessions and injected where needed, never a process-wide
//! singleton.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::executor::AgentExecutor;

/// A concurrent map from session id to its executor.
#[derive(Default)]
pub struct SessionRegistry {
    agents: RwLock<HashMap<String, Arc<AgentExecutor>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor for a session, replacing any previous entry.
    pub async fn insert(&self, session_id: impl Into<String>, agent: Arc<AgentExecutor>) {
        let session_id = session_id.into();
        debug!(session = %session_id, "registering agent session");
        self.agents.write().await.insert(session_id, agent);
    }

    /// Look up the executor for a session.
    pub async fn get(&self, session_id: &str) -> Option<Arc<AgentExecutor>> {
        self.agents.read().await.get(session_id).cloned()
    }

    /// Remove a session's executor.
    pub async fn remove(&self, session_id: &str) -> Option<Arc<AgentExecutor>> {
        debug!(session = %session_id, "removing agent session");
        self.agents.write().await.remove(session_id)
    }

    /// Route an interrupt to a session. Returns false for unknown sessions.
    pub async fn interrupt(&self, session_id: &str) -> bool {
        match self.get(session_id).await {
            Some(agent) => {
                agent.interrupt();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}

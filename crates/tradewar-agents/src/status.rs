//! Shared read model of agent status and learning metrics.
//!
//! Agents write here at round boundaries; the snapshot publisher reads it.
//! This keeps every [`AgentContext`](crate::AgentContext) private to its
//! agent while still letting the dashboard see who is working.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tradewar_types::AgentStatus;

use crate::policy::LearningSignal;

#[derive(Debug, Default)]
struct Board {
    statuses: BTreeMap<String, AgentStatus>,
    learning: Option<LearningSignal>,
}

/// Cloneable handle to the status board.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<Board>>,
}

impl StatusBoard {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent as idle.
    pub fn register(&self, name: &str) {
        self.set_status(name, AgentStatus::Idle);
    }

    /// Record an agent's status.
    pub fn set_status(&self, name: &str, status: AgentStatus) {
        let mut board = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        board.statuses.insert(name.to_owned(), status);
    }

    /// Record the learning agent's latest metrics.
    pub fn report_learning(&self, signal: LearningSignal) {
        let mut board = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        board.learning = Some(signal);
    }

    /// Status of every registered agent.
    pub fn statuses(&self) -> BTreeMap<String, AgentStatus> {
        let board = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        board.statuses.clone()
    }

    /// The latest learning metrics, if any were reported.
    pub fn learning(&self) -> Option<LearningSignal> {
        let board = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        board.learning
    }
}

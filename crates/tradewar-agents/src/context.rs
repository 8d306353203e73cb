//! Per-agent mutable state.
//!
//! An [`AgentContext`] is owned by exactly one agent loop. Other tasks learn
//! about an agent's status through the [`StatusBoard`](crate::StatusBoard),
//! never through the context itself.

use std::collections::VecDeque;

use tradewar_types::{AgentStatus, Event, MemoryEntry};

/// Received-event summaries kept per agent.
pub const DEFAULT_MEMORY_CAPACITY: usize = 12;

/// Identity, status, last action, and a bounded memory of received events.
#[derive(Debug, Clone)]
pub struct AgentContext {
    name: String,
    status: AgentStatus,
    last_action: Option<String>,
    memory: VecDeque<MemoryEntry>,
    memory_capacity: usize,
}

impl AgentContext {
    /// A fresh, idle context with an empty memory.
    pub fn new(name: impl Into<String>, memory_capacity: usize) -> Self {
        Self {
            name: name.into(),
            status: AgentStatus::Idle,
            last_action: None,
            memory: VecDeque::with_capacity(memory_capacity),
            memory_capacity,
        }
    }

    /// The agent's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status.
    pub const fn status(&self) -> AgentStatus {
        self.status
    }

    /// Set the current status.
    pub const fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
    }

    /// The action chosen in the previous round, if any.
    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    /// Record `action` as this round's action.
    ///
    /// Returns `true` when it repeats the previous round's action.
    pub fn record_action(&mut self, action: &str) -> bool {
        let repeated = self.last_action.as_deref() == Some(action);
        if !repeated {
            self.last_action = Some(action.to_owned());
        }
        repeated
    }

    /// Fold a received event into memory, evicting the oldest beyond capacity.
    pub fn remember(&mut self, event: &Event) {
        self.memory.push_back(event.summary());
        while self.memory.len() > self.memory_capacity {
            self.memory.pop_front();
        }
    }

    /// Every remembered entry, oldest first.
    pub const fn memory(&self) -> &VecDeque<MemoryEntry> {
        &self.memory
    }

    /// The newest `n` entries, oldest first.
    pub fn recent_memory(&self, n: usize) -> impl Iterator<Item = &MemoryEntry> {
        self.memory.iter().skip(self.memory.len().saturating_sub(n))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tradewar_types::{Payload, Topic};

    use super::*;

    fn event(n: usize) -> Event {
        Event::new("Source", Topic::Policy, format!("event {n}"), "", Payload::new())
    }

    #[test]
    fn thirteenth_event_evicts_the_oldest() {
        let mut ctx = AgentContext::new("Agent", DEFAULT_MEMORY_CAPACITY);
        for n in 1..=13 {
            ctx.remember(&event(n));
        }
        assert_eq!(ctx.memory().len(), 12);
        let titles: Vec<&str> = ctx.memory().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles.first().copied(), Some("event 2"));
        assert_eq!(titles.last().copied(), Some("event 13"));
        assert!(!titles.contains(&"event 1"));
    }

    #[test]
    fn recent_memory_returns_newest_in_receipt_order() {
        let mut ctx = AgentContext::new("Agent", 12);
        for n in 1..=5 {
            ctx.remember(&event(n));
        }
        let titles: Vec<&str> = ctx.recent_memory(3).map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["event 3", "event 4", "event 5"]);
        assert_eq!(ctx.recent_memory(50).count(), 5);
    }

    #[test]
    fn repeated_action_is_reported() {
        let mut ctx = AgentContext::new("Agent", 12);
        assert!(!ctx.record_action("tariff_increase"));
        assert!(ctx.record_action("tariff_increase"));
        assert!(!ctx.record_action("partial_rollback"));
        assert_eq!(ctx.last_action(), Some("partial_rollback"));
    }
}

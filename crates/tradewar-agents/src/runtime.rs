//! The sense, reason, act loop shared by every agent kind.
//!
//! One [`Agent`] is one independently scheduled task. Each iteration:
//!
//! 1. drain every owned mailbox into memory (skipped by the scenario agent);
//! 2. build the observation from memory and the world;
//! 3. reason under a hard deadline, falling back to the heuristic on expiry;
//! 4. turn tool results and memo into events, possibly mutating the world;
//! 5. publish the internal memo, then the action events in order;
//! 6. sleep for the kind's idle delay.
//!
//! A failed or panicking round is logged and the loop carries on.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::json;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use tradewar_core::{EventBus, Mailbox};
use tradewar_runner::ReasoningAdapter;
use tradewar_types::{AgentStatus, Event, ReasoningResult, Topic, payload_from};
use tradewar_world::SharedWorld;

use crate::context::AgentContext;
use crate::error::AgentError;
use crate::policy::AgentKind;
use crate::status::StatusBoard;
use crate::tools::AgentToolbox;

/// Thought recorded when the provider fails outright.
pub const PROVIDER_FAILURE_THOUGHT: &str = "Reasoning provider unavailable; holding position.";

/// Title of the per-round thought event.
pub const THOUGHT_TITLE: &str = "Internal memo";

/// Handles every agent shares.
#[derive(Clone)]
pub struct AgentDeps {
    /// The shared world.
    pub world: SharedWorld,
    /// The event bus.
    pub bus: EventBus,
    /// The process-wide reasoning adapter.
    pub adapter: Arc<ReasoningAdapter>,
    /// Status read model for the publisher.
    pub board: StatusBoard,
}

/// Per-agent loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    /// Hard bound on one reasoning call.
    pub decision_timeout: Duration,
    /// Sleep between rounds.
    pub idle: Duration,
    /// Memory entries kept.
    pub memory_capacity: usize,
    /// Bus events scanned by `detect_policy_changes`.
    pub tool_history_limit: usize,
}

/// One running agent.
pub struct Agent {
    context: AgentContext,
    kind: AgentKind,
    mailboxes: Vec<Mailbox>,
    toolbox: AgentToolbox,
    deps: AgentDeps,
    decision_timeout: Duration,
    idle: Duration,
}

impl Agent {
    /// Create an agent and subscribe it to its kind's topics.
    pub fn new(
        name: impl Into<String>,
        kind: AgentKind,
        deps: AgentDeps,
        settings: AgentSettings,
    ) -> Self {
        let context = AgentContext::new(name, settings.memory_capacity);
        let mailboxes = kind.topics().iter().map(|t| deps.bus.subscribe(*t)).collect();
        let toolbox = AgentToolbox::new(
            kind.declared_tools().to_vec(),
            deps.world.clone(),
            deps.bus.clone(),
            settings.tool_history_limit,
        );
        deps.board.register(context.name());
        if let Some(signal) = kind.learning() {
            deps.board.report_learning(signal);
        }
        Self {
            context,
            kind,
            mailboxes,
            toolbox,
            deps,
            decision_timeout: settings.decision_timeout,
            idle: settings.idle,
        }
    }

    /// The agent's name.
    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// The agent's private context.
    pub const fn context(&self) -> &AgentContext {
        &self.context
    }

    /// The agent's kind and policy state.
    pub const fn kind(&self) -> &AgentKind {
        &self.kind
    }

    /// Fold every pending mailbox event into memory. Never waits.
    ///
    /// Returns how many events were drained.
    pub fn drain_inbox(&mut self) -> usize {
        let mut drained = 0_usize;
        for mailbox in &self.mailboxes {
            for event in mailbox.drain() {
                self.context.remember(&event);
                drained = drained.saturating_add(1);
            }
        }
        drained
    }

    /// The current observation string.
    pub fn observe(&self) -> String {
        self.deps.world.read(|w| self.kind.observe(&self.context, w))
    }

    /// Run one observe, reason, act, publish round.
    ///
    /// Returns the events published, in order.
    pub async fn run_round(&mut self) -> Result<Vec<Event>, AgentError> {
        self.set_status(AgentStatus::Working);
        let outcome = self.round_inner().await;
        self.set_status(AgentStatus::Idle);
        if let Some(signal) = self.kind.learning() {
            self.deps.board.report_learning(signal);
        }
        outcome
    }

    async fn round_inner(&mut self) -> Result<Vec<Event>, AgentError> {
        let observation = self.observe();
        let tools = self.kind.declared_tools();
        let result = self.reason(&observation).await;

        let results = self.toolbox.take_results();
        let thought = Event::new(
            self.context.name(),
            Topic::Thought,
            THOUGHT_TITLE,
            result.thoughts.join(" | "),
            payload_from(json!({
                "mode": result.mode,
                "tools": tools,
                "tool_calls": result.tool_calls,
            })),
        );

        // The memo goes out even when the policy step fails.
        self.deps.bus.publish(thought.clone());

        let actions = self
            .kind
            .advance(&mut self.context, &self.deps.world, &results, result.memo)?;

        let mut published = Vec::with_capacity(actions.len().saturating_add(1));
        published.push(thought);
        for event in actions {
            self.deps.bus.publish(event.clone());
            published.push(event);
        }

        debug!(
            agent = self.context.name(),
            mode = result.mode.as_str(),
            tool_results = results.len(),
            published = published.len(),
            "round complete"
        );
        Ok(published)
    }

    /// Reason under the deadline. Never fails.
    async fn reason(&mut self, observation: &str) -> ReasoningResult {
        let tools = self.kind.declared_tools();
        let name = self.context.name();
        debug!(agent = name, strategy = self.deps.adapter.strategy_name(), "round started");

        let call = self
            .deps
            .adapter
            .reason(name, observation, tools, &mut self.toolbox);
        match timeout(self.decision_timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(agent = name, error = %e, "reasoning failed, holding position");
                ReasoningResult::hold(self.deps.adapter.mode(), PROVIDER_FAILURE_THOUGHT, Vec::new())
            }
            Err(_) => {
                warn!(
                    agent = name,
                    timeout_ms = self.decision_timeout.as_millis(),
                    "reasoning deadline exceeded, using heuristic"
                );
                ReasoningAdapter::heuristic(observation, tools)
            }
        }
    }

    fn set_status(&mut self, status: AgentStatus) {
        self.context.set_status(status);
        self.deps.board.set_status(self.context.name(), status);
    }

    /// Run rounds forever.
    pub async fn run(mut self) {
        info!(
            agent = self.context.name(),
            tools = ?self.kind.declared_tools(),
            mailboxes = self.mailboxes.len(),
            idle_ms = self.idle.as_millis(),
            "agent loop started"
        );
        loop {
            self.drain_inbox();
            match AssertUnwindSafe(self.run_round()).catch_unwind().await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(agent = self.context.name(), error = %e, "round failed"),
                Err(_) => {
                    error!(agent = self.context.name(), "round panicked, continuing");
                    self.set_status(AgentStatus::Idle);
                }
            }
            sleep(self.idle).await;
        }
    }
}

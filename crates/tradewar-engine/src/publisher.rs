//! The snapshot publisher.
//!
//! Once per period it derives the denormalized `state` document from bus
//! history, the world, and the status board, writes `state` and `events`
//! through the [`SnapshotStore`], and pushes the document to the observer.
//! It never mutates the world or the bus.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use tradewar_agents::StatusBoard;
use tradewar_agents::policy::analysts::CLASSIFICATION;
use tradewar_core::EventBus;
use tradewar_core::config::SimulationBounds;
use tradewar_db::{EVENTS_KEY, STATE_KEY, SnapshotStore};
use tradewar_observer::AppState;
use tradewar_types::{
    Event, LearningMetrics, StateDocument, SystemHealth, TimelineEntry, Topic,
};
use tradewar_world::{SharedWorld, WorldState};

/// Phase reported before the scenario agent has announced one.
pub const DEFAULT_PHASE: &str = "Cold Start";

/// Round reported before the scenario agent has announced one.
pub const DEFAULT_ROUND: u64 = 1;

/// Learning note when the smoothed welfare delta is positive.
pub const IMPROVING_NOTE: &str = "Policy effectiveness improving over simulations";

/// Learning note otherwise.
pub const DETERIORATING_NOTE: &str =
    "Policy effectiveness deteriorating; de-escalation bias increased.";

const TIMELINE_TOPICS: [Topic; 3] = [Topic::Scenario, Topic::Policy, Topic::Negotiation];

/// Everything the publisher reads from or writes to.
#[derive(Clone)]
pub struct Publisher {
    /// The shared world, read only.
    pub world: SharedWorld,
    /// The bus, read only.
    pub bus: EventBus,
    /// Agent status read model.
    pub board: StatusBoard,
    /// Persistence boundary.
    pub store: SnapshotStore,
    /// Observer push target.
    pub observer: Arc<AppState>,
    /// Event and timeline windows.
    pub bounds: SimulationBounds,
}

impl Publisher {
    /// Assemble the current `state` document.
    pub fn snapshot(&self) -> StateDocument {
        self.world.read(|w| {
            let backend = self.store.backend_name();
            build_state_document(&self.bus, w, &self.board, backend, &self.bounds)
        })
    }

    /// Build, write, and push one document.
    ///
    /// A failed write is logged; the observer still receives the document.
    pub async fn publish_once(&self) {
        let document = self.snapshot();
        let state_write = self.store.write(STATE_KEY, &document).await;
        let events_write = self.store.write(EVENTS_KEY, &document.events).await;
        match (state_write, events_write) {
            (Ok(()), Ok(())) => debug!(
                backend = self.store.backend_name(),
                phase = %document.phase,
                round = document.round,
                events = document.events.len(),
                "snapshot written"
            ),
            (Err(e), _) | (_, Err(e)) => warn!(
                backend = self.store.backend_name(),
                error = %e,
                "snapshot write failed"
            ),
        }
        let receivers = self.observer.publish(document).await;
        debug!(receivers, "snapshot pushed to observer");
    }

    /// Publish forever, once per `interval`.
    pub async fn run(self, interval: Duration) {
        info!(
            backend = self.store.backend_name(),
            interval_ms = interval.as_millis(),
            "snapshot publisher started"
        );
        loop {
            self.publish_once().await;
            sleep(interval).await;
        }
    }
}

/// Derive the denormalized `state` document.
///
/// Phase and round come from the newest scenario event, classification from
/// the newest strategy event, each within the recent-events window. Missing
/// fields fall back to the defaults.
pub fn build_state_document(
    bus: &EventBus,
    world: &WorldState,
    board: &StatusBoard,
    backend: &str,
    bounds: &SimulationBounds,
) -> StateDocument {
    let events = bus.recent(bounds.recent_events_limit);

    let phase = latest_field(&events, Topic::Scenario, "phase")
        .and_then(Value::as_str)
        .map_or_else(|| DEFAULT_PHASE.to_owned(), str::to_owned);
    let round = latest_field(&events, Topic::Scenario, "round")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_ROUND);
    let classification = latest_field(&events, Topic::Strategy, "classification")
        .and_then(Value::as_str)
        .map_or_else(|| CLASSIFICATION.to_owned(), str::to_owned);

    let learning = board.learning().map_or_else(
        || learning_metrics(0.0, 0.0),
        |signal| learning_metrics(signal.aggression, signal.effectiveness_score),
    );

    StateDocument {
        timestamp: Utc::now(),
        phase,
        round,
        classification,
        learning,
        countries: world.country_views(),
        trade_flow: world.trade_flow().clone(),
        welfare_impact: world.compute_welfare(),
        policy_timeline: policy_timeline(
            &bus.recent(bounds.timeline_window),
            bounds.timeline_limit,
        ),
        events,
        agent_status: board.statuses(),
        system_health: SystemHealth {
            backend: backend.to_owned(),
        },
    }
}

/// `key` of the newest event on `topic`.
fn latest_field<'a>(events: &'a [Event], topic: Topic, key: &str) -> Option<&'a Value> {
    events
        .iter()
        .rev()
        .find(|e| e.topic() == topic)
        .and_then(|e| e.field(key))
}

fn learning_metrics(alpha_aggression: f64, effectiveness_score: f64) -> LearningMetrics {
    let note = if effectiveness_score > 0.0 {
        IMPROVING_NOTE
    } else {
        DETERIORATING_NOTE
    };
    LearningMetrics {
        alpha_aggression,
        effectiveness_score,
        note: note.to_owned(),
    }
}

/// Scenario, policy, and negotiation milestones; the newest `limit` of them.
fn policy_timeline(window: &[Event], limit: usize) -> Vec<TimelineEntry> {
    let entries: Vec<TimelineEntry> = window
        .iter()
        .filter(|e| TIMELINE_TOPICS.contains(&e.topic()))
        .map(|e| TimelineEntry {
            timestamp: e.timestamp(),
            label: e.title().to_owned(),
        })
        .collect();
    let skip = entries.len().saturating_sub(limit);
    entries.into_iter().skip(skip).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;
    use tradewar_agents::LearningSignal;
    use tradewar_core::config::SimulationConfig;
    use tradewar_types::{AgentStatus, Payload, Sector, payload_from};
    use tradewar_world::{ALPHA, build_world};

    use super::*;

    fn bounds() -> SimulationBounds {
        SimulationConfig::parse("").unwrap().simulation
    }

    fn event(topic: Topic, title: &str, payload: serde_json::Value) -> Event {
        Event::new("Scenario Execution Agent", topic, title, "", payload_from(payload))
    }

    #[test]
    fn empty_bus_yields_defaults() {
        let doc = build_state_document(
            &EventBus::default(),
            &build_world(),
            &StatusBoard::new(),
            "file",
            &bounds(),
        );
        assert_eq!(doc.phase, DEFAULT_PHASE);
        assert_eq!(doc.round, DEFAULT_ROUND);
        assert_eq!(doc.classification, "Repeated Game");
        assert_eq!(doc.learning.note, DETERIORATING_NOTE);
        assert!(doc.events.is_empty());
        assert!(doc.policy_timeline.is_empty());
        assert_eq!(doc.system_health.backend, "file");
        assert_eq!(doc.countries.len(), 3);
        let alpha = &doc.countries[ALPHA];
        assert!((alpha.tariffs[&Sector::Electronics] - 0.08).abs() < 1e-9);
    }

    #[test]
    fn phase_round_and_classification_come_from_newest_events() {
        let bus = EventBus::default();
        let phase = |name: &str, round: u64| json!({"phase": name, "round": round});
        bus.publish(event(Topic::Scenario, "Phase update", phase("Cold Start", 1)));
        bus.publish(event(
            Topic::Strategy,
            "Strategic classification",
            json!({"classification": "Prisoner's Dilemma"}),
        ));
        bus.publish(event(Topic::Scenario, "Phase update", phase("Escalation", 3)));
        bus.publish(event(Topic::Thought, "Internal memo", json!({"phase": "ignored"})));

        let board = StatusBoard::new();
        let doc = build_state_document(&bus, &build_world(), &board, "redis", &bounds());
        assert_eq!(doc.phase, "Escalation");
        assert_eq!(doc.round, 3);
        assert_eq!(doc.classification, "Prisoner's Dilemma");
        assert_eq!(doc.events.len(), 4);
        assert_eq!(doc.events[3].title(), "Internal memo");
    }

    #[test]
    fn timeline_keeps_milestone_topics_newest_twelve() {
        let bus = EventBus::default();
        for n in 0..15 {
            bus.publish(event(Topic::Policy, &format!("policy {n}"), json!({})));
        }
        bus.publish(event(Topic::Market, "Sector exposure update", json!({})));
        bus.publish(event(Topic::Thought, "Internal memo", json!({})));

        let board = StatusBoard::new();
        let doc = build_state_document(&bus, &build_world(), &board, "file", &bounds());
        let labels: Vec<&str> = doc.policy_timeline.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0], "policy 3");
        assert_eq!(labels[11], "policy 14");
    }

    #[test]
    fn learning_and_status_come_from_the_board() {
        let board = StatusBoard::new();
        board.register("Country Strategy Agent (Alpha)");
        board.set_status("Market Intelligence Agent", AgentStatus::Working);
        board.report_learning(LearningSignal {
            aggression: 0.58,
            effectiveness_score: 0.4,
        });

        let bus = EventBus::default();
        let doc = build_state_document(&bus, &build_world(), &board, "file", &bounds());
        assert!((doc.learning.alpha_aggression - 0.58).abs() < 1e-9);
        assert_eq!(doc.learning.note, IMPROVING_NOTE);
        assert_eq!(doc.agent_status.len(), 2);
        assert_eq!(doc.agent_status["Market Intelligence Agent"], AgentStatus::Working);
    }

    #[test]
    fn building_a_snapshot_leaves_the_world_untouched() {
        let world = build_world();
        let before = world.clone();
        let bus = EventBus::default();
        bus.publish(Event::new("X", Topic::Policy, "p", "", Payload::new()));
        let _ = build_state_document(&bus, &world, &StatusBoard::new(), "file", &bounds());
        assert_eq!(world, before);
        assert_eq!(bus.history_len(), 1);
    }

    #[tokio::test]
    async fn publish_once_writes_both_documents_and_pushes() {
        let dir = std::env::temp_dir()
            .join(format!("tradewar-publisher-{}", std::process::id()));
        let observer = Arc::new(AppState::new());
        let publisher = Publisher {
            world: SharedWorld::new(build_world()),
            bus: EventBus::default(),
            board: StatusBoard::new(),
            store: SnapshotStore::file(&dir).await.unwrap(),
            observer: Arc::clone(&observer),
            bounds: bounds(),
        };
        publisher.bus.publish(event(
            Topic::Scenario,
            "Phase update",
            json!({"phase": "Initial Shock", "round": 1}),
        ));

        publisher.publish_once().await;

        let state: serde_json::Value = publisher.store.read(STATE_KEY).await.unwrap().unwrap();
        assert_eq!(state["phase"], "Initial Shock");
        let events: Vec<serde_json::Value> =
            publisher.store.read(EVENTS_KEY).await.unwrap().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(observer.latest().await.unwrap().phase, "Initial Shock");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

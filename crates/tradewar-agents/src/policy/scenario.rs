//! Scenario execution: a fixed cycle of six phases.

use serde_json::json;
use tradewar_types::{Event, ToolName, Topic, payload_from};

use crate::tools::ToolResults;

/// The phase cycle, in order.
pub const PHASES: [&str; 6] = [
    "Cold Start",
    "Initial Shock",
    "Escalation",
    "Strategic Adaptation",
    "Negotiation or Collapse",
    "Learning Update",
];

/// Phase index and round counter of the scenario agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioPolicy {
    phase_index: usize,
    round: u64,
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioPolicy {
    /// Start at the first phase of round one.
    pub const fn new() -> Self {
        Self {
            phase_index: 0,
            round: 1,
        }
    }

    /// Name of the current phase.
    pub fn phase(&self) -> &'static str {
        PHASES.get(self.phase_index).copied().unwrap_or(PHASES[0])
    }

    /// Current round, starting at one.
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// The observation fed to reasoning: phase and round only.
    pub fn observation(&self) -> String {
        format!("Phase {} | round {}", self.phase(), self.round)
    }

    /// Announce the current phase, then move to the next one.
    ///
    /// The round counter increments when the cycle wraps.
    pub fn advance(&mut self, source: &str, results: &ToolResults) -> Event {
        let event = Event::new(
            source,
            Topic::Scenario,
            "Phase update",
            "Phase transition executed; monitoring welfare deltas and escalation thresholds.",
            payload_from(json!({
                "round": self.round,
                "phase": self.phase(),
                "welfare": results.json(ToolName::GenerateWelfareReport),
                "equilibrium": results.equilibrium().unwrap_or(false),
            })),
        );
        let next = self.phase_index.saturating_add(1);
        if next < PHASES.len() {
            self.phase_index = next;
        } else {
            self.phase_index = 0;
            self.round = self.round.saturating_add(1);
        }
        event
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_six_phases_and_counts_rounds() {
        let mut scenario = ScenarioPolicy::new();
        assert_eq!(scenario.observation(), "Phase Cold Start | round 1");

        let phases: Vec<String> = (0..7)
            .map(|_| {
                let event = scenario.advance("Scenario Execution Agent", &ToolResults::default());
                event.field("phase").unwrap().as_str().unwrap().to_owned()
            })
            .collect();
        assert_eq!(phases.first().map(String::as_str), Some("Cold Start"));
        assert_eq!(phases.get(5).map(String::as_str), Some("Learning Update"));
        assert_eq!(phases.get(6).map(String::as_str), Some("Cold Start"));
        assert_eq!(scenario.round(), 2);
        assert_eq!(scenario.phase(), "Initial Shock");
    }

    #[test]
    fn phase_event_defaults_missing_results() {
        let mut scenario = ScenarioPolicy::new();
        let event = scenario.advance("S", &ToolResults::default());
        assert_eq!(event.topic(), Topic::Scenario);
        assert_eq!(event.field("equilibrium").unwrap(), false);
        assert_eq!(event.field("round").unwrap(), 1);
    }
}

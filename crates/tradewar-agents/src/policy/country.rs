//! Country strategy: electronics tariff escalation and rollback.
//!
//! Each round the agent either raises its electronics tariff or, when the
//! assessed retaliation risk is high, rolls it back. The learning variant
//! also tracks how its welfare responds and tunes its aggression.

use serde_json::json;
use tradewar_types::{Event, Sector, Topic, payload_from};
use tradewar_world::SharedWorld;
use tradewar_world::analysis::round_to;

use crate::context::AgentContext;
use crate::error::AgentError;
use crate::tools::ToolResults;

/// Risk assumed when no retaliation assessment was made this round.
pub const DEFAULT_RETALIATION_RISK: f64 = 0.5;

/// Above this risk the agent rolls back instead of escalating.
pub const ROLLBACK_RISK_THRESHOLD: f64 = 0.75;

/// Rollback step and floor.
pub const ROLLBACK_STEP: f64 = 0.02;
/// Rollback never goes below this rate.
pub const ROLLBACK_FLOOR: f64 = 0.05;

/// Escalation step when recent memos favour de-escalation.
pub const CAUTIOUS_INCREMENT: f64 = 0.02;
/// Escalation step otherwise.
pub const DEFAULT_INCREMENT: f64 = 0.03;
/// Escalation never goes above this rate.
pub const ESCALATION_CAP: f64 = 0.5;

/// Aggression bounds of the learning agent.
pub const AGGRESSION_MIN: f64 = 0.2;
/// Upper aggression bound.
pub const AGGRESSION_MAX: f64 = 0.85;

/// Memo suffix when the same action repeats.
pub const INERTIA_NOTE: &str = " Override executed to avoid policy inertia.";

/// Sector the country agents steer.
pub const POLICY_SECTOR: Sector = Sector::Electronics;

/// Action names published in policy payloads.
pub const PARTIAL_ROLLBACK: &str = "partial_rollback";
/// See [`PARTIAL_ROLLBACK`].
pub const TARIFF_INCREASE: &str = "tariff_increase";

/// Tunable state of one country strategy agent.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPolicy {
    country: String,
    learning: bool,
    aggression: f64,
    last_welfare: f64,
    effectiveness_score: f64,
}

impl CountryPolicy {
    /// A policy steering `country`. Learning agents start more aggressive.
    pub fn new(country: impl Into<String>, learning: bool) -> Self {
        Self {
            country: country.into(),
            learning,
            aggression: if learning { 0.55 } else { 0.45 },
            last_welfare: 100.0,
            effectiveness_score: 0.0,
        }
    }

    /// The steered country.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Whether this agent adapts its aggression.
    pub const fn is_learning(&self) -> bool {
        self.learning
    }

    /// Current aggression.
    pub const fn aggression(&self) -> f64 {
        self.aggression
    }

    /// Smoothed welfare delta.
    pub const fn effectiveness_score(&self) -> f64 {
        self.effectiveness_score
    }

    /// Choose and apply this round's tariff action.
    pub fn advance(
        &mut self,
        ctx: &mut AgentContext,
        world: &SharedWorld,
        results: &ToolResults,
        memo: String,
    ) -> Result<Vec<Event>, AgentError> {
        let risk = results.retaliation_risk().unwrap_or(DEFAULT_RETALIATION_RISK);
        let de_escalation_bias = ctx
            .recent_memory(5)
            .any(|entry| entry.memo.to_lowercase().contains("de-escalation"));

        let (action, outcome) = world.write(|w| {
            let current = w.country(&self.country)?.tariff(POLICY_SECTOR);
            let (action, target) = if risk > ROLLBACK_RISK_THRESHOLD {
                (PARTIAL_ROLLBACK, (current - ROLLBACK_STEP).max(ROLLBACK_FLOOR))
            } else {
                let increment = if de_escalation_bias {
                    CAUTIOUS_INCREMENT
                } else {
                    DEFAULT_INCREMENT
                };
                let raised = self.aggression.mul_add(0.02, current + increment);
                (TARIFF_INCREASE, raised.min(ESCALATION_CAP))
            };
            let applied = w.apply_tariff(&self.country, POLICY_SECTOR, target)?;
            let welfare = w.compute_welfare().get(&self.country).copied().unwrap_or(100.0);
            Ok::<_, AgentError>((action, (applied, welfare)))
        })?;
        let (rate, welfare) = outcome;

        let mut memo = memo;
        if ctx.record_action(action) {
            memo.push_str(INERTIA_NOTE);
        }

        if self.learning {
            self.learn(welfare);
        }

        let payload = payload_from(json!({
            "action": action,
            "sector": POLICY_SECTOR.as_str(),
            "rate": round_to(rate, 3),
            "aggression": round_to(self.aggression, 2),
            "effectiveness_score": round_to(self.effectiveness_score, 2),
        }));
        Ok(vec![Event::new(
            ctx.name(),
            Topic::Policy,
            format!("{} policy update", self.country),
            memo,
            payload,
        )])
    }

    /// Fold a welfare observation into the score and aggression.
    fn learn(&mut self, welfare: f64) {
        let delta = welfare - self.last_welfare;
        self.effectiveness_score = self.effectiveness_score.mul_add(0.7, delta * 0.3);
        self.aggression = if delta > 0.0 {
            (self.aggression + 0.03).min(AGGRESSION_MAX)
        } else {
            (self.aggression - 0.04).max(AGGRESSION_MIN)
        };
        self.last_welfare = welfare;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tradewar_types::{Payload, ToolName};
    use tradewar_world::analysis::retaliation_risk;
    use tradewar_world::{ALPHA, build_world};

    use super::*;
    use crate::tools::ToolOutput;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn risk(value: f64) -> ToolResults {
        let mut results = ToolResults::default();
        results.record(
            ToolName::AssessRetaliationRisk,
            ToolOutput::RetaliationRisk(retaliation_risk((value - 0.4) / 1.2)),
        );
        results
    }

    fn alpha_tariff(world: &SharedWorld) -> f64 {
        world.read(|w| w.country(ALPHA).unwrap().tariff(POLICY_SECTOR))
    }

    #[test]
    fn high_risk_rolls_back_by_two_points() {
        let world = SharedWorld::new(build_world());
        let mut ctx = AgentContext::new("Alpha agent", 12);
        let mut policy = CountryPolicy::new(ALPHA, false);

        let events = policy.advance(&mut ctx, &world, &risk(0.8), "memo".to_owned()).unwrap();
        assert!(close(alpha_tariff(&world), 0.06));
        let event = events.first().unwrap();
        assert_eq!(event.topic(), Topic::Policy);
        assert_eq!(event.title(), "Country Alpha policy update");
        assert_eq!(event.field("action").unwrap(), PARTIAL_ROLLBACK);
    }

    #[test]
    fn rollback_is_floored() {
        let world = SharedWorld::new(build_world());
        world.write(|w| w.apply_tariff(ALPHA, POLICY_SECTOR, 0.06)).unwrap();
        let mut ctx = AgentContext::new("Alpha agent", 12);
        let mut policy = CountryPolicy::new(ALPHA, false);
        policy.advance(&mut ctx, &world, &risk(0.9), String::new()).unwrap();
        assert!(close(alpha_tariff(&world), 0.05));
    }

    #[test]
    fn default_risk_escalates_with_aggression() {
        let world = SharedWorld::new(build_world());
        let mut ctx = AgentContext::new("Alpha agent", 12);
        let mut policy = CountryPolicy::new(ALPHA, false);
        policy
            .advance(&mut ctx, &world, &ToolResults::default(), String::new())
            .unwrap();
        // 0.08 + 0.03 + 0.45 * 0.02
        assert!(close(alpha_tariff(&world), 0.119));
    }

    #[test]
    fn de_escalation_memos_soften_escalation() {
        let world = SharedWorld::new(build_world());
        let mut ctx = AgentContext::new("Alpha agent", 12);
        ctx.remember(&Event::new(
            "Game Theory & Strategy Agent",
            Topic::Strategy,
            "Strategic classification",
            "Recommend calibrated de-escalation.",
            Payload::new(),
        ));
        let mut policy = CountryPolicy::new(ALPHA, false);
        policy
            .advance(&mut ctx, &world, &ToolResults::default(), String::new())
            .unwrap();
        assert!(close(alpha_tariff(&world), 0.109));
    }

    #[test]
    fn repeated_action_annotates_memo_but_still_acts() {
        let world = SharedWorld::new(build_world());
        let mut ctx = AgentContext::new("Alpha agent", 12);
        let mut policy = CountryPolicy::new(ALPHA, false);
        let first = policy.advance(&mut ctx, &world, &risk(0.9), "Hold.".to_owned()).unwrap();
        let second = policy.advance(&mut ctx, &world, &risk(0.9), "Hold.".to_owned()).unwrap();
        assert_eq!(first.first().unwrap().memo(), "Hold.");
        assert_eq!(
            second.first().unwrap().memo(),
            "Hold. Override executed to avoid policy inertia."
        );
        assert!(close(alpha_tariff(&world), 0.05));
    }

    #[test]
    fn learning_agent_smooths_score_and_bounds_aggression() {
        let world = SharedWorld::new(build_world());
        let mut ctx = AgentContext::new("Alpha agent", 12);
        let mut policy = CountryPolicy::new(ALPHA, true);
        assert!(close(policy.aggression(), 0.55));

        // Starting welfare is below 100, so the first delta is negative.
        policy
            .advance(&mut ctx, &world, &ToolResults::default(), String::new())
            .unwrap();
        assert!(close(policy.aggression(), 0.51));
        assert!(policy.effectiveness_score() < 0.0);

        for _ in 0..20 {
            policy
                .advance(&mut ctx, &world, &ToolResults::default(), String::new())
                .unwrap();
        }
        assert!(policy.aggression() >= AGGRESSION_MIN - 1e-9);
        assert!(policy.aggression() <= AGGRESSION_MAX + 1e-9);
    }

    #[test]
    fn unknown_country_is_an_error() {
        let world = SharedWorld::new(build_world());
        let mut ctx = AgentContext::new("Agent", 12);
        let mut policy = CountryPolicy::new("Atlantis", false);
        let err = policy.advance(&mut ctx, &world, &ToolResults::default(), String::new());
        assert!(matches!(err, Err(AgentError::World(_))));
    }
}

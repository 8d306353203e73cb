//! The typed tool catalogue and each agent's dispatcher.
//!
//! Tool names arrive as strings from the reasoning provider. The
//! [`AgentToolbox`] parses them into [`ToolName`], rejects anything the
//! calling agent did not declare, deserializes the argument object into the
//! tool's typed argument struct, and runs the formula against the shared
//! world or bus. Every accepted call is recorded in [`ToolResults`] (last
//! write wins per tool) for the agent's action policy.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tradewar_core::EventBus;
use tradewar_runner::ToolExecutor;
use tradewar_types::{Event, Sector, ToolError, ToolName, Topic};
use tradewar_world::analysis::{
    self, ConcessionValue, DealProposal, GameStructure, MarketImpact, NashEquilibrium,
    PayoffMatrix, PredictedResponse, RetaliationRisk, SupplyChainStress, TariffImpact,
    TradePosition,
};
use tradewar_world::{SharedWorld, WorldError, WorldState, epoch_seconds};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CountryArgs {
    country: String,
}

#[derive(Debug, Deserialize)]
struct TariffImpactArgs {
    country: String,
    target_good: String,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct PolicyActionArgs {
    action_type: String,
    #[serde(default, alias = "parameters")]
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RateArgs {
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct CountryPairArgs {
    country_pair: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SectorArgs {
    sector: Sector,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyRate {
    #[serde(default)]
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct MarketImpactArgs {
    #[serde(default)]
    policy: PolicyRate,
}

#[derive(Debug, Deserialize)]
struct ScenarioArgs {
    scenario: String,
}

#[derive(Debug, Deserialize)]
struct NashArgs {
    players: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseArgs {
    action: String,
    opponent: String,
}

#[derive(Debug, Deserialize)]
struct WelfareLossArgs {
    #[serde(default)]
    welfare_losses: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct DealArgs {
    countries: Vec<String>,
    issues: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OffersArgs {
    offers: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WelfareReportArgs {
    #[serde(default)]
    countries: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct EquilibriumArgs {
    #[serde(default)]
    state: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct TriggerArgs {
    event_type: String,
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, arguments: &Value) -> Result<T, ToolError> {
    let value = if arguments.is_null() {
        json!({})
    } else {
        arguments.clone()
    };
    serde_json::from_value(value).map_err(|e| ToolError::InvalidArguments {
        tool,
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A recorded policy proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyProposal {
    /// Proposed action.
    pub action_type: String,
    /// Its parameters, as given.
    pub parameters: Map<String, Value>,
}

/// Trade flow observed for a country pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeFlowReport {
    /// `"A-B"` label of the pair.
    pub pair: String,
    /// Current flow per sector.
    pub trade_flow: BTreeMap<Sector, f64>,
}

/// Recent policy events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyChanges {
    /// Policy-topic events among the recent bus history, oldest first.
    pub changes: Vec<Event>,
}

/// Whether a negotiation window is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NegotiationWindow {
    /// Open when the lowest welfare is under the threshold.
    pub window: bool,
}

/// Outcome of one bargaining round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BargainingRound {
    /// Always `counter`: the round continues.
    pub round_status: String,
    /// The first two offers on the table.
    pub offers: Vec<Value>,
}

/// Whether welfare has converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EquilibriumCheck {
    /// True when the welfare spread is below the equilibrium threshold.
    pub equilibrium: bool,
}

/// A triggered scenario event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggeredEvent {
    /// The event type requested.
    pub event_type: String,
    /// Always `triggered`.
    pub status: String,
}

/// The typed result of one tool call, serialized as the bare result object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// `evaluate_trade_position`.
    TradePosition(TradePosition),
    /// `calculate_tariff_impact`.
    TariffImpact(TariffImpact),
    /// `propose_policy_action`.
    PolicyProposal(PolicyProposal),
    /// `assess_retaliation_risk`.
    RetaliationRisk(RetaliationRisk),
    /// `monitor_trade_flows`.
    TradeFlows(TradeFlowReport),
    /// `detect_policy_changes`.
    PolicyChanges(PolicyChanges),
    /// `analyze_supply_chains`.
    SupplyChain(SupplyChainStress),
    /// `predict_market_impact`.
    MarketImpact(MarketImpact),
    /// `model_game_structure`.
    GameStructure(GameStructure),
    /// `find_nash_equilibrium`.
    NashEquilibrium(NashEquilibrium),
    /// `predict_response`.
    Response(PredictedResponse),
    /// `calculate_payoff_matrix`.
    PayoffMatrix(PayoffMatrix),
    /// `detect_negotiation_window`.
    NegotiationWindow(NegotiationWindow),
    /// `generate_deal_proposal`.
    DealProposal(DealProposal),
    /// `evaluate_concession_value`.
    Concession(ConcessionValue),
    /// `manage_bargaining_round`.
    Bargaining(BargainingRound),
    /// `execute_simulation_round` and `generate_welfare_report`.
    Welfare(BTreeMap<String, f64>),
    /// `detect_equilibrium`.
    Equilibrium(EquilibriumCheck),
    /// `trigger_event`.
    Trigger(TriggeredEvent),
}

/// Tool results of one round, keyed by tool. Last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolResults {
    results: BTreeMap<ToolName, ToolOutput>,
}

impl ToolResults {
    /// Record `output` for `tool`, replacing any earlier result.
    pub fn record(&mut self, tool: ToolName, output: ToolOutput) {
        self.results.insert(tool, output);
    }

    /// The result recorded for `tool`.
    pub fn get(&self, tool: ToolName) -> Option<&ToolOutput> {
        self.results.get(&tool)
    }

    /// Number of tools with a recorded result.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The result for `tool` as JSON, or an empty object when absent.
    pub fn json(&self, tool: ToolName) -> Value {
        self.get(tool)
            .and_then(|output| serde_json::to_value(output).ok())
            .unwrap_or_else(|| json!({}))
    }

    /// Recorded retaliation risk.
    pub fn retaliation_risk(&self) -> Option<f64> {
        match self.get(ToolName::AssessRetaliationRisk) {
            Some(ToolOutput::RetaliationRisk(r)) => Some(r.retaliation_risk),
            _ => None,
        }
    }

    /// Recorded negotiation window.
    pub fn negotiation_window(&self) -> Option<bool> {
        match self.get(ToolName::DetectNegotiationWindow) {
            Some(ToolOutput::NegotiationWindow(w)) => Some(w.window),
            _ => None,
        }
    }

    /// Recorded equilibrium check.
    pub fn equilibrium(&self) -> Option<bool> {
        match self.get(ToolName::DetectEquilibrium) {
            Some(ToolOutput::Equilibrium(e)) => Some(e.equilibrium),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// One agent's tool dispatcher over the shared world and bus.
#[derive(Debug)]
pub struct AgentToolbox {
    declared: Vec<ToolName>,
    world: SharedWorld,
    bus: EventBus,
    history_limit: usize,
    results: ToolResults,
}

impl AgentToolbox {
    /// A dispatcher accepting only `declared` tools.
    ///
    /// `history_limit` bounds how far back `detect_policy_changes` looks.
    pub const fn new(
        declared: Vec<ToolName>,
        world: SharedWorld,
        bus: EventBus,
        history_limit: usize,
    ) -> Self {
        Self {
            declared,
            world,
            bus,
            history_limit,
            results: ToolResults {
                results: BTreeMap::new(),
            },
        }
    }

    /// The tools this agent may call.
    pub fn declared(&self) -> &[ToolName] {
        &self.declared
    }

    /// Results recorded so far this round.
    pub const fn results(&self) -> &ToolResults {
        &self.results
    }

    /// Hand over this round's results and start the next round empty.
    pub fn take_results(&mut self) -> ToolResults {
        std::mem::take(&mut self.results)
    }

    /// Run `tool` without the declaration check or recording.
    pub fn dispatch(&self, tool: ToolName, arguments: &Value) -> Result<ToolOutput, ToolError> {
        let output = match tool {
            ToolName::EvaluateTradePosition => {
                let args: CountryArgs = parse_args(tool, arguments)?;
                let position = self
                    .world
                    .read(|w| w.country(&args.country).map(analysis::trade_position));
                ToolOutput::TradePosition(position.map_err(unknown_country)?)
            }
            ToolName::CalculateTariffImpact => {
                let args: TariffImpactArgs = parse_args(tool, arguments)?;
                // Goods outside the sector set carry no import volume.
                let sector = args.target_good.parse::<Sector>().ok();
                let volume = self.world.read(|w| {
                    w.country(&args.country)
                        .map(|c| sector.map_or(0.0, |s| c.import_volume(s)))
                });
                ToolOutput::TariffImpact(analysis::tariff_impact(
                    volume.map_err(unknown_country)?,
                    args.rate,
                ))
            }
            ToolName::ProposePolicyAction => {
                let args: PolicyActionArgs = parse_args(tool, arguments)?;
                ToolOutput::PolicyProposal(PolicyProposal {
                    action_type: args.action_type,
                    parameters: args.params,
                })
            }
            ToolName::AssessRetaliationRisk => {
                let args: RateArgs = parse_args(tool, arguments)?;
                ToolOutput::RetaliationRisk(analysis::retaliation_risk(args.rate))
            }
            ToolName::MonitorTradeFlows => {
                let args: CountryPairArgs = parse_args(tool, arguments)?;
                let [first, second, ..] = args.country_pair.as_slice() else {
                    return Err(ToolError::InvalidArguments {
                        tool,
                        message: "country_pair needs two countries".to_owned(),
                    });
                };
                ToolOutput::TradeFlows(TradeFlowReport {
                    pair: format!("{first}-{second}"),
                    trade_flow: self.world.read(|w| w.trade_flow().clone()),
                })
            }
            ToolName::DetectPolicyChanges => ToolOutput::PolicyChanges(PolicyChanges {
                changes: self
                    .bus
                    .recent(self.history_limit)
                    .into_iter()
                    .filter(|e| e.topic() == Topic::Policy)
                    .collect(),
            }),
            ToolName::AnalyzeSupplyChains => {
                let args: SectorArgs = parse_args(tool, arguments)?;
                let flow = self.world.read(|w| w.trade_flow().get(&args.sector).copied());
                ToolOutput::SupplyChain(analysis::supply_chain_stress(args.sector, flow))
            }
            ToolName::PredictMarketImpact => {
                let args: MarketImpactArgs = parse_args(tool, arguments)?;
                ToolOutput::MarketImpact(analysis::market_impact(args.policy.rate))
            }
            ToolName::ModelGameStructure => {
                let args: ScenarioArgs = parse_args(tool, arguments)?;
                ToolOutput::GameStructure(analysis::game_structure(&args.scenario))
            }
            ToolName::FindNashEquilibrium => {
                let args: NashArgs = parse_args(tool, arguments)?;
                ToolOutput::NashEquilibrium(analysis::nash_equilibrium(&args.players))
            }
            ToolName::PredictResponse => {
                let args: ResponseArgs = parse_args(tool, arguments)?;
                ToolOutput::Response(analysis::predicted_response(&args.action, &args.opponent))
            }
            ToolName::CalculatePayoffMatrix => ToolOutput::PayoffMatrix(analysis::payoff_matrix()),
            ToolName::DetectNegotiationWindow => {
                let args: WelfareLossArgs = parse_args(tool, arguments)?;
                let welfare = self.welfare_or_live(args.welfare_losses);
                ToolOutput::NegotiationWindow(NegotiationWindow {
                    window: analysis::negotiation_window(&welfare),
                })
            }
            ToolName::GenerateDealProposal => {
                let args: DealArgs = parse_args(tool, arguments)?;
                ToolOutput::DealProposal(analysis::deal_proposal(args.countries, args.issues))
            }
            ToolName::EvaluateConcessionValue => {
                ToolOutput::Concession(analysis::concession_value())
            }
            ToolName::ManageBargainingRound => {
                let args: OffersArgs = parse_args(tool, arguments)?;
                ToolOutput::Bargaining(BargainingRound {
                    round_status: "counter".to_owned(),
                    offers: args.offers.into_iter().take(2).collect(),
                })
            }
            ToolName::ExecuteSimulationRound => {
                let welfare = self.world.write(|w| {
                    w.gravity_trade_flow(epoch_seconds(Utc::now()));
                    w.compute_welfare()
                });
                ToolOutput::Welfare(welfare)
            }
            ToolName::GenerateWelfareReport => {
                let args: WelfareReportArgs = parse_args(tool, arguments)?;
                let welfare = self.welfare_or_live(args.countries);
                ToolOutput::Welfare(analysis::welfare_report(&welfare))
            }
            ToolName::DetectEquilibrium => {
                let args: EquilibriumArgs = parse_args(tool, arguments)?;
                let welfare = self.welfare_or_live(args.state);
                ToolOutput::Equilibrium(EquilibriumCheck {
                    equilibrium: analysis::equilibrium(&welfare),
                })
            }
            ToolName::TriggerEvent => {
                let args: TriggerArgs = parse_args(tool, arguments)?;
                ToolOutput::Trigger(TriggeredEvent {
                    event_type: args.event_type,
                    status: "triggered".to_owned(),
                })
            }
        };
        Ok(output)
    }

    /// The supplied welfare map, or live welfare when absent or empty.
    fn welfare_or_live(&self, supplied: Option<BTreeMap<String, f64>>) -> BTreeMap<String, f64> {
        match supplied {
            Some(map) if !map.is_empty() => map,
            _ => self.world.read(WorldState::compute_welfare),
        }
    }
}

fn unknown_country(err: WorldError) -> ToolError {
    match err {
        WorldError::CountryNotFound(name) => ToolError::UnknownCountry(name),
    }
}

impl ToolExecutor for AgentToolbox {
    fn execute(&mut self, tool: &str, arguments: &Value) -> Result<Value, ToolError> {
        let tool: ToolName = tool.parse()?;
        if !self.declared.contains(&tool) {
            return Err(ToolError::NotDeclared { tool });
        }
        let output = self.dispatch(tool, arguments)?;
        let value = serde_json::to_value(&output).unwrap_or_else(|_| json!({}));
        self.results.record(tool, output);
        Ok(value)
    }
}

//! Agent runtime for the trade-war simulation.
//!
//! Every agent runs the same loop: drain its mailboxes into a bounded
//! memory, observe the world, reason with the shared adapter under a hard
//! deadline, act through its kind's policy, and publish the results. This
//! crate holds that loop plus everything an agent owns.
//!
//! # Modules
//!
//! - [`context`] -- Per-agent status, last action, and bounded memory
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`policy`] -- The closed set of agent kinds and their action policies
//! - [`roster`] -- The standing seven-agent roster
//! - [`runtime`] -- The sense, reason, act loop ([`Agent`])
//! - [`status`] -- Shared status read model ([`StatusBoard`])
//! - [`tools`] -- Typed tool catalogue and per-agent dispatcher

pub mod context;
pub mod error;
pub mod policy;
pub mod roster;
pub mod runtime;
pub mod status;
pub mod tools;

pub use context::AgentContext;
pub use error::AgentError;
pub use policy::{AgentKind, CountryPolicy, LearningSignal, ScenarioPolicy};
pub use roster::{ALPHA_AGENT, build_agents, build_roster};
pub use runtime::{Agent, AgentDeps, AgentSettings};
pub use status::StatusBoard;
pub use tools::{AgentToolbox, ToolOutput, ToolResults};

//! Event bus and simulation configuration for the trade-war simulation.
//!
//! # Modules
//!
//! - [`bus`] -- Topic-filtered mailboxes plus a bounded history ring.
//! - [`config`] -- Configuration loading from `tradewar-config.yaml` into
//!   strongly-typed structs.

pub mod bus;
pub mod config;

pub use bus::{EventBus, Mailbox};
pub use config::{ConfigError, LogFormat, SimulationConfig};

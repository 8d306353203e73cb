//! Countries, tariffs, trade flow, and welfare for the trade-war simulation.
//!
//! This crate models the economy the agents act on: per-country sector
//! volumes and tariffs, the shared sector trade flow, and the transition
//! functions over them (tariff clamp, gravity trade flow, sector drift,
//! welfare).
//!
//! # Modules
//!
//! - [`analysis`] -- Pure formulas behind the analyst tool catalogue.
//! - [`country`] -- [`CountryState`] with clamped tariffs.
//! - [`error`] -- Error types for world operations.
//! - [`shared`] -- [`SharedWorld`], the lock-guarded cross-task handle.
//! - [`starting_world`] -- The default three-country world.
//! - [`state`] -- [`WorldState`] and its mutators.

pub mod analysis;
pub mod country;
pub mod error;
pub mod shared;
pub mod starting_world;
pub mod state;

// Re-export primary types at crate root.
pub use country::{CountryState, MAX_TARIFF, MIN_TARIFF, clamp_tariff};
pub use error::WorldError;
pub use shared::SharedWorld;
pub use starting_world::{ALPHA, BETA, GAMMA, build_world};
pub use state::{WelfarePoint, WorldState, epoch_seconds};

//! Error types for the `tradewar-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

/// Errors that can occur during world-state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// No country with this name exists in the world.
    #[error("country not found: {0}")]
    CountryNotFound(String),
}

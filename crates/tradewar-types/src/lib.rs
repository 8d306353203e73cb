//! Shared type definitions for the trade-war negotiation simulation.
//!
//! This crate is the single source of truth for the records that cross crate
//! boundaries: bus events, agent memory entries, tool identifiers and errors,
//! reasoning results, and the snapshot documents published for the dashboard.
//! Types flow to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`enums`] -- Sectors, topics, agent status, reasoning mode, tool names
//! - [`structs`] -- [`Event`] and [`MemoryEntry`]
//! - [`tools`] -- Tool calls, reasoning results, tool errors
//! - [`snapshot`] -- Documents written to the persistence boundary

pub mod enums;
pub mod snapshot;
pub mod structs;
pub mod tools;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentStatus, ReasoningMode, Sector, ToolName, Topic, TopicFilter};
pub use snapshot::{CountryView, LearningMetrics, StateDocument, SystemHealth, TimelineEntry};
pub use structs::{Event, MemoryEntry, Payload, payload_from};
pub use tools::{ReasoningResult, ToolCall, ToolError};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes bindings for types marked #[ts(export)] into
        // `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::enums::Sector::export_all();
        let _ = crate::enums::Topic::export_all();
        let _ = crate::enums::AgentStatus::export_all();
        let _ = crate::enums::ReasoningMode::export_all();
        let _ = crate::enums::ToolName::export_all();

        let _ = crate::structs::Event::export_all();
        let _ = crate::structs::MemoryEntry::export_all();

        let _ = crate::tools::ToolCall::export_all();
        let _ = crate::tools::ReasoningResult::export_all();

        let _ = crate::snapshot::CountryView::export_all();
        let _ = crate::snapshot::LearningMetrics::export_all();
        let _ = crate::snapshot::TimelineEntry::export_all();
        let _ = crate::snapshot::SystemHealth::export_all();
        let _ = crate::snapshot::StateDocument::export_all();
    }
}

//! Persistence boundary for published simulation documents.
//!
//! The snapshot publisher writes two documents per period, `state` and
//! `events`, each replacing its prior value. Readers (the dashboard, the
//! observer) must never see a partial write, which both backends guarantee:
//!
//! ```text
//! Snapshot Publisher
//!     |
//!     +-- SnapshotStore::File      --> shared/{key}.json   (tmp + rename)
//!     |
//!     +-- SnapshotStore::Dragonfly --> SET {key} <json>    (single command)
//! ```
//!
//! # Modules
//!
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`file`] -- Atomic JSON-file backend
//! - [`snapshot_store`] -- Backend selection and the write/read surface
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod file;
pub mod snapshot_store;

// Re-export primary types for convenience.
pub use dragonfly::DragonflyPool;
pub use error::DbError;
pub use file::FileStore;
pub use snapshot_store::{EVENTS_KEY, STATE_KEY, SnapshotStore};

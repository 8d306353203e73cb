//! Observer API server for the trade-war simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/state`) pushing every published
//!   snapshot via [`tokio::sync::broadcast`]
//! - **REST endpoints** for the latest `state` and `events` documents
//! - **Static files**: the dashboard at `/` and the published documents
//!   at `/shared`, both with no-cache headers
//!
//! # Architecture
//!
//! The observer is a read-only consumer. The engine's snapshot publisher
//! calls [`AppState::publish`] after each write; REST reads are served from
//! that latest document so the observer never touches the world or the bus.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::{build_router, with_static};
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use state::{AppState, LatestSnapshot};

//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for published snapshots and the
//! latest `state` document the REST endpoints serve. The engine pushes each
//! document here after writing it through the persistence boundary.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tradewar_types::StateDocument;

/// Capacity of the broadcast channel for snapshots.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// The most recent published document and a running count.
#[derive(Debug, Clone, Default)]
pub struct LatestSnapshot {
    /// The latest `state` document, absent until the first publish.
    pub state: Option<Arc<StateDocument>>,
    /// Documents published since startup.
    pub published: u64,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for published snapshots.
    pub tx: broadcast::Sender<Arc<StateDocument>>,
    /// The latest snapshot.
    pub snapshot: Arc<RwLock<LatestSnapshot>>,
}

impl AppState {
    /// Create a new application state with no snapshot yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(LatestSnapshot::default())),
        }
    }

    /// Subscribe to the snapshot broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<StateDocument>> {
        self.tx.subscribe()
    }

    /// Store `document` as the latest snapshot and push it to every
    /// connected client.
    ///
    /// Returns the number of receivers that got the message; 0 when no
    /// clients are connected.
    pub async fn publish(&self, document: StateDocument) -> usize {
        let document = Arc::new(document);
        {
            let mut snapshot = self.snapshot.write().await;
            snapshot.state = Some(Arc::clone(&document));
            snapshot.published = snapshot.published.saturating_add(1);
        }
        // send fails only when there are zero receivers.
        self.tx.send(document).unwrap_or(0)
    }

    /// The latest `state` document, if one has been published.
    pub async fn latest(&self) -> Option<Arc<StateDocument>> {
        self.snapshot.read().await.state.clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

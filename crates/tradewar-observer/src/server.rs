//! Listener for the observer: the JSON API plus the dashboard and the
//! `shared/` documents on one address.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::router::{build_router, with_static};
use crate::state::AppState;

/// Where the observer listens and which directories it serves.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port; 0 picks a free one.
    pub port: u16,
    /// Served at `/`.
    pub dashboard_dir: PathBuf,
    /// Served at `/shared`.
    pub shared_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            dashboard_dir: PathBuf::from("dashboard"),
            shared_dir: PathBuf::from("shared"),
        }
    }
}

impl ServerConfig {
    /// The socket address built from `host` and `port`.
    ///
    /// # Errors
    ///
    /// [`ServerError::Address`] when `host` is not an IP literal.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|source| ServerError::Address { addr: raw, source })
    }
}

/// Bind the configured address and serve until the process exits.
///
/// # Errors
///
/// Fails on a malformed address, a bind failure, or a fatal accept error.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve(listener, config, state).await
}

/// Serve the observer on an already bound listener.
///
/// # Errors
///
/// [`ServerError::Serve`] when accepting connections fails.
pub async fn serve(
    listener: TcpListener,
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(), ServerError> {
    let app = with_static(build_router(state), &config.dashboard_dir, &config.shared_dir);
    let local = listener.local_addr().map_err(ServerError::Serve)?;
    info!(
        addr = %local,
        dashboard = %config.dashboard_dir.display(),
        shared = %config.shared_dir.display(),
        "observer listening"
    );
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}

/// Observer listener failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// `host:port` did not parse.
    #[error("invalid observer address {addr}: {source}")]
    Address {
        /// The rejected `host:port` string.
        addr: String,
        /// Parse failure.
        source: AddrParseError,
    },

    /// The port is taken or not permitted.
    #[error("cannot bind observer on {addr}: {source}")]
    Bind {
        /// Address that failed to bind.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("observer stopped: {0}")]
    Serve(#[source] std::io::Error),
}

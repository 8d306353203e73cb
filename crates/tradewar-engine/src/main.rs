//! Engine binary for the trade-war simulation.
//!
//! This is the main entry point that wires together the world, the event
//! bus, the seven-agent roster, the world drift task, the snapshot
//! publisher, and the observer server. Every piece runs as its own task;
//! none is supervised or restarted, and process termination is the only
//! teardown path.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tradewar-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Resolve the reasoning provider from the environment
//! 4. Build the starting world, the bus, and the status board
//! 5. Build the agent roster
//! 6. Open the snapshot store
//! 7. Spawn agents, drift, publisher, and observer
//! 8. Wait on the tasks

mod drift;
mod error;
mod publisher;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tradewar_agents::{AgentDeps, StatusBoard, build_roster};
use tradewar_core::config::{InfrastructureConfig, LoggingConfig};
use tradewar_core::{EventBus, LogFormat, SimulationConfig};
use tradewar_db::SnapshotStore;
use tradewar_observer::{AppState, ServerConfig, start_server};
use tradewar_runner::{ReasoningAdapter, ReasoningConfig};
use tradewar_world::{SharedWorld, build_world};

use crate::error::EngineError;
use crate::publisher::Publisher;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, config_path) = SimulationConfig::load()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("tradewar-engine starting");
    info!(
        config_path = ?config_path,
        decision_timeout_ms = config.simulation.decision_timeout_ms,
        max_tool_rounds = config.simulation.max_tool_rounds,
        history_capacity = config.simulation.history_capacity,
        memory_capacity = config.simulation.memory_capacity,
        mailbox_capacity = ?config.simulation.mailbox_capacity,
        "Configuration loaded"
    );

    // 3. Resolve the reasoning provider.
    let reasoning = ReasoningConfig::from_env()?;
    let adapter = ReasoningAdapter::from_config(&reasoning)?
        .with_max_rounds(config.simulation.max_tool_rounds);
    info!(
        requested = %reasoning.requested,
        provider = reasoning.mode_label(),
        model = reasoning.backend.as_ref().map(|b| b.model.as_str()),
        temperature = reasoning.temperature,
        "Reasoning provider selected"
    );

    // 4. Shared state.
    let world = SharedWorld::new(
        build_world().with_history_limit(config.publisher.world_history_limit),
    );
    let bus = EventBus::new(
        config.simulation.history_capacity,
        config.simulation.mailbox_capacity,
    );
    let board = StatusBoard::new();
    let deps = AgentDeps {
        world: world.clone(),
        bus: bus.clone(),
        adapter: Arc::new(adapter),
        board: board.clone(),
    };

    // 5. Agents.
    let agents = build_roster(&deps, &config)?;
    info!(agents = agents.len(), "Agent roster built");

    // 6. Snapshot store.
    let store = open_store(&config.infrastructure).await?;
    let observer = Arc::new(AppState::new());

    // 7. Spawn everything.
    let mut tasks = JoinSet::new();
    for agent in agents {
        tasks.spawn(agent.run());
    }
    tasks.spawn(drift::run_drift(
        world.clone(),
        Duration::from_millis(config.publisher.drift_interval_ms),
    ));
    let publisher = Publisher {
        world,
        bus,
        board,
        store,
        observer: Arc::clone(&observer),
        bounds: config.simulation.clone(),
    };
    tasks.spawn(publisher.run(Duration::from_millis(config.publisher.snapshot_interval_ms)));

    let server_config = ServerConfig {
        host: config.infrastructure.observer_host.clone(),
        port: config.infrastructure.observer_port,
        dashboard_dir: config.infrastructure.dashboard_dir.clone(),
        shared_dir: config.infrastructure.shared_dir.clone(),
    };
    tasks.spawn(async move {
        if let Err(e) = start_server(&server_config, observer).await {
            error!(error = %e, "Observer server stopped");
        }
    });

    // 8. Run until the process is terminated.
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Task ended abnormally");
        }
    }

    info!("tradewar-engine shutdown complete");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Open `Dragonfly` when a URL is configured, else the shared directory.
///
/// An unreachable `Dragonfly` falls back to files rather than aborting.
async fn open_store(infra: &InfrastructureConfig) -> Result<SnapshotStore, EngineError> {
    if let Some(url) = infra.redis_url.as_deref() {
        match SnapshotStore::dragonfly(url).await {
            Ok(store) => {
                info!(backend = store.backend_name(), "Snapshot store opened");
                return Ok(store);
            }
            Err(e) => warn!(error = %e, "Dragonfly unavailable, falling back to files"),
        }
    }
    let store = SnapshotStore::file(&infra.shared_dir).await?;
    info!(
        backend = store.backend_name(),
        shared_dir = %infra.shared_dir.display(),
        "Snapshot store opened"
    );
    Ok(store)
}

//! Engine binary for `ChronoMorph`.
//!
//! Wires the in-memory store, the threshold alert detector, and the file
//! exporter to a [`Simulator`], seeds the store, runs a scripted session
//! of simulations, and logs the resulting leaderboard.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `chronomorph-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Import seed agents, or spawn agents if none were imported
//! 4. Run `session.runs_per_agent` simulations for every agent
//! 5. Log the leaderboard

mod error;
mod spawner;

use std::path::Path;

use chronomorph_core::config::LoggingConfig;
use chronomorph_core::{
    AgentStore, EngineConfig, RngSignal, RunRequest, SimulationError, Simulator,
    ThresholdAlertDetector,
};
use chronomorph_export::FileExporter;
use chronomorph_store::{InMemoryStore, import_agents_from_dir};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "chronomorph-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, seeding, or a simulation run fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = EngineConfig::load_or_default(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("chronomorph-engine starting");
    info!(
        max_rungs = config.limits.max_rungs,
        seed = ?config.signal.seed,
        seed_dir = %config.storage.seed_dir.display(),
        export_dir = %config.exports.dir.display(),
        "Configuration loaded"
    );

    // 3. Seed the store.
    let store = InMemoryStore::new();
    seed_store(&store, &config)?;

    // 4. Run the session.
    let detector = ThresholdAlertDetector::new(config.alerts.clone());
    let exporter = FileExporter::new(&config.exports.dir);
    let simulator = Simulator::new(&store, &detector)
        .with_exporter(&exporter)
        .with_max_rungs(config.limits.max_rungs);
    run_session(&simulator, &store, &config)?;

    // 5. Log the leaderboard.
    for entry in simulator.leaderboard()? {
        info!(
            rank = entry.rank,
            agent = %entry.name,
            level = entry.level,
            mutations = entry.mutation_count,
            score = entry.display_score(),
            "Leaderboard"
        );
    }

    info!("chronomorph-engine finished");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    result.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Import seed agents, falling back to spawned agents.
fn seed_store(store: &InMemoryStore, config: &EngineConfig) -> Result<(), EngineError> {
    let imported = import_agents_from_dir(store, &config.storage.seed_dir)?;
    if imported > 0 {
        info!(imported, "Seed agents loaded");
        return Ok(());
    }

    let mut rng = config
        .signal
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let spawned = spawner::spawn_agents(store, config.session.seed_agents, &mut rng)?;
    info!(spawned = spawned.len(), "Seed agents spawned");
    Ok(())
}

/// Run the configured number of simulations for every agent.
///
/// A run whose commit fails is logged and skipped; the session continues.
fn run_session(
    simulator: &Simulator<'_>,
    store: &InMemoryStore,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    let mut signal = RngSignal::from_optional_seed(config.signal.seed);

    for agent in store.list_agents()? {
        let request = session_request(config, &agent.name);
        for run in 1..=config.session.runs_per_agent {
            match simulator.simulate(&request, &mut signal) {
                Ok(result) => info!(
                    agent = %result.agent.name,
                    run,
                    level = result.agent.level,
                    spikes = result.spike_count(),
                    alerts = result.alerts.len(),
                    mutations = result.mutation_count(),
                    media = ?result.media.as_ref().map(|m| m.location.as_str()),
                    "Session run complete"
                ),
                Err(SimulationError::PersistenceFailure { source, .. }) => {
                    warn!(agent = %agent.name, run, error = %source, "Session run not persisted");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

/// The request [`run_session`] issues for one agent.
fn session_request(config: &EngineConfig, name: &str) -> RunRequest {
    let request = config
        .defaults
        .request(name)
        .with_rungs(config.session.rungs)
        .with_reward_bias(config.session.reward_bias);
    match &config.exports.post_run_format {
        Some(format) => request.with_export(format.as_str()),
        None => request,
    }
}

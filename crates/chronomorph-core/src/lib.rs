//! Rung simulation and mutation engine for `ChronoMorph`.
//!
//! A simulation run takes an [`Agent`] snapshot, drives the rung stepper N
//! times, folds the resulting steps into trait counters, fires mutation
//! rules, renormalizes traits, and levels the agent. Everything in this
//! crate is synchronous and performs no I/O; persistence, alert detection,
//! and asset export are reached through the collaborator traits defined in
//! [`store`], [`entropy`], and [`export`].
//!
//! # Modules
//!
//! - [`signal`] -- [`RandomSignal`] capability with seeded, OS-backed, and
//!   scripted sources.
//! - [`rung`] -- The per-rung stepper.
//! - [`entropy`] -- Delta tracking and the [`AlertDetector`] collaborator.
//! - [`aggregate`] -- Folding steps into [`TraitCounters`].
//! - [`mutation`] -- Ordered mutation rule table.
//! - [`renormalize`] -- Trait blending and leveling.
//! - [`leaderboard`] -- Score computation and ranking.
//! - [`run`] -- One complete simulation run over an agent snapshot.
//! - [`request`] -- Caller-facing run request and its validation.
//! - [`config`] -- Configuration loading from `chronomorph-config.yaml`.
//! - [`store`] -- [`AgentStore`] persistence collaborator.
//! - [`export`] -- [`MediaExporter`] export collaborator.
//! - [`service`] -- [`Simulator`], which wires a run to its collaborators.
//! - [`error`] -- [`SimulationError`].
//!
//! [`Agent`]: chronomorph_types::Agent
//! [`RandomSignal`]: signal::RandomSignal
//! [`AlertDetector`]: entropy::AlertDetector
//! [`TraitCounters`]: aggregate::TraitCounters
//! [`AgentStore`]: store::AgentStore
//! [`MediaExporter`]: export::MediaExporter
//! [`Simulator`]: service::Simulator
//! [`SimulationError`]: error::SimulationError

pub mod aggregate;
pub mod config;
pub mod entropy;
pub mod error;
pub mod export;
pub mod leaderboard;
pub mod mutation;
pub mod renormalize;
pub mod request;
pub mod run;
pub mod rung;
pub mod service;
pub mod signal;
pub mod store;

// Re-export primary types at crate root for convenience.
pub use aggregate::TraitCounters;
pub use config::{ConfigError, EngineConfig};
pub use entropy::{AlertDetector, DeltaTracker, ThresholdAlertDetector};
pub use error::SimulationError;
pub use export::{ExportError, MediaExporter};
pub use request::{RunRequest, RunSettings};
pub use run::RunOutcome;
pub use service::{RunResult, Simulator};
pub use signal::{RandomSignal, RngSignal, ScriptedSignal};
pub use store::{AgentStore, RunCommit, StoreError};

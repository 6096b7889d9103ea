//! The [`Simulator`] service: one simulation run wired to its collaborators.
//!
//! A call to [`Simulator::simulate`] validates the request, loads the agent
//! snapshot, executes the run, classifies the entropy deltas, commits the
//! run as one batch, and finally attempts an optional export. Nothing is
//! written before the run has fully executed, and a failed export never
//! undoes the committed run.

use chrono::Local;
use chronomorph_types::{
    Agent, EntropyAlert, EntropyDelta, ExportFormat, ExportRecord, LeaderboardEntry, MemoryLog,
    MutationEvent, Traits, UnsupportedFormat,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::TraitCounters;
use crate::entropy::AlertDetector;
use crate::error::SimulationError;
use crate::export::{ExportError, MediaExporter};
use crate::leaderboard;
use crate::request::{DEFAULT_MAX_RUNGS, RunRequest};
use crate::run;
use crate::signal::RandomSignal;
use crate::store::{AgentStore, RunCommit};

/// Timestamp layout used in run memory-log notes, in local wall-clock time.
const NOTE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The result of one simulation run, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// The agent after the run.
    pub agent: Agent,
    /// Clamped, unrounded entropy of every rung.
    pub entropy_data: Vec<f64>,
    /// Entropy delta of every rung.
    pub entropy_deltas: Vec<EntropyDelta>,
    /// Alerts raised by the detector, in rung order.
    pub alerts: Vec<EntropyAlert>,
    /// Mutations fired by the run; `None` when no rule fired.
    pub mutations: Option<Vec<MutationEvent>>,
    /// Export produced after the run, if one was requested and succeeded.
    pub media: Option<ExportRecord>,
    /// Counters folded from the run's steps.
    pub counters: TraitCounters,
    /// Whether the agent gained a level.
    pub leveled_up: bool,
}

impl RunResult {
    /// Number of mutations fired by the run.
    pub fn mutation_count(&self) -> usize {
        self.mutations.as_ref().map_or(0, Vec::len)
    }

    /// Number of spiking deltas.
    pub fn spike_count(&self) -> usize {
        self.entropy_deltas.iter().filter(|d| d.spike).count()
    }
}

/// Runs simulations against a store, an alert detector, and optionally an
/// exporter.
pub struct Simulator<'a> {
    store: &'a dyn AgentStore,
    detector: &'a dyn AlertDetector,
    exporter: Option<&'a dyn MediaExporter>,
    max_rungs: u32,
}

impl<'a> Simulator<'a> {
    /// Create a simulator without an exporter.
    pub const fn new(store: &'a dyn AgentStore, detector: &'a dyn AlertDetector) -> Self {
        Self {
            store,
            detector,
            exporter: None,
            max_rungs: DEFAULT_MAX_RUNGS,
        }
    }

    /// Attach an exporter.
    #[must_use]
    pub const fn with_exporter(mut self, exporter: &'a dyn MediaExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Override the maximum accepted rung count.
    #[must_use]
    pub const fn with_max_rungs(mut self, max_rungs: u32) -> Self {
        self.max_rungs = max_rungs;
        self
    }

    /// Register a new agent.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidConfiguration`] for an empty or duplicate
    /// name, [`SimulationError::PersistenceFailure`] if the store fails.
    pub fn create_agent(
        &self,
        name: &str,
        traits: Traits,
        note: Option<&str>,
    ) -> Result<Agent, SimulationError> {
        let agent = self.store.create_agent(name, traits, note)?;
        info!(agent = %agent.name, agent_id = %agent.id, "Agent created");
        Ok(agent)
    }

    /// Look up an agent by name.
    pub fn agent(&self, name: &str) -> Result<Agent, SimulationError> {
        Ok(self.store.get_agent(name)?)
    }

    /// Execute one simulation run and persist it.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidConfiguration`] before any draw if the
    ///   request is invalid.
    /// - [`SimulationError::AgentNotFound`] before any draw if the agent
    ///   does not exist.
    /// - [`SimulationError::PersistenceFailure`] if the commit fails; the
    ///   computed [`RunResult`] travels with the error.
    pub fn simulate(
        &self,
        request: &RunRequest,
        signal: &mut dyn RandomSignal,
    ) -> Result<RunResult, SimulationError> {
        let settings = request.validate(self.max_rungs)?;
        let agent = self.store.get_agent(&request.agent_name)?;

        let note = format!(
            "Simulation started at {}",
            Local::now().format(NOTE_TIME_FORMAT)
        );
        let outcome = run::execute(&agent, &settings, signal);
        let alerts = self.detector.detect_alerts(&outcome.deltas);

        let commit = RunCommit {
            agent_id: agent.id,
            note: &note,
            steps: &outcome.steps,
            mutations: &outcome.mutations,
            traits: settings.enable_mutation.then_some(outcome.agent.traits),
            level: outcome.leveled_up.then_some(outcome.agent.level),
        };
        let committed = self.store.commit_run(&commit);

        let mut result = RunResult {
            agent: outcome.agent,
            entropy_data: outcome.entropy,
            entropy_deltas: outcome.deltas,
            alerts,
            mutations: (!outcome.mutations.is_empty()).then_some(outcome.mutations),
            media: None,
            counters: outcome.counters,
            leveled_up: outcome.leveled_up,
        };

        if let Err(source) = committed {
            warn!(agent = %agent.name, error = %source, "Run commit failed");
            return Err(SimulationError::PersistenceFailure {
                source,
                result: Some(Box::new(result)),
            });
        }

        info!(
            agent = %result.agent.name,
            rungs = settings.rungs,
            alerts = result.alerts.len(),
            mutations = result.mutation_count(),
            level = result.agent.level,
            "Run committed"
        );

        if let Some(format) = settings.export {
            result.media = self.export_after_run(&result.agent, format);
        }

        Ok(result)
    }

    /// Rank every agent in the store.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, SimulationError> {
        let agents = self.store.list_agents()?;
        Ok(leaderboard::rank(&agents))
    }

    /// An agent's memory logs, oldest first.
    pub fn memory(&self, name: &str) -> Result<Vec<MemoryLog>, SimulationError> {
        let agent = self.store.get_agent(name)?;
        Ok(self.store.memory(agent.id)?)
    }

    /// An agent's recorded exports, oldest first.
    pub fn exports(&self, name: &str) -> Result<Vec<ExportRecord>, SimulationError> {
        let agent = self.store.get_agent(name)?;
        Ok(self.store.exports(agent.id)?)
    }

    /// Export an agent on demand and record the export.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidConfiguration`] for an unknown format,
    /// [`SimulationError::AgentNotFound`] for an unknown agent, and
    /// [`SimulationError::ExportFailed`] if no exporter is attached or the
    /// exporter fails.
    pub fn export(&self, name: &str, format: &str) -> Result<ExportRecord, SimulationError> {
        let format: ExportFormat = format
            .parse()
            .map_err(|e: UnsupportedFormat| SimulationError::invalid(e.to_string()))?;
        let agent = self.store.get_agent(name)?;
        let memory = self.store.memory(agent.id)?;
        let exporter = self.exporter.ok_or(ExportError::Unsupported { format })?;
        let record = exporter.export(&agent, &memory, format)?;
        self.store.record_export(&record)?;
        info!(agent = %agent.name, %format, location = %record.location, "Export recorded");
        Ok(record)
    }

    /// Best-effort export after a committed run.
    fn export_after_run(&self, agent: &Agent, format: ExportFormat) -> Option<ExportRecord> {
        let Some(exporter) = self.exporter else {
            warn!(agent = %agent.name, %format, "Export requested but no exporter attached");
            return None;
        };
        let memory = match self.store.memory(agent.id) {
            Ok(memory) => memory,
            Err(e) => {
                warn!(agent = %agent.name, error = %e, "Could not load memory for export");
                return None;
            }
        };
        let record = match exporter.export(agent, &memory, format) {
            Ok(record) => record,
            Err(e) => {
                warn!(agent = %agent.name, %format, error = %e, "Post-run export failed");
                return None;
            }
        };
        if let Err(e) = self.store.record_export(&record) {
            warn!(agent = %agent.name, error = %e, "Could not record export");
            return None;
        }
        Some(record)
    }
}

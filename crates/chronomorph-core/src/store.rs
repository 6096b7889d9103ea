//! The persistence collaborator contract.
//!
//! The engine never holds agent state between calls. It reads an
//! [`Agent`] snapshot through [`AgentStore::get_agent`] and hands the
//! finished run back as a single [`RunCommit`]. Implementations that can
//! apply a commit atomically should override [`AgentStore::commit_run`];
//! the provided method issues the individual writes in order.

use chronomorph_types::{
    Agent, AgentId, ExportRecord, MemoryId, MemoryLog, MemoryStep, MutationEvent, Traits,
};

/// Errors reported by an [`AgentStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No agent matches the given name or id.
    #[error("agent not found: {agent}")]
    AgentNotFound {
        /// The name or id that failed to resolve.
        agent: String,
    },

    /// An agent with this name already exists.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),

    /// The agent name is empty or whitespace.
    #[error("invalid agent name: {0:?}")]
    InvalidName(String),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// [`StoreError::AgentNotFound`] for an agent id.
    pub fn unknown_id(id: AgentId) -> Self {
        Self::AgentNotFound {
            agent: id.to_string(),
        }
    }

    /// [`StoreError::AgentNotFound`] for an agent name.
    pub fn unknown_name(name: &str) -> Self {
        Self::AgentNotFound {
            agent: name.to_owned(),
        }
    }
}

/// All writes produced by one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunCommit<'a> {
    /// The agent the run belongs to.
    pub agent_id: AgentId,
    /// Note for the memory log opened by this run.
    pub note: &'a str,
    /// Steps to append, in rung order.
    pub steps: &'a [MemoryStep],
    /// Mutations to record permanently.
    pub mutations: &'a [MutationEvent],
    /// Renormalized traits; `None` when mutation was disabled.
    pub traits: Option<Traits>,
    /// New level; `None` when the agent did not level up.
    pub level: Option<u32>,
}

/// Persistence collaborator for agents, their memory, and their exports.
///
/// Methods take `&self`; implementations provide their own interior
/// synchronization and must serialize writes per agent.
pub trait AgentStore {
    /// Look up an agent by name.
    fn get_agent(&self, name: &str) -> Result<Agent, StoreError>;

    /// Create an agent at level 1 with clamped traits.
    ///
    /// When `note` is given an empty memory log carrying it is recorded.
    fn create_agent(&self, name: &str, traits: Traits, note: Option<&str>)
    -> Result<Agent, StoreError>;

    /// Open a memory log with `note` and append `steps` to it.
    fn append_memory_steps(
        &self,
        agent_id: AgentId,
        note: &str,
        steps: &[MemoryStep],
    ) -> Result<MemoryId, StoreError>;

    /// Attach a permanent mutation to an agent, replacing any earlier value
    /// under the same name.
    fn record_mutation(&self, agent_id: AgentId, event: &MutationEvent) -> Result<(), StoreError>;

    /// Replace an agent's traits.
    fn update_traits(&self, agent_id: AgentId, traits: Traits) -> Result<(), StoreError>;

    /// Replace an agent's level.
    fn update_level(&self, agent_id: AgentId, level: u32) -> Result<(), StoreError>;

    /// All agents in insertion order.
    fn list_agents(&self) -> Result<Vec<Agent>, StoreError>;

    /// An agent's memory logs, oldest first.
    fn memory(&self, agent_id: AgentId) -> Result<Vec<MemoryLog>, StoreError>;

    /// Record a produced export.
    fn record_export(&self, record: &ExportRecord) -> Result<(), StoreError>;

    /// An agent's exports, oldest first.
    fn exports(&self, agent_id: AgentId) -> Result<Vec<ExportRecord>, StoreError>;

    /// Apply every write of one run.
    ///
    /// The provided implementation is not atomic: a failure part way
    /// through leaves the earlier writes in place.
    fn commit_run(&self, commit: &RunCommit<'_>) -> Result<(), StoreError> {
        self.append_memory_steps(commit.agent_id, commit.note, commit.steps)?;
        for event in commit.mutations {
            self.record_mutation(commit.agent_id, event)?;
        }
        if let Some(traits) = commit.traits {
            self.update_traits(commit.agent_id, traits)?;
        }
        if let Some(level) = commit.level {
            self.update_level(commit.agent_id, level)?;
        }
        Ok(())
    }
}

//! The in-memory [`AgentStore`].
//!
//! All state lives behind a single [`RwLock`]. Reads take the shared lock;
//! every write, including a full [`RunCommit`], takes the exclusive lock,
//! so writes for one agent are serialized and a commit is never observed
//! half applied. A poisoned lock surfaces as [`StoreError::LockPoisoned`].

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use chronomorph_core::{AgentStore, RunCommit, StoreError};
use chronomorph_types::{
    Agent, AgentId, ExportRecord, MemoryId, MemoryLog, MemoryStep, MutationEvent, Traits,
};
use tracing::debug;

/// One agent with everything recorded against it.
#[derive(Debug, Clone)]
struct AgentRecord {
    agent: Agent,
    memory: Vec<MemoryLog>,
    exports: Vec<ExportRecord>,
}

impl AgentRecord {
    fn open_log(&mut self, note: &str, steps: &[MemoryStep]) -> MemoryId {
        let log = MemoryLog {
            id: MemoryId::new(),
            note: note.to_owned(),
            started_at: Utc::now(),
            steps: steps.to_vec(),
        };
        let id = log.id;
        self.memory.push(log);
        id
    }
}

#[derive(Debug, Default)]
struct StoreState {
    /// Records in insertion order.
    records: Vec<AgentRecord>,
    /// Name to position in `records`.
    by_name: BTreeMap<String, usize>,
    /// Id to position in `records`.
    by_id: BTreeMap<AgentId, usize>,
}

impl StoreState {
    fn by_name(&self, name: &str) -> Result<&AgentRecord, StoreError> {
        self.by_name
            .get(name)
            .and_then(|&i| self.records.get(i))
            .ok_or_else(|| StoreError::unknown_name(name))
    }

    fn by_id(&self, id: AgentId) -> Result<&AgentRecord, StoreError> {
        self.by_id
            .get(&id)
            .and_then(|&i| self.records.get(i))
            .ok_or_else(|| StoreError::unknown_id(id))
    }

    fn by_id_mut(&mut self, id: AgentId) -> Result<&mut AgentRecord, StoreError> {
        self.by_id
            .get(&id)
            .and_then(|&i| self.records.get_mut(i))
            .ok_or_else(|| StoreError::unknown_id(id))
    }
}

/// An [`AgentStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of agents in the store.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.records.len())
    }

    /// Whether the store holds no agents.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.records.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state.read().map_err(|_poisoned| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state.write().map_err(|_poisoned| StoreError::LockPoisoned)
    }
}

impl AgentStore for InMemoryStore {
    fn get_agent(&self, name: &str) -> Result<Agent, StoreError> {
        Ok(self.read()?.by_name(name)?.agent.clone())
    }

    fn create_agent(
        &self,
        name: &str,
        traits: Traits,
        note: Option<&str>,
    ) -> Result<Agent, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidName(name.to_owned()));
        }

        let mut state = self.write()?;
        if state.by_name.contains_key(name) {
            return Err(StoreError::DuplicateName(name.to_owned()));
        }

        let agent = Agent {
            id: AgentId::new(),
            name: name.to_owned(),
            traits: traits.clamped(),
            level: 1,
            mutations: BTreeMap::new(),
            created_at: Utc::now(),
        };
        let mut record = AgentRecord {
            agent: agent.clone(),
            memory: Vec::new(),
            exports: Vec::new(),
        };
        if let Some(note) = note {
            record.open_log(note, &[]);
        }

        let index = state.records.len();
        state.by_name.insert(agent.name.clone(), index);
        state.by_id.insert(agent.id, index);
        state.records.push(record);
        debug!(agent = %agent.name, agent_id = %agent.id, "Agent stored");
        Ok(agent)
    }

    fn append_memory_steps(
        &self,
        agent_id: AgentId,
        note: &str,
        steps: &[MemoryStep],
    ) -> Result<MemoryId, StoreError> {
        let mut state = self.write()?;
        Ok(state.by_id_mut(agent_id)?.open_log(note, steps))
    }

    fn record_mutation(&self, agent_id: AgentId, event: &MutationEvent) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state
            .by_id_mut(agent_id)?
            .agent
            .mutations
            .insert(event.name.clone(), event.value.clone());
        Ok(())
    }

    fn update_traits(&self, agent_id: AgentId, traits: Traits) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.by_id_mut(agent_id)?.agent.traits = traits.clamped();
        Ok(())
    }

    fn update_level(&self, agent_id: AgentId, level: u32) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.by_id_mut(agent_id)?.agent.level = level.max(1);
        Ok(())
    }

    fn list_agents(&self) -> Result<Vec<Agent>, StoreError> {
        Ok(self
            .read()?
            .records
            .iter()
            .map(|r| r.agent.clone())
            .collect())
    }

    fn memory(&self, agent_id: AgentId) -> Result<Vec<MemoryLog>, StoreError> {
        Ok(self.read()?.by_id(agent_id)?.memory.clone())
    }

    fn record_export(&self, record: &ExportRecord) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.by_id_mut(record.agent_id)?.exports.push(record.clone());
        Ok(())
    }

    fn exports(&self, agent_id: AgentId) -> Result<Vec<ExportRecord>, StoreError> {
        Ok(self.read()?.by_id(agent_id)?.exports.clone())
    }

    fn commit_run(&self, commit: &RunCommit<'_>) -> Result<(), StoreError> {
        let mut state = self.write()?;
        // The lookup is the only fallible step, so nothing below can leave
        // a partial commit behind.
        let record = state.by_id_mut(commit.agent_id)?;

        record.open_log(commit.note, commit.steps);
        for event in commit.mutations {
            record
                .agent
                .mutations
                .insert(event.name.clone(), event.value.clone());
        }
        if let Some(traits) = commit.traits {
            record.agent.traits = traits.clamped();
        }
        if let Some(level) = commit.level {
            record.agent.level = level.max(1);
        }

        debug!(
            agent = %record.agent.name,
            steps = commit.steps.len(),
            mutations = commit.mutations.len(),
            "Run commit applied"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::arithmetic_side_effects
)]
mod tests {
    use chronomorph_types::{ExportFormat, ExportId, MutationValue};

    use super::*;

    fn step(rung_id: u32) -> MemoryStep {
        MemoryStep {
            rung_id,
            note: format!("Simulation rung {}", rung_id + 1),
            ..MemoryStep::default()
        }
    }

    #[test]
    fn create_trims_and_clamps() {
        let store = InMemoryStore::new();
        let agent = store
            .create_agent("  Zeta_Axis ", Traits::new(1.7, -0.2, 0.4), None)
            .unwrap();
        assert_eq!(agent.name, "Zeta_Axis");
        assert_eq!(agent.level, 1);
        assert!(agent.traits.in_bounds());
        assert!(agent.mutations.is_empty());
        assert_eq!(store.get_agent("Zeta_Axis").unwrap(), agent);
    }

    #[test]
    fn create_rejects_empty_and_duplicate_names() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.create_agent("   ", Traits::default(), None),
            Err(StoreError::InvalidName(String::new()))
        );
        store.create_agent("Neo_Loop", Traits::default(), None).unwrap();
        assert_eq!(
            store.create_agent("Neo_Loop", Traits::default(), None),
            Err(StoreError::DuplicateName("Neo_Loop".to_owned()))
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn creation_note_opens_empty_log() {
        let store = InMemoryStore::new();
        let agent = store
            .create_agent("Neo_Loop", Traits::default(), Some("Injected Supreme Agent"))
            .unwrap();
        let memory = store.memory(agent.id).unwrap();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory[0].note, "Injected Supreme Agent");
        assert!(memory[0].steps.is_empty());

        let quiet = store.create_agent("Neo_Axis", Traits::default(), None).unwrap();
        assert!(store.memory(quiet.id).unwrap().is_empty());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = InMemoryStore::new();
        for name in ["Omega_Pulse", "Alpha_Loop", "Hyper_Crux"] {
            store.create_agent(name, Traits::default(), None).unwrap();
        }
        let names: Vec<String> = store
            .list_agents()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["Omega_Pulse", "Alpha_Loop", "Hyper_Crux"]);
    }

    #[test]
    fn commit_applies_every_write() {
        let store = InMemoryStore::new();
        let agent = store.create_agent("Glyph_Delta", Traits::default(), None).unwrap();
        let steps = [step(0), step(1)];
        let mutations = [MutationEvent {
            name: "loop_unroller".to_owned(),
            value: MutationValue::Flag(true),
        }];
        let commit = RunCommit {
            agent_id: agent.id,
            note: "Simulation started at 2024-01-01 00:00:00",
            steps: &steps,
            mutations: &mutations,
            traits: Some(Traits::new(0.1, 0.2, 0.3)),
            level: Some(2),
        };
        store.commit_run(&commit).unwrap();

        let stored = store.get_agent("Glyph_Delta").unwrap();
        assert_eq!(stored.level, 2);
        assert_eq!(stored.traits, Traits::new(0.1, 0.2, 0.3));
        assert_eq!(
            stored.mutations.get("loop_unroller"),
            Some(&MutationValue::Flag(true))
        );
        let memory = store.memory(agent.id).unwrap();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory[0].steps.len(), 2);
    }

    #[test]
    fn commit_for_unknown_agent_writes_nothing() {
        let store = InMemoryStore::new();
        let agent = store.create_agent("Glyph_Delta", Traits::default(), None).unwrap();
        let commit = RunCommit {
            agent_id: AgentId::new(),
            note: "orphan",
            steps: &[],
            mutations: &[],
            traits: None,
            level: None,
        };
        assert!(matches!(
            store.commit_run(&commit),
            Err(StoreError::AgentNotFound { .. })
        ));
        assert!(store.memory(agent.id).unwrap().is_empty());
    }

    #[test]
    fn mutation_overwrites_same_name() {
        let store = InMemoryStore::new();
        let agent = store.create_agent("Glyph_Delta", Traits::default(), None).unwrap();
        for value in [0.1, 0.1] {
            store
                .record_mutation(
                    agent.id,
                    &MutationEvent {
                        name: "resilience_bonus".to_owned(),
                        value: MutationValue::Amount(value),
                    },
                )
                .unwrap();
        }
        assert_eq!(store.get_agent("Glyph_Delta").unwrap().mutation_count(), 1);
    }

    #[test]
    fn exports_are_listed_per_agent() {
        let store = InMemoryStore::new();
        let a = store.create_agent("A", Traits::default(), None).unwrap();
        let b = store.create_agent("B", Traits::default(), None).unwrap();
        let record = ExportRecord {
            id: ExportId::new(),
            agent_id: a.id,
            format: ExportFormat::Summary,
            location: "data/exports/a.txt".to_owned(),
            size_bytes: 12,
            created_at: Utc::now(),
        };
        store.record_export(&record).unwrap();
        assert_eq!(store.exports(a.id).unwrap(), vec![record]);
        assert!(store.exports(b.id).unwrap().is_empty());
    }

    #[test]
    fn unknown_lookups_fail() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_agent("ghost"),
            Err(StoreError::AgentNotFound { .. })
        ));
        assert!(store.update_level(AgentId::new(), 3).is_err());
        assert!(store.is_empty().unwrap());
    }
}

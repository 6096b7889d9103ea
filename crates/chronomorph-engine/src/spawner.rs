//! Agent spawner for seeding an empty store.
//!
//! When no seed agents were imported, the engine injects a handful of
//! maxed-out agents so a session always has something to simulate. Names
//! combine a prefix and a suffix from fixed pools and are unique within
//! the store.

use std::collections::BTreeSet;

use chronomorph_core::AgentStore;
use chronomorph_types::{Agent, Traits};
use rand::Rng;
use tracing::info;

use crate::error::EngineError;

/// Note recorded on every spawned agent's first memory log.
pub const SPAWN_NOTE: &str = "Injected Supreme Agent";

const PREFIXES: &[&str] = &["Neo", "Hyper", "Glyph", "Zeta", "Omega"];
const SUFFIXES: &[&str] = &["Pulse", "Loop", "Delta", "Crux", "Axis"];

/// Pick a random `Prefix_Suffix` name not in `taken`.
///
/// Once every combination is taken, a numeric suffix is appended to a
/// random combination until the name is free.
pub fn pick_unused_name(rng: &mut impl Rng, taken: &BTreeSet<String>) -> String {
    let available: Vec<String> = PREFIXES
        .iter()
        .flat_map(|p| SUFFIXES.iter().map(move |s| format!("{p}_{s}")))
        .filter(|name| !taken.contains(name))
        .collect();

    if available.is_empty() {
        let prefix = PREFIXES
            .get(rng.random_range(0..PREFIXES.len()))
            .copied()
            .unwrap_or("Neo");
        let suffix = SUFFIXES
            .get(rng.random_range(0..SUFFIXES.len()))
            .copied()
            .unwrap_or("Pulse");
        return (2_u32..=u32::MAX)
            .map(|n| format!("{prefix}_{suffix}_{n}"))
            .find(|name| !taken.contains(name))
            .unwrap_or_else(|| format!("{prefix}_{suffix}"));
    }

    let idx = rng.random_range(0..available.len());
    available.into_iter().nth(idx).unwrap_or_default()
}

/// Create `count` agents with every trait at 1.0.
///
/// # Errors
///
/// Returns [`EngineError::Store`] if the store rejects an agent.
pub fn spawn_agents(
    store: &dyn AgentStore,
    count: u32,
    rng: &mut impl Rng,
) -> Result<Vec<Agent>, EngineError> {
    let mut taken: BTreeSet<String> = store.list_agents()?.into_iter().map(|a| a.name).collect();
    let mut spawned = Vec::new();

    for _ in 0..count {
        let name = pick_unused_name(rng, &taken);
        let agent = store.create_agent(&name, Traits::uniform(1.0), Some(SPAWN_NOTE))?;
        info!(agent = %agent.name, agent_id = %agent.id, "Agent spawned");
        taken.insert(name);
        spawned.push(agent);
    }

    Ok(spawned)
}

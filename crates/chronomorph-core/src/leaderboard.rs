//! Leaderboard scoring and ranking.
//!
//! ```text
//! score = level * 10 + stability * 30 + novelty * 20 + recursion * 20
//!       + mutation_count * 15
//! ```
//!
//! Ranking sorts by the unrounded score, descending. The sort is stable, so
//! equal scores keep their input order.

use chronomorph_types::{Agent, LeaderboardEntry};

/// Points per level.
pub const LEVEL_WEIGHT: f64 = 10.0;
/// Points per unit of stability.
pub const STABILITY_WEIGHT: f64 = 30.0;
/// Points per unit of novelty.
pub const NOVELTY_WEIGHT: f64 = 20.0;
/// Points per unit of recursion.
pub const RECURSION_WEIGHT: f64 = 20.0;
/// Points per distinct mutation.
pub const MUTATION_WEIGHT: f64 = 15.0;

/// Unrounded score of one agent.
#[allow(clippy::suboptimal_flops)]
pub fn score(agent: &Agent) -> f64 {
    let mutations = u32::try_from(agent.mutation_count()).unwrap_or(u32::MAX);
    f64::from(agent.level) * LEVEL_WEIGHT
        + agent.traits.stability * STABILITY_WEIGHT
        + agent.traits.novelty * NOVELTY_WEIGHT
        + agent.traits.recursion * RECURSION_WEIGHT
        + f64::from(mutations) * MUTATION_WEIGHT
}

/// Score and rank a collection of agents.
pub fn rank(agents: &[Agent]) -> Vec<LeaderboardEntry> {
    let mut scored: Vec<(f64, &Agent)> = agents.iter().map(|a| (score(a), a)).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
        .into_iter()
        .enumerate()
        .map(|(index, (score, agent))| LeaderboardEntry {
            rank: index.saturating_add(1),
            name: agent.name.clone(),
            level: agent.level,
            traits: agent.traits,
            mutation_count: agent.mutation_count(),
            score,
        })
        .collect()
}

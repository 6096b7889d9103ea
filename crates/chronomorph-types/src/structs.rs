//! Core entity structs for the `ChronoMorph` simulation.
//!
//! Covers the persisted agent record, the per-rung memory step, the entropy
//! delta and alert records produced by a run, mutation events, export
//! records, and the derived leaderboard row.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AlertKind, ExportFormat, TraitKind};
use crate::ids::{AgentId, ExportId, MemoryId};

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Clamp a value into the closed unit interval `[0, 1]`.
///
/// `NaN` maps to `0.0` so a bad input can never leak into a stored trait.
pub const fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Round a value to three decimal places (the recorded precision of a step).
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The three bounded behavioral traits of an agent.
///
/// Every value is kept inside `[0, 1]`; all constructors and updaters clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Probability of a novel rung; raises entropy.
    #[serde(default = "default_trait")]
    pub novelty: f64,
    /// Probability of a recursive rung.
    #[serde(default = "default_trait")]
    pub recursion: f64,
    /// Probability of an error-free rung; lowers entropy, raises reward.
    #[serde(default = "default_trait")]
    pub stability: f64,
}

const fn default_trait() -> f64 {
    0.5
}

impl Default for Traits {
    fn default() -> Self {
        Self::uniform(default_trait())
    }
}

impl Traits {
    /// Create a trait vector, clamping each value into `[0, 1]`.
    pub const fn new(novelty: f64, recursion: f64, stability: f64) -> Self {
        Self {
            novelty: clamp_unit(novelty),
            recursion: clamp_unit(recursion),
            stability: clamp_unit(stability),
        }
    }

    /// Create a trait vector with every trait set to the same value.
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value)
    }

    /// Return the value of a single trait.
    pub const fn get(&self, kind: TraitKind) -> f64 {
        match kind {
            TraitKind::Novelty => self.novelty,
            TraitKind::Recursion => self.recursion,
            TraitKind::Stability => self.stability,
        }
    }

    /// Return a copy with one trait replaced (clamped into `[0, 1]`).
    #[must_use]
    pub const fn with(mut self, kind: TraitKind, value: f64) -> Self {
        let value = clamp_unit(value);
        match kind {
            TraitKind::Novelty => self.novelty = value,
            TraitKind::Recursion => self.recursion = value,
            TraitKind::Stability => self.stability = value,
        }
        self
    }

    /// Return a copy with every trait clamped into `[0, 1]`.
    #[must_use]
    pub const fn clamped(self) -> Self {
        Self::new(self.novelty, self.recursion, self.stability)
    }

    /// Whether every trait lies inside `[0, 1]`.
    pub fn in_bounds(&self) -> bool {
        TraitKind::ALL
            .iter()
            .all(|kind| (0.0..=1.0).contains(&self.get(*kind)))
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// The value attached to a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MutationValue {
    /// A mode switch (e.g. `creative_mode = true`).
    Flag(bool),
    /// A numeric bonus (e.g. `resilience_bonus = 0.1`).
    Amount(f64),
    /// A named token (e.g. `mutation_token = "chaos_seed"`).
    Token(String),
}

impl core::fmt::Display for MutationValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Amount(amount) => write!(f, "{amount}"),
            Self::Token(token) => f.write_str(token),
        }
    }
}

/// A mutation fired during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    /// Mutation name, unique within one run.
    pub name: String,
    /// Value recorded on the agent.
    pub value: MutationValue,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// An agent snapshot as held by the persistence collaborator.
///
/// The engine never mutates a stored agent in place: it reads a snapshot and
/// returns a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Store-assigned identifier.
    pub id: AgentId,
    /// Unique display name; the lookup key for requests.
    pub name: String,
    /// Current trait values.
    pub traits: Traits,
    /// Progression level, starting at 1 and never decreasing.
    pub level: u32,
    /// Permanent mutation records keyed by mutation name.
    #[serde(default)]
    pub mutations: BTreeMap<String, MutationValue>,
    /// When the agent was created.
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Number of distinct mutation names recorded on the agent.
    pub fn mutation_count(&self) -> usize {
        self.mutations.len()
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// One rung of a simulation run, as appended to the agent's memory.
///
/// Entropy and reward values are recorded at three-decimal precision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStep {
    /// Zero-based rung index within its run.
    pub rung_id: u32,
    /// Entropy reading of this rung (same as `entropy_after`).
    pub entropy: f64,
    /// Entropy reading carried in from the previous rung (0 for rung 0).
    pub entropy_before: f64,
    /// Entropy reading after this rung.
    pub entropy_after: f64,
    /// Reward earned on this rung.
    pub reward: f64,
    /// Human-readable label for the rung.
    pub note: String,
    /// Whether the rung behaved recursively.
    pub recursive: bool,
    /// Whether the rung produced a novel outcome.
    pub novel: bool,
    /// Whether the rung errored.
    pub error: bool,
}

/// An ordered group of memory steps: one simulation run or a creation note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryLog {
    /// Store-assigned identifier.
    pub id: MemoryId,
    /// Free-text note describing the log.
    pub note: String,
    /// When the log was opened.
    pub started_at: DateTime<Utc>,
    /// Steps in rung order.
    pub steps: Vec<MemoryStep>,
}

// ---------------------------------------------------------------------------
// Entropy
// ---------------------------------------------------------------------------

/// Signed change in entropy between a rung and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyDelta {
    /// Rung the delta belongs to.
    pub rung: u32,
    /// `current - previous`; previous is 0 for the first rung.
    pub delta: f64,
    /// Whether the delta exceeded the spike threshold.
    pub spike: bool,
}

/// A pattern detected over a run's entropy deltas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntropyAlert {
    /// Rung at which the pattern was detected.
    pub rung: u32,
    /// Classification of the pattern.
    pub alert: AlertKind,
    /// The delta at that rung.
    pub delta: f64,
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// A produced asset, recorded against the agent it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Identifier of the export; also the asset file stem.
    pub id: ExportId,
    /// The agent the asset describes.
    pub agent_id: AgentId,
    /// Asset format.
    pub format: ExportFormat,
    /// Opaque asset reference (file path or URL).
    pub location: String,
    /// Asset size in bytes.
    pub size_bytes: u64,
    /// When the asset was produced.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// A ranked leaderboard row. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// One-based position in the ranking.
    pub rank: usize,
    /// Agent name.
    pub name: String,
    /// Agent level.
    pub level: u32,
    /// Agent traits.
    pub traits: Traits,
    /// Number of distinct mutations recorded on the agent.
    pub mutation_count: usize,
    /// Unrounded score used for ordering.
    pub score: f64,
}

impl LeaderboardEntry {
    /// The score rounded to the nearest integer for display.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn display_score(&self) -> i64 {
        // Scores are bounded by level * 10 plus a small constant; well inside i64.
        self.score.round() as i64
    }
}

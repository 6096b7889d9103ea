//! Shared type definitions for the `ChronoMorph` rung simulation.
//!
//! This crate is the single source of truth for the data that flows between
//! the engine, the persistence collaborator, and the export collaborator.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for agents, memory logs, and exports
//! - [`enums`] -- Trait kinds, entropy alert kinds, and export formats
//! - [`structs`] -- Agents, memory steps, entropy deltas, mutations, leaderboard rows

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AlertKind, ExportFormat, TraitKind, UnsupportedFormat};
pub use ids::{AgentId, ExportId, MemoryId};
pub use structs::{
    Agent, EntropyAlert, EntropyDelta, ExportRecord, LeaderboardEntry, MemoryLog, MemoryStep,
    MutationEvent, MutationValue, Traits, clamp_unit, round3,
};

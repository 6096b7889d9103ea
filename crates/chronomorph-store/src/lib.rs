//! Agent storage for `ChronoMorph`.
//!
//! Provides [`InMemoryStore`], an [`AgentStore`] that keeps every agent,
//! memory log, and export record behind one lock and applies each run
//! commit atomically, plus a JSON importer for seed agents.
//!
//! # Modules
//!
//! - [`memory`] -- The in-memory [`AgentStore`] implementation.
//! - [`import`] -- Loading seed agents from a directory of JSON files.
//!
//! [`AgentStore`]: chronomorph_core::AgentStore

pub mod import;
pub mod memory;

pub use import::{ImportError, SeedAgent, import_agents_from_dir};
pub use memory::InMemoryStore;

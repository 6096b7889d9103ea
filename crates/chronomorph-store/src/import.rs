//! Loading seed agents from a directory of JSON files.
//!
//! Each `*.json` file holds one agent:
//!
//! ```text
//! {
//!   "name": "Neo_Pulse",
//!   "traits": { "novelty": 0.7, "recursion": 0.4, "stability": 0.9 },
//!   "memory": { "note": "Seed memory", "steps": [] },
//!   "level": 3
//! }
//! ```
//!
//! `memory` and `level` are optional. Missing trait fields default to 0.5.

use std::path::{Path, PathBuf};

use chronomorph_core::{AgentStore, StoreError};
use chronomorph_types::{MemoryStep, Traits};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Errors that can occur while importing seed agents.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The seed directory or a seed file could not be read.
    #[error("failed to read seed data: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A seed file is not a valid agent document.
    #[error("invalid seed agent {path}: {source}")]
    Json {
        /// The offending file.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The store rejected an agent.
    #[error("failed to store seed agent: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// A seed agent as stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedAgent {
    /// Agent name.
    pub name: String,
    /// Initial traits.
    #[serde(default)]
    pub traits: Traits,
    /// Optional initial memory log.
    #[serde(default)]
    pub memory: Option<SeedMemory>,
    /// Optional starting level.
    #[serde(default)]
    pub level: Option<u32>,
}

/// The initial memory log of a [`SeedAgent`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedMemory {
    /// Log note.
    #[serde(default)]
    pub note: String,
    /// Steps recorded in the log.
    #[serde(default)]
    pub steps: Vec<MemoryStep>,
}

impl SeedAgent {
    /// Read one seed agent from `path`.
    pub fn from_file(path: &Path) -> Result<Self, ImportError> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| ImportError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Create this agent in `store`, with its memory and level.
    pub fn insert_into(&self, store: &dyn AgentStore) -> Result<(), ImportError> {
        let agent = store.create_agent(&self.name, self.traits, None)?;
        if let Some(memory) = &self.memory {
            store.append_memory_steps(agent.id, &memory.note, &memory.steps)?;
        }
        if let Some(level) = self.level.filter(|&l| l > 1) {
            store.update_level(agent.id, level)?;
        }
        Ok(())
    }
}

/// Import every `*.json` agent in `dir` into `store`.
///
/// Runs only when the store is empty; otherwise returns `Ok(0)`. A missing
/// directory also yields `Ok(0)`. Files that cannot be read, parsed, or
/// stored are skipped with a warning. Files are imported in path order.
///
/// # Errors
///
/// Returns [`ImportError::Io`] if `dir` exists but cannot be listed, and
/// [`ImportError::Store`] if the store itself becomes unusable.
pub fn import_agents_from_dir(store: &dyn AgentStore, dir: &Path) -> Result<usize, ImportError> {
    if !store.list_agents()?.is_empty() {
        debug!(dir = %dir.display(), "Store already populated, skipping seed import");
        return Ok(0);
    }
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "Seed directory not found");
        return Ok(0);
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut imported: usize = 0;
    for path in &paths {
        match SeedAgent::from_file(path).and_then(|seed| seed.insert_into(store)) {
            Ok(()) => imported = imported.saturating_add(1),
            Err(ImportError::Store {
                source: StoreError::LockPoisoned,
            }) => return Err(StoreError::LockPoisoned.into()),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping seed agent"),
        }
    }

    info!(dir = %dir.display(), imported, "Seed agents imported");
    Ok(imported)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn imports_valid_files_and_skips_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a.json",
            r#"{"name": "Neo_Pulse", "traits": {"novelty": 0.7, "recursion": 0.4, "stability": 0.9}, "level": 3}"#,
        );
        write(
            dir.path(),
            "b.json",
            r#"{"name": "Zeta_Loop", "traits": {"novelty": 0.2},
                "memory": {"note": "Seed memory", "steps": [{"rung_id": 0, "entropy": 0.4}]}}"#,
        );
        write(dir.path(), "broken.json", "{ not json");
        write(dir.path(), "notes.txt", "ignored");

        let store = InMemoryStore::new();
        let count = import_agents_from_dir(&store, dir.path()).unwrap();
        assert_eq!(count, 2);

        let neo = store.get_agent("Neo_Pulse").unwrap();
        assert_eq!(neo.level, 3);
        assert!((neo.traits.stability - 0.9).abs() < f64::EPSILON);

        let zeta = store.get_agent("Zeta_Loop").unwrap();
        assert!((zeta.traits.recursion - 0.5).abs() < f64::EPSILON);
        let memory = store.memory(zeta.id).unwrap();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.first().map(|m| m.steps.len()), Some(1));
    }

    #[test]
    fn populated_store_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"name": "Neo_Pulse"}"#);

        let store = InMemoryStore::new();
        store.create_agent("Existing", Traits::default(), None).unwrap();
        assert_eq!(import_agents_from_dir(&store, dir.path()).unwrap(), 0);
        assert!(store.get_agent("Neo_Pulse").is_err());
    }

    #[test]
    fn missing_directory_imports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryStore::new();
        let count = import_agents_from_dir(&store, &dir.path().join("absent")).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn duplicate_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"name": "Neo_Pulse"}"#);
        write(dir.path(), "b.json", r#"{"name": "Neo_Pulse"}"#);

        let store = InMemoryStore::new();
        assert_eq!(import_agents_from_dir(&store, dir.path()).unwrap(), 1);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", r#"{"traits": {}}"#);
        let err = SeedAgent::from_file(&dir.path().join("bad.json")).unwrap_err();
        assert!(matches!(err, ImportError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }
}

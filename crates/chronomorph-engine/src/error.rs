//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode of startup and the simulation session.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: chronomorph_core::ConfigError,
    },

    /// Logging could not be initialized.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },

    /// The agent store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: chronomorph_core::StoreError,
    },

    /// Seed agent import failed.
    #[error("import error: {source}")]
    Import {
        /// The underlying import error.
        #[from]
        source: chronomorph_store::ImportError,
    },

    /// A simulation run failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: chronomorph_core::SimulationError,
    },
}

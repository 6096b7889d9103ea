//! Error types for the chronomorph-core crate.
//!
//! Random draws cannot fail and all arithmetic runs on clamped floats, so
//! the only failures a simulation can report are an unknown agent, an
//! invalid request, a persistence error, or an explicit export failure.

use crate::export::ExportError;
use crate::service::RunResult;
use crate::store::StoreError;

/// Errors surfaced by [`Simulator`](crate::service::Simulator) operations.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// No agent with the requested name exists.
    #[error("agent not found: {name}")]
    AgentNotFound {
        /// The name that failed to resolve.
        name: String,
    },

    /// The request was rejected before any rung executed.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Why the request was rejected.
        reason: String,
    },

    /// The persistence collaborator failed.
    ///
    /// When the failure happened while committing a run, the computed
    /// result is carried here so the caller can retry or inspect it.
    #[error("persistence failure: {source}")]
    PersistenceFailure {
        /// The underlying store error.
        source: StoreError,
        /// The run result that could not be persisted, if any.
        result: Option<Box<RunResult>>,
    },

    /// An explicitly requested export failed.
    #[error("export failed: {source}")]
    ExportFailed {
        /// The underlying exporter error.
        #[from]
        source: ExportError,
    },
}

impl SimulationError {
    /// Shorthand for [`SimulationError::InvalidConfiguration`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// The run result attached to a persistence failure, if any.
    pub fn into_unpersisted_result(self) -> Option<RunResult> {
        match self {
            Self::PersistenceFailure { result, .. } => result.map(|r| *r),
            _ => None,
        }
    }
}

impl From<StoreError> for SimulationError {
    fn from(source: StoreError) -> Self {
        match source {
            StoreError::AgentNotFound { agent } => Self::AgentNotFound { name: agent },
            rejected @ (StoreError::DuplicateName(_) | StoreError::InvalidName(_)) => {
                Self::InvalidConfiguration {
                    reason: rejected.to_string(),
                }
            }
            other => Self::PersistenceFailure {
                source: other,
                result: None,
            },
        }
    }
}

//! The media/export collaborator contract.

use chronomorph_types::{Agent, ExportFormat, ExportRecord, MemoryLog};

/// Errors reported by a [`MediaExporter`].
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The exporter cannot produce this format.
    #[error("export format not supported by this exporter: {format}")]
    Unsupported {
        /// The requested format.
        format: ExportFormat,
    },

    /// Writing the asset failed.
    #[error("failed to write export: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Rendering the asset content failed.
    #[error("failed to render export: {reason}")]
    Serialization {
        /// What went wrong.
        reason: String,
    },
}

/// Produces an asset from an agent and its memory.
///
/// The returned [`ExportRecord::location`] is opaque to the engine.
pub trait MediaExporter {
    /// Render `agent` and `memory` in `format`.
    fn export(
        &self,
        agent: &Agent,
        memory: &[MemoryLog],
        format: ExportFormat,
    ) -> Result<ExportRecord, ExportError>;
}

//! File-based export collaborator for `ChronoMorph`.
//!
//! [`FileExporter`] writes a plain-text summary of an agent and its memory
//! into an export directory. Video, image, and audio formats are produced
//! by external tooling and are reported as unsupported here.

pub mod summary;

use std::path::{Path, PathBuf};

use chrono::Utc;
use chronomorph_core::{ExportError, MediaExporter};
use chronomorph_types::{Agent, ExportFormat, ExportId, ExportRecord, MemoryLog};
use tracing::info;

pub use summary::render_summary;

/// Writes exports as files under one directory.
#[derive(Debug, Clone)]
pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    /// Export into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The export directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MediaExporter for FileExporter {
    fn export(
        &self,
        agent: &Agent,
        memory: &[MemoryLog],
        format: ExportFormat,
    ) -> Result<ExportRecord, ExportError> {
        if format != ExportFormat::Summary {
            return Err(ExportError::Unsupported { format });
        }

        let contents = render_summary(agent, memory, Utc::now())?;
        let id = ExportId::new();
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{id}.{}", format.extension()));
        std::fs::write(&path, &contents)?;

        let record = ExportRecord {
            id,
            agent_id: agent.id,
            format,
            location: path.display().to_string(),
            size_bytes: u64::try_from(contents.len()).unwrap_or(u64::MAX),
            created_at: Utc::now(),
        };
        info!(agent = %agent.name, %format, location = %record.location, "Export written");
        Ok(record)
    }
}

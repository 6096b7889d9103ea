//! Enumeration types for the `ChronoMorph` simulation.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// One of the three behavioral traits carried by every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    /// Bias toward novel outcomes; raises rung entropy.
    Novelty,
    /// Bias toward recursive outcomes.
    Recursion,
    /// Bias toward error-free outcomes; lowers entropy and raises reward.
    Stability,
}

impl TraitKind {
    /// All trait kinds in canonical order.
    pub const ALL: [Self; 3] = [Self::Novelty, Self::Recursion, Self::Stability];

    /// Lowercase name used in logs and serialized maps.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Novelty => "novelty",
            Self::Recursion => "recursion",
            Self::Stability => "stability",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entropy alerts
// ---------------------------------------------------------------------------

/// Classification label attached to an entropy alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Entropy jumped upward between consecutive rungs.
    Spike,
    /// Entropy fell sharply between consecutive rungs.
    Collapse,
    /// Entropy kept rising across several consecutive rungs.
    SustainedRise,
}

impl AlertKind {
    /// Human-readable label for display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spike => "entropy spike",
            Self::Collapse => "entropy collapse",
            Self::SustainedRise => "sustained entropy rise",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Export formats
// ---------------------------------------------------------------------------

/// Asset format requested from the export collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Replay video.
    Mp4,
    /// Animated replay.
    Gif,
    /// Audio theme derived from traits.
    Wav,
    /// Plain-text summary of the agent and its memory.
    Summary,
}

impl ExportFormat {
    /// Canonical lowercase name of the format.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Gif => "gif",
            Self::Wav => "wav",
            Self::Summary => "summary",
        }
    }

    /// File extension used for assets of this format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Gif => "gif",
            Self::Wav => "wav",
            Self::Summary => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested export format is not one of the known [`ExportFormat`]s.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported export format: {0}")]
pub struct UnsupportedFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "gif" => Ok(Self::Gif),
            "wav" => Ok(Self::Wav),
            "summary" | "txt" => Ok(Self::Summary),
            _ => Err(UnsupportedFormat(s.to_owned())),
        }
    }
}

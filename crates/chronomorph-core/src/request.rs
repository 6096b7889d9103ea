//! Caller-facing run request and its validation.
//!
//! A [`RunRequest`] arrives from whatever transport the caller uses. It is
//! validated into [`RunSettings`] before the engine sees it, so an invalid
//! request never executes a single rung.

use chronomorph_types::ExportFormat;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Upper bound on rungs when the caller does not configure one.
pub const DEFAULT_MAX_RUNGS: u32 = 1000;

/// A request to simulate one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Name of the agent to simulate.
    pub agent_name: String,

    /// Number of rungs; must be positive and within the configured maximum.
    #[serde(default = "default_rungs")]
    pub rungs: i64,

    /// Multiplier on the reward draw.
    #[serde(default = "default_reward_bias")]
    pub reward_bias: f64,

    /// Whether mutation rules, renormalization, and leveling run.
    #[serde(default = "default_true")]
    pub enable_mutation: bool,

    /// Optional asset to produce once the run has been persisted.
    #[serde(default)]
    pub export_format: Option<String>,
}

const fn default_rungs() -> i64 {
    10
}

const fn default_reward_bias() -> f64 {
    0.5
}

const fn default_true() -> bool {
    true
}

impl RunRequest {
    /// A request for `agent_name` with default parameters.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            rungs: default_rungs(),
            reward_bias: default_reward_bias(),
            enable_mutation: true,
            export_format: None,
        }
    }

    /// Set the rung count.
    #[must_use]
    pub const fn with_rungs(mut self, rungs: i64) -> Self {
        self.rungs = rungs;
        self
    }

    /// Set the reward bias.
    #[must_use]
    pub const fn with_reward_bias(mut self, reward_bias: f64) -> Self {
        self.reward_bias = reward_bias;
        self
    }

    /// Enable or disable mutation.
    #[must_use]
    pub const fn with_mutation(mut self, enable_mutation: bool) -> Self {
        self.enable_mutation = enable_mutation;
        self
    }

    /// Request a post-run export.
    #[must_use]
    pub fn with_export(mut self, format: impl Into<String>) -> Self {
        self.export_format = Some(format.into());
        self
    }

    /// Validate the request against `max_rungs`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] when the rung count
    /// is not positive or exceeds `max_rungs`, the reward bias is not
    /// finite, or the export format is unsupported.
    pub fn validate(&self, max_rungs: u32) -> Result<RunSettings, SimulationError> {
        if self.rungs <= 0 {
            return Err(SimulationError::invalid(format!(
                "rung count must be positive, got {}",
                self.rungs
            )));
        }
        let rungs = u32::try_from(self.rungs)
            .ok()
            .filter(|r| *r <= max_rungs)
            .ok_or_else(|| {
                SimulationError::invalid(format!(
                    "rung count {} exceeds the maximum of {max_rungs}",
                    self.rungs
                ))
            })?;

        if !self.reward_bias.is_finite() {
            return Err(SimulationError::invalid("reward bias must be a finite number"));
        }

        let export = self
            .export_format
            .as_deref()
            .map(str::parse::<ExportFormat>)
            .transpose()
            .map_err(|e| SimulationError::invalid(e.to_string()))?;

        Ok(RunSettings {
            rungs,
            reward_bias: self.reward_bias,
            enable_mutation: self.enable_mutation,
            export,
        })
    }
}

/// Validated run parameters consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    /// Number of rungs, at least one.
    pub rungs: u32,
    /// Multiplier on the reward draw.
    pub reward_bias: f64,
    /// Whether mutation rules, renormalization, and leveling run.
    pub enable_mutation: bool,
    /// Post-run export, if any.
    pub export: Option<ExportFormat>,
}

impl RunSettings {
    /// Settings for `rungs` rungs with mutation enabled and no export.
    pub const fn new(rungs: u32, reward_bias: f64, enable_mutation: bool) -> Self {
        Self {
            rungs,
            reward_bias,
            enable_mutation,
            export: None,
        }
    }
}

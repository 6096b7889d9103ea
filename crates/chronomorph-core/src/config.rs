//! Configuration loading and typed config structures for `ChronoMorph`.
//!
//! The canonical configuration lives in `chronomorph-config.yaml` in the
//! working directory. Every section is optional; a missing section or a
//! missing file yields the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::entropy::AlertConfig;
use crate::request::{DEFAULT_MAX_RUNGS, RunRequest};

/// Environment variable that overrides `signal.seed`.
pub const SEED_ENV_VAR: &str = "CHRONOMORPH_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `chronomorph-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Hard limits applied to every request.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Defaults for request fields the caller omits.
    #[serde(default)]
    pub defaults: RunDefaults,

    /// Thresholds for the default alert detector.
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Random signal settings.
    #[serde(default)]
    pub signal: SignalConfig,

    /// Seed agent storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Export settings.
    #[serde(default)]
    pub exports: ExportConfig,

    /// The scripted session the engine binary runs.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `CHRONOMORPH_SEED` overrides `signal.seed` when set to a valid
    /// unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Like [`EngineConfig::from_file`], but a missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.signal.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.signal.apply_env_overrides();
        Ok(config)
    }
}

/// Hard limits applied to every request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted rung count.
    #[serde(default = "default_max_rungs")]
    pub max_rungs: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_rungs: default_max_rungs(),
        }
    }
}

/// Defaults for request fields the caller omits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunDefaults {
    /// Rung count.
    #[serde(default = "default_rungs")]
    pub rungs: i64,

    /// Reward bias.
    #[serde(default = "default_reward_bias")]
    pub reward_bias: f64,

    /// Whether mutation is enabled.
    #[serde(default = "default_true")]
    pub enable_mutation: bool,
}

impl RunDefaults {
    /// A request for `agent_name` populated from these defaults.
    pub fn request(&self, agent_name: impl Into<String>) -> RunRequest {
        RunRequest::new(agent_name)
            .with_rungs(self.rungs)
            .with_reward_bias(self.reward_bias)
            .with_mutation(self.enable_mutation)
    }
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            rungs: default_rungs(),
            reward_bias: default_reward_bias(),
            enable_mutation: true,
        }
    }
}

/// Random signal settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignalConfig {
    /// Fixed seed for reproducible sessions. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SignalConfig {
    /// Override the seed with `CHRONOMORPH_SEED` when it is set and parses.
    pub fn apply_env_overrides(&mut self) {
        self.apply_seed_override(std::env::var(SEED_ENV_VAR).ok().as_deref());
    }

    /// Replace the seed with `raw` when it parses as a `u64`. Anything else
    /// leaves the configured seed in place.
    pub fn apply_seed_override(&mut self, raw: Option<&str>) {
        if let Some(seed) = raw.and_then(|val| val.trim().parse::<u64>().ok()) {
            self.seed = Some(seed);
        }
    }
}

/// Seed agent storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory scanned for `*.json` seed agents.
    #[serde(default = "default_seed_dir")]
    pub seed_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seed_dir: default_seed_dir(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    /// Directory exports are written to.
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,

    /// Format requested after every session run, if any.
    #[serde(default)]
    pub post_run_format: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
            post_run_format: None,
        }
    }
}

/// The scripted session the engine binary runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionConfig {
    /// Agents spawned when no seed agents were imported.
    #[serde(default = "default_seed_agents")]
    pub seed_agents: u32,

    /// Runs executed per agent.
    #[serde(default = "default_runs_per_agent")]
    pub runs_per_agent: u32,

    /// Rungs per session run.
    #[serde(default = "default_session_rungs")]
    pub rungs: i64,

    /// Reward bias for session runs.
    #[serde(default = "default_session_reward_bias")]
    pub reward_bias: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed_agents: default_seed_agents(),
            runs_per_agent: default_runs_per_agent(),
            rungs: default_session_rungs(),
            reward_bias: default_session_reward_bias(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

const fn default_max_rungs() -> u32 {
    DEFAULT_MAX_RUNGS
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

fn default_seed_dir() -> PathBuf {
    PathBuf::from("data/agents")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("data/exports")
}

const fn default_seed_agents() -> u32 {
    3
}

const fn default_runs_per_agent() -> u32 {
    5
}

const fn default_session_rungs() -> i64 {
    20
}

const fn default_session_reward_bias() -> f64 {
    0.9
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "text".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.limits.max_rungs, 1000);
        assert_eq!(config.defaults.rungs, 10);
        assert!(config.defaults.enable_mutation);
        assert_eq!(config.alerts.sustained_rise_rungs, 3);
        assert_eq!(config.session.seed_agents, 3);
        assert_eq!(config.session.runs_per_agent, 5);
        assert_eq!(config.storage.seed_dir, PathBuf::from("data/agents"));
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
limits:
  max_rungs: 250

defaults:
  rungs: 12
  reward_bias: 0.7
  enable_mutation: false

alerts:
  spike_threshold: 0.3
  collapse_threshold: 0.25
  sustained_rise_rungs: 4

storage:
  seed_dir: "fixtures/agents"

exports:
  dir: "out"
  post_run_format: "summary"

session:
  seed_agents: 2
  runs_per_agent: 1
  rungs: 8
  reward_bias: 0.4

logging:
  level: "debug"
  format: "json"
"#;

        let config = EngineConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.limits.max_rungs, 250);
        assert_eq!(config.defaults.rungs, 12);
        assert!(!config.defaults.enable_mutation);
        assert!((config.alerts.spike_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.alerts.sustained_rise_rungs, 4);
        assert_eq!(config.storage.seed_dir, PathBuf::from("fixtures/agents"));
        assert_eq!(config.exports.dir, PathBuf::from("out"));
        assert_eq!(config.exports.post_run_format.as_deref(), Some("summary"));
        assert_eq!(config.session.seed_agents, 2);
        assert_eq!(config.session.rungs, 8);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "limits:\n  max_rungs: 50\n";
        let config = EngineConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Limit is overridden
        assert_eq!(config.limits.max_rungs, 50);
        // Everything else uses defaults
        assert_eq!(config.defaults.rungs, 10);
        assert!((config.session.reward_bias - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = EngineConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        let config = EngineConfig::parse("limits: [unclosed");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn seed_override_replaces_configured_seed() {
        let mut signal = SignalConfig { seed: Some(5) };
        signal.apply_seed_override(Some(" 42 "));
        assert_eq!(signal.seed, Some(42));

        let mut unset = SignalConfig::default();
        unset.apply_seed_override(Some("7"));
        assert_eq!(unset.seed, Some(7));
    }

    #[test]
    fn seed_override_ignores_missing_or_invalid_values() {
        let mut signal = SignalConfig { seed: Some(5) };
        signal.apply_seed_override(None);
        assert_eq!(signal.seed, Some(5));
        signal.apply_seed_override(Some("not-a-seed"));
        assert_eq!(signal.seed, Some(5));
        signal.apply_seed_override(Some("-3"));
        assert_eq!(signal.seed, Some(5));
    }

    #[test]
    fn defaults_build_request() {
        let request = RunDefaults::default().request("Omega_Axis");
        assert_eq!(request.agent_name, "Omega_Axis");
        assert_eq!(request.rungs, 10);
        assert!(request.enable_mutation);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("no-such-config.yaml");
        let config = EngineConfig::load_or_default(&path);
        assert!(config.is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("chronomorph-config.yaml");
        if path.exists() {
            let config = EngineConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

//! Entropy delta tracking and entropy alert detection.
//!
//! The [`DeltaTracker`] turns consecutive entropy readings into signed
//! [`EntropyDelta`]s in rung order. Pattern detection over the delta
//! sequence belongs to an [`AlertDetector`] collaborator; the engine ships
//! [`ThresholdAlertDetector`] as the default.

use chronomorph_types::{AlertKind, EntropyAlert, EntropyDelta};
use serde::Deserialize;

/// A delta strictly above this value is a spike.
pub const SPIKE_THRESHOLD: f64 = 0.2;

/// Signed change from `previous` to `current`.
pub fn entropy_delta(previous: f64, current: f64) -> f64 {
    current - previous
}

/// Collects the deltas of one run, indexed by rung.
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    deltas: Vec<EntropyDelta>,
}

impl DeltaTracker {
    /// Create an empty tracker.
    pub const fn new() -> Self {
        Self { deltas: Vec::new() }
    }

    /// Create an empty tracker with room for `rungs` deltas.
    pub fn with_capacity(rungs: usize) -> Self {
        Self {
            deltas: Vec::with_capacity(rungs),
        }
    }

    /// Record the delta for `rung` and return it.
    pub fn record(&mut self, rung: u32, previous: f64, current: f64) -> EntropyDelta {
        let delta = entropy_delta(previous, current);
        let entry = EntropyDelta {
            rung,
            delta,
            spike: delta > SPIKE_THRESHOLD,
        };
        self.deltas.push(entry);
        entry
    }

    /// Deltas recorded so far, in rung order.
    pub fn deltas(&self) -> &[EntropyDelta] {
        &self.deltas
    }

    /// Number of spikes recorded so far.
    pub fn spike_count(&self) -> usize {
        self.deltas.iter().filter(|d| d.spike).count()
    }

    /// Consume the tracker and return the recorded deltas.
    pub fn into_deltas(self) -> Vec<EntropyDelta> {
        self.deltas
    }
}

/// Pattern detection over a run's delta sequence.
///
/// The returned alerts must be ordered by rung.
pub trait AlertDetector {
    /// Classify the delta sequence of one run.
    fn detect_alerts(&self, deltas: &[EntropyDelta]) -> Vec<EntropyAlert>;
}

/// Thresholds for the [`ThresholdAlertDetector`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertConfig {
    /// A delta above this raises a [`AlertKind::Spike`].
    #[serde(default = "default_spike_threshold")]
    pub spike_threshold: f64,

    /// A delta below the negation of this raises a [`AlertKind::Collapse`].
    #[serde(default = "default_collapse_threshold")]
    pub collapse_threshold: f64,

    /// Length of a streak of positive deltas that raises
    /// [`AlertKind::SustainedRise`]. Zero disables the rule.
    #[serde(default = "default_sustained_rise_rungs")]
    pub sustained_rise_rungs: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            spike_threshold: default_spike_threshold(),
            collapse_threshold: default_collapse_threshold(),
            sustained_rise_rungs: default_sustained_rise_rungs(),
        }
    }
}

const fn default_spike_threshold() -> f64 {
    SPIKE_THRESHOLD
}

const fn default_collapse_threshold() -> f64 {
    SPIKE_THRESHOLD
}

const fn default_sustained_rise_rungs() -> u32 {
    3
}

/// Default [`AlertDetector`]: fixed thresholds plus a rising-streak rule.
///
/// Per delta, at most one of spike or collapse fires. Independently, once
/// `sustained_rise_rungs` consecutive deltas have been positive, every
/// further positive delta in the same streak also raises a sustained-rise
/// alert.
#[derive(Debug, Clone, Default)]
pub struct ThresholdAlertDetector {
    config: AlertConfig,
}

impl ThresholdAlertDetector {
    /// Create a detector with the given thresholds.
    pub const fn new(config: AlertConfig) -> Self {
        Self { config }
    }
}

impl AlertDetector for ThresholdAlertDetector {
    fn detect_alerts(&self, deltas: &[EntropyDelta]) -> Vec<EntropyAlert> {
        let mut alerts = Vec::new();
        let mut streak: u32 = 0;

        for entry in deltas {
            if entry.delta > self.config.spike_threshold {
                alerts.push(EntropyAlert {
                    rung: entry.rung,
                    alert: AlertKind::Spike,
                    delta: entry.delta,
                });
            } else if entry.delta < -self.config.collapse_threshold {
                alerts.push(EntropyAlert {
                    rung: entry.rung,
                    alert: AlertKind::Collapse,
                    delta: entry.delta,
                });
            }

            streak = if entry.delta > 0.0 {
                streak.saturating_add(1)
            } else {
                0
            };
            if self.config.sustained_rise_rungs > 0 && streak >= self.config.sustained_rise_rungs {
                alerts.push(EntropyAlert {
                    rung: entry.rung,
                    alert: AlertKind::SustainedRise,
                    delta: entry.delta,
                });
            }
        }

        alerts
    }
}

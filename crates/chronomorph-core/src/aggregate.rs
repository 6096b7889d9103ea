//! Folding a run's steps into per-trait counters.

use chronomorph_types::{MemoryStep, TraitKind};
use serde::{Deserialize, Serialize};

/// Per-run signed counters, one per trait. Never persisted directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCounters {
    /// Number of novel steps.
    pub novelty_count: i32,
    /// Number of recursive steps.
    pub recursion_count: i32,
    /// Error-free steps minus erroring steps.
    pub stability_count: i32,
}

impl TraitCounters {
    /// Create counters from explicit values.
    pub const fn new(novelty_count: i32, recursion_count: i32, stability_count: i32) -> Self {
        Self {
            novelty_count,
            recursion_count,
            stability_count,
        }
    }

    /// The counter paired with a trait.
    pub const fn get(&self, kind: TraitKind) -> i32 {
        match kind {
            TraitKind::Novelty => self.novelty_count,
            TraitKind::Recursion => self.recursion_count,
            TraitKind::Stability => self.stability_count,
        }
    }

    /// Fold one step into the counters.
    pub const fn absorb(&mut self, step: &MemoryStep) {
        if step.recursive {
            self.recursion_count = self.recursion_count.saturating_add(1);
        }
        if step.novel {
            self.novelty_count = self.novelty_count.saturating_add(1);
        }
        self.stability_count = if step.error {
            self.stability_count.saturating_sub(1)
        } else {
            self.stability_count.saturating_add(1)
        };
    }
}

/// Fold an ordered list of steps into counters.
pub fn aggregate(steps: &[MemoryStep]) -> TraitCounters {
    steps.iter().fold(TraitCounters::default(), |mut counters, step| {
        counters.absorb(step);
        counters
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(recursive: bool, novel: bool, error: bool) -> MemoryStep {
        MemoryStep {
            recursive,
            novel,
            error,
            ..MemoryStep::default()
        }
    }

    #[test]
    fn empty_run_has_zero_counters() {
        assert_eq!(aggregate(&[]), TraitCounters::default());
    }

    #[test]
    fn flags_are_counted_independently() {
        let steps = [
            step(true, true, false),
            step(true, false, true),
            step(false, true, true),
            step(false, false, false),
        ];
        assert_eq!(aggregate(&steps), TraitCounters::new(2, 2, 0));
    }

    #[test]
    fn errors_drive_stability_negative() {
        let steps = vec![step(false, false, true); 4];
        let counters = aggregate(&steps);
        assert_eq!(counters.stability_count, -4);
        assert_eq!(counters.get(TraitKind::Stability), -4);
    }
}

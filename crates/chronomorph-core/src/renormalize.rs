//! Trait renormalization and leveling after a mutation-enabled run.
//!
//! Each trait is blended with its own counter:
//!
//! ```text
//! new_trait = clamp01((old_trait + count / 10) / 2)
//! ```
//!
//! The counters were summed from flags drawn against the pre-run trait
//! values, so a trait feeds back into itself across runs.

use chronomorph_types::{TraitKind, Traits, clamp_unit};

use crate::aggregate::TraitCounters;

/// Divisor applied to a counter before blending.
pub const COUNTER_SCALE: f64 = 10.0;

/// A stability counter strictly above this earns one level.
pub const LEVEL_UP_STABILITY_THRESHOLD: i32 = 3;

/// Blend one trait with its counter.
#[allow(clippy::suboptimal_flops, clippy::manual_midpoint)]
pub fn blend(old: f64, count: i32) -> f64 {
    clamp_unit((old + f64::from(count) / COUNTER_SCALE) / 2.0)
}

/// Blend every trait with its paired counter.
pub fn renormalize(traits: &Traits, counters: &TraitCounters) -> Traits {
    TraitKind::ALL.iter().fold(*traits, |acc, &kind| {
        acc.with(kind, blend(traits.get(kind), counters.get(kind)))
    })
}

/// Whether the counters earn a level.
pub const fn levels_up(counters: &TraitCounters) -> bool {
    counters.stability_count > LEVEL_UP_STABILITY_THRESHOLD
}

/// The level after a run: one higher when [`levels_up`], otherwise unchanged.
pub const fn next_level(level: u32, counters: &TraitCounters) -> u32 {
    if levels_up(counters) {
        level.saturating_add(1)
    } else {
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn novelty_four_blends_toward_counter() {
        let traits = Traits::uniform(0.5);
        let out = renormalize(&traits, &TraitCounters::new(4, 0, 0));
        assert!(close(out.novelty, (0.5 + 0.4) / 2.0));
        assert!(close(out.recursion, 0.25));
        assert!(close(out.stability, 0.25));
    }

    #[test]
    fn large_counters_are_clamped() {
        let out = renormalize(&Traits::uniform(1.0), &TraitCounters::new(50, 50, 50));
        assert!(close(out.novelty, 1.0));
        let out = renormalize(&Traits::uniform(0.0), &TraitCounters::new(0, 0, -50));
        assert!(close(out.stability, 0.0));
    }

    #[test]
    fn zero_counters_halve_traits() {
        let out = renormalize(&Traits::new(0.8, 0.6, 0.2), &TraitCounters::default());
        assert!(close(out.novelty, 0.4));
        assert!(close(out.recursion, 0.3));
        assert!(close(out.stability, 0.1));
    }

    #[test]
    fn level_increments_only_above_three() {
        assert_eq!(next_level(1, &TraitCounters::new(0, 0, 3)), 1);
        assert_eq!(next_level(1, &TraitCounters::new(0, 0, 4)), 2);
        assert_eq!(next_level(7, &TraitCounters::new(0, 0, 5)), 8);
        assert_eq!(next_level(u32::MAX, &TraitCounters::new(0, 0, 5)), u32::MAX);
    }
}

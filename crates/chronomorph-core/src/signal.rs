//! Random signal source for the rung stepper and the chaos mutation draw.
//!
//! The engine never touches a global generator. Every draw goes through a
//! [`RandomSignal`] handed in by the caller, so production runs use a real
//! RNG while tests replay a fixed [`ScriptedSignal`] and get bit-exact
//! results. A run consumes draws strictly in order and never reseeds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSignal {
    /// Draw the next sample. Implementations must return a value in `[0, 1)`.
    fn draw(&mut self) -> f64;
}

/// A [`RandomSignal`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSignal<R> {
    rng: R,
}

impl<R: Rng> RngSignal<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSignal<StdRng> {
    /// A reproducible signal derived from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// A signal seeded from the operating system.
    pub fn from_os() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Seeded when `seed` is set, OS-seeded otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_os, Self::seeded)
    }
}

impl<R: Rng> RandomSignal for RngSignal<R> {
    fn draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed sequence of samples, cycling when exhausted.
///
/// Values are clamped into `[0, 1)` on construction. An empty script
/// always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSignal {
    values: Vec<f64>,
    cursor: usize,
    drawn: usize,
}

/// Largest `f64` strictly below 1.0.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

impl ScriptedSignal {
    /// Create a scripted signal from a sequence of samples.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, BELOW_ONE) })
            .collect();
        Self {
            values,
            cursor: 0,
            drawn: 0,
        }
    }

    /// A signal that returns the same sample forever.
    pub fn constant(value: f64) -> Self {
        Self::new([value])
    }

    /// Total number of samples drawn so far.
    pub const fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSignal for ScriptedSignal {
    fn draw(&mut self) -> f64 {
        self.drawn = self.drawn.saturating_add(1);
        let Some(value) = self.values.get(self.cursor).copied() else {
            return 0.0;
        };
        self.cursor = self.cursor.saturating_add(1);
        if self.cursor >= self.values.len() {
            self.cursor = 0;
        }
        value
    }
}

impl<S: RandomSignal + ?Sized> RandomSignal for &mut S {
    fn draw(&mut self) -> f64 {
        (**self).draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_signal_is_reproducible() {
        let mut a = RngSignal::seeded(7);
        let mut b = RngSignal::seeded(7);
        for _ in 0..32 {
            let (x, y) = (a.draw(), b.draw());
            assert!((x - y).abs() < f64::EPSILON);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn scripted_signal_cycles() {
        let mut signal = ScriptedSignal::new([0.1, 0.2]);
        let drawn: Vec<f64> = (0..5).map(|_| signal.draw()).collect();
        let expected = [0.1, 0.2, 0.1, 0.2, 0.1];
        for (got, want) in drawn.iter().zip(expected) {
            assert!((got - want).abs() < f64::EPSILON);
        }
        assert_eq!(signal.drawn(), 5);
    }

    #[test]
    fn scripted_signal_clamps_into_half_open_range() {
        let mut signal = ScriptedSignal::new([1.5, -3.0, f64::NAN]);
        assert!(signal.draw() < 1.0);
        assert!(signal.draw().abs() < f64::EPSILON);
        assert!(signal.draw().abs() < f64::EPSILON);
    }

    #[test]
    fn empty_script_yields_zero() {
        let mut signal = ScriptedSignal::default();
        assert!(signal.draw().abs() < f64::EPSILON);
        assert_eq!(signal.drawn(), 1);
    }
}

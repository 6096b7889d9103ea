//! The rung stepper: one discrete simulation step.
//!
//! Each rung draws five samples from the [`RandomSignal`] in a fixed order:
//!
//! 1. entropy: `draw + novelty * 0.2 - stability * 0.1`, clamped to `[0, 1]`
//! 2. reward: `draw * reward_bias + stability * 0.2`, clamped to `[0, 1]`
//! 3. `recursive = draw < recursion`
//! 4. `novel = draw < novelty`
//! 5. `error = draw > stability`
//!
//! The step records entropy and reward at three-decimal precision. The
//! unrounded entropy is returned alongside so the run can report raw
//! readings and compute deltas from it.

use chronomorph_types::{MemoryStep, Traits, clamp_unit, round3};

use crate::signal::RandomSignal;

/// Weight of the novelty trait on rung entropy.
pub const NOVELTY_ENTROPY_WEIGHT: f64 = 0.2;

/// Weight of the stability trait subtracted from rung entropy.
pub const STABILITY_ENTROPY_WEIGHT: f64 = 0.1;

/// Weight of the stability trait on rung reward.
pub const STABILITY_REWARD_WEIGHT: f64 = 0.2;

/// Number of signal draws consumed by one rung.
pub const DRAWS_PER_RUNG: usize = 5;

/// The product of one rung.
#[derive(Debug, Clone, PartialEq)]
pub struct RungOutcome {
    /// The recorded memory step.
    pub step: MemoryStep,
    /// Clamped but unrounded entropy reading.
    pub entropy: f64,
}

/// Advance one rung.
///
/// `previous_entropy` is the recorded entropy of the prior rung, or `0.0`
/// for the first rung of a run. `reward_bias` is taken as given.
#[allow(clippy::suboptimal_flops)]
pub fn step(
    rung_id: u32,
    previous_entropy: f64,
    traits: &Traits,
    reward_bias: f64,
    signal: &mut dyn RandomSignal,
) -> RungOutcome {
    let entropy = clamp_unit(
        signal.draw() + traits.novelty * NOVELTY_ENTROPY_WEIGHT
            - traits.stability * STABILITY_ENTROPY_WEIGHT,
    );
    let reward = clamp_unit(signal.draw() * reward_bias + traits.stability * STABILITY_REWARD_WEIGHT);

    let recursive = signal.draw() < traits.recursion;
    let novel = signal.draw() < traits.novelty;
    let error = signal.draw() > traits.stability;

    let recorded = round3(entropy);
    let step = MemoryStep {
        rung_id,
        entropy: recorded,
        entropy_before: round3(previous_entropy),
        entropy_after: recorded,
        reward: round3(reward),
        note: format!("Simulation rung {}", u64::from(rung_id).saturating_add(1)),
        recursive,
        novel,
        error,
    };

    RungOutcome { step, entropy }
}

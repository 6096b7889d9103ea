//! One complete simulation run over an agent snapshot.
//!
//! The run is a pure function of the snapshot, the validated settings, and
//! the draws it takes from the signal. It touches no store; the caller
//! decides whether and how to persist the returned [`RunOutcome`].

use chronomorph_types::{Agent, EntropyDelta, MemoryStep, MutationEvent};
use tracing::{debug, info};

use crate::aggregate::{TraitCounters, aggregate};
use crate::entropy::DeltaTracker;
use crate::mutation;
use crate::renormalize::{next_level, renormalize};
use crate::request::RunSettings;
use crate::rung;
use crate::signal::RandomSignal;

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The agent after renormalization, leveling, and new mutations.
    pub agent: Agent,
    /// Recorded steps, one per rung, in rung order.
    pub steps: Vec<MemoryStep>,
    /// Clamped, unrounded entropy reading of every rung.
    pub entropy: Vec<f64>,
    /// Entropy delta of every rung.
    pub deltas: Vec<EntropyDelta>,
    /// Counters folded from the steps.
    pub counters: TraitCounters,
    /// Mutations fired by this run, in rule order.
    pub mutations: Vec<MutationEvent>,
    /// Whether the agent gained a level.
    pub leveled_up: bool,
}

/// Run `settings.rungs` rungs for `agent` and apply the mutation phase.
///
/// Flags are drawn against the traits the agent had before the run, and
/// the counters built from those flags are blended back into the same
/// traits. With mutation disabled the returned agent keeps its traits,
/// level, and mutations, and the chaos draw is not taken.
pub fn execute(agent: &Agent, settings: &RunSettings, signal: &mut dyn RandomSignal) -> RunOutcome {
    let capacity = usize::try_from(settings.rungs).unwrap_or_default();
    let mut steps = Vec::with_capacity(capacity);
    let mut entropy = Vec::with_capacity(capacity);
    let mut tracker = DeltaTracker::with_capacity(capacity);

    let mut previous = 0.0;
    for rung_id in 0..settings.rungs {
        let outcome = rung::step(rung_id, previous, &agent.traits, settings.reward_bias, signal);
        let delta = tracker.record(rung_id, previous, outcome.entropy);
        debug!(
            agent = %agent.name,
            rung = rung_id,
            entropy = outcome.step.entropy,
            reward = outcome.step.reward,
            delta = delta.delta,
            spike = delta.spike,
            "Rung complete"
        );
        previous = outcome.step.entropy;
        entropy.push(outcome.entropy);
        steps.push(outcome.step);
    }

    let counters = aggregate(&steps);
    let mutations = mutation::evaluate(&counters, settings.enable_mutation, signal);

    let mut updated = agent.clone();
    let mut leveled_up = false;
    if settings.enable_mutation {
        updated.traits = renormalize(&agent.traits, &counters);
        updated.level = next_level(agent.level, &counters);
        leveled_up = updated.level > agent.level;
        for event in &mutations {
            updated
                .mutations
                .insert(event.name.clone(), event.value.clone());
        }
    }

    info!(
        agent = %agent.name,
        rungs = settings.rungs,
        spikes = tracker.spike_count(),
        mutations = mutations.len(),
        level = updated.level,
        leveled_up,
        "Simulation run complete"
    );

    RunOutcome {
        agent: updated,
        steps,
        entropy,
        deltas: tracker.into_deltas(),
        counters,
        mutations,
        leveled_up,
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use chronomorph_types::{AgentId, MutationValue, Traits};

    use super::*;
    use crate::signal::ScriptedSignal;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn agent(traits: Traits) -> Agent {
        Agent {
            id: AgentId::new(),
            name: "Glyph_Loop".to_owned(),
            traits,
            level: 1,
            mutations: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn single_rung_run_matches_formulas() {
        let a = agent(Traits::uniform(0.5));
        let mut signal = ScriptedSignal::new([0.6, 0.4, 0.3, 0.7, 0.2, 0.9]);
        let out = execute(&a, &RunSettings::new(1, 0.5, true), &mut signal);

        assert_eq!(out.steps.len(), 1);
        assert!(close(out.entropy[0], 0.65));
        assert!(close(out.steps[0].reward, 0.3));
        assert!(close(out.deltas[0].delta, 0.65));
        assert!(out.deltas[0].spike);
        assert_eq!(out.counters, TraitCounters::new(0, 1, 1));
        assert!(out.mutations.is_empty());
        // five rung draws plus the chaos draw
        assert_eq!(signal.drawn(), rung::DRAWS_PER_RUNG + 1);
    }

    #[test]
    fn novelty_counter_fires_creative_mode() {
        let a = agent(Traits::uniform(0.5));
        // recursive: 0.9 < 0.5 no; novel: 0.1 < 0.5 yes; error: 0.9 > 0.5 yes
        let mut signal = ScriptedSignal::new([0.5, 0.5, 0.9, 0.1, 0.9]);
        let out = execute(&a, &RunSettings::new(4, 0.5, true), &mut signal);

        assert_eq!(out.counters, TraitCounters::new(4, 0, -4));
        assert_eq!(out.mutations.len(), 1);
        assert_eq!(out.mutations[0].name, "creative_mode");
        assert_eq!(out.mutations[0].value, MutationValue::Flag(true));
        assert!(close(out.agent.traits.novelty, 0.45));
        assert_eq!(
            out.agent.mutations.get("creative_mode"),
            Some(&MutationValue::Flag(true))
        );
        assert!(!out.leveled_up);
    }

    #[test]
    fn stability_counter_fires_resilience_and_levels_up() {
        let a = agent(Traits::new(0.5, 0.5, 1.0));
        let mut signal = ScriptedSignal::new([0.5, 0.5, 0.9, 0.9, 0.9]);
        let out = execute(&a, &RunSettings::new(5, 0.5, true), &mut signal);

        assert_eq!(out.counters.stability_count, 5);
        assert_eq!(out.mutations.len(), 1);
        assert_eq!(out.mutations[0].name, "resilience_bonus");
        assert_eq!(out.mutations[0].value, MutationValue::Amount(0.1));
        assert_eq!(out.agent.level, 2);
        assert!(out.leveled_up);
        assert!(close(out.agent.traits.stability, 0.75));
        assert!(close(out.agent.traits.novelty, 0.25));
    }

    #[test]
    fn disabled_mutation_leaves_agent_unchanged() {
        let a = agent(Traits::new(0.5, 0.5, 1.0));
        let mut signal = ScriptedSignal::new([0.5, 0.5, 0.0, 0.0, 0.0]);
        let out = execute(&a, &RunSettings::new(10, 0.5, false), &mut signal);

        assert!(out.mutations.is_empty());
        assert_eq!(out.agent, a);
        assert!(!out.leveled_up);
        // no chaos draw
        assert_eq!(signal.drawn(), 10 * rung::DRAWS_PER_RUNG);
    }

    #[test]
    fn entropy_chain_uses_recorded_values() {
        let a = agent(Traits::new(0.0, 0.0, 0.0));
        let mut signal = ScriptedSignal::new([
            0.123_4, 0.0, 0.5, 0.5, 0.5, //
            0.567_89, 0.0, 0.5, 0.5, 0.5,
        ]);
        let out = execute(&a, &RunSettings::new(2, 0.5, false), &mut signal);

        assert!(close(out.steps[1].entropy_before, out.steps[0].entropy_after));
        assert!(close(out.steps[0].entropy_before, 0.0));
        // delta is unrounded current minus recorded previous
        assert!(close(out.deltas[1].delta, 0.567_89 - 0.123));
        assert!(close(out.entropy[1], 0.567_89));
    }

    #[test]
    fn flags_feed_back_into_their_own_traits() {
        // novelty 1.0 makes every rung novel, which keeps novelty at 1.0;
        // novelty 0.0 never produces a novel step and stays at 0.0.
        let mut signal = ScriptedSignal::constant(0.5);
        let settings = RunSettings::new(10, 0.5, true);
        let hot = execute(&agent(Traits::new(1.0, 0.5, 0.5)), &settings, &mut signal);
        assert_eq!(hot.counters.novelty_count, 10);
        assert!(close(hot.agent.traits.novelty, 1.0));

        let mut signal = ScriptedSignal::constant(0.5);
        let cold = execute(&agent(Traits::new(0.0, 0.5, 0.5)), &settings, &mut signal);
        assert_eq!(cold.counters.novelty_count, 0);
        assert!(close(cold.agent.traits.novelty, 0.0));
    }

    #[test]
    fn chaos_draw_follows_last_rung() {
        let a = agent(Traits::new(0.5, 0.5, 0.5));
        let mut script = vec![0.5; rung::DRAWS_PER_RUNG * 3];
        script.push(0.01);
        let mut signal = ScriptedSignal::new(script);
        let out = execute(&a, &RunSettings::new(3, 0.5, true), &mut signal);
        assert!(out.mutations.iter().any(|m| m.name == "mutation_token"));
        assert_eq!(
            out.agent.mutations.get("mutation_token"),
            Some(&MutationValue::Token("chaos_seed".to_owned()))
        );
    }
}

//! Mutation rules evaluated once at the end of a run.
//!
//! Rules live in an ordered table of (trigger, event) pairs. Every rule is
//! checked independently and all that match fire:
//!
//! | Trigger | Mutation | Value |
//! |---|---|---|
//! | `novelty_count > 3` | `creative_mode` | `true` |
//! | `recursion_count > 2` | `loop_unroller` | `true` |
//! | `stability_count > 4` | `resilience_bonus` | `0.1` |
//! | `draw < 0.05` | `mutation_token` | `"chaos_seed"` |
//!
//! Nothing is evaluated, and no sample is drawn, when mutation is disabled.

use std::collections::BTreeSet;

use chronomorph_types::{MutationEvent, MutationValue, TraitKind};
use tracing::debug;

use crate::aggregate::TraitCounters;
use crate::signal::RandomSignal;

/// Condition under which a rule fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// The counter paired with `kind` is strictly above `threshold`.
    CounterAbove {
        /// Which counter to inspect.
        kind: TraitKind,
        /// Exclusive lower bound.
        threshold: i32,
    },
    /// One fresh draw lands strictly below the given probability.
    Chance(f64),
}

/// Value recorded when a rule fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleValue {
    /// Boolean mutation.
    Flag(bool),
    /// Numeric mutation.
    Amount(f64),
    /// Named token mutation.
    Token(&'static str),
}

impl From<RuleValue> for MutationValue {
    fn from(value: RuleValue) -> Self {
        match value {
            RuleValue::Flag(flag) => Self::Flag(flag),
            RuleValue::Amount(amount) => Self::Amount(amount),
            RuleValue::Token(token) => Self::Token(token.to_owned()),
        }
    }
}

/// One entry of the rule table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationRule {
    /// Mutation name recorded on the agent.
    pub name: &'static str,
    /// When the rule fires.
    pub trigger: Trigger,
    /// What the rule records.
    pub value: RuleValue,
}

/// The built-in rule table, in evaluation order.
pub const MUTATION_RULES: [MutationRule; 4] = [
    MutationRule {
        name: "creative_mode",
        trigger: Trigger::CounterAbove {
            kind: TraitKind::Novelty,
            threshold: 3,
        },
        value: RuleValue::Flag(true),
    },
    MutationRule {
        name: "loop_unroller",
        trigger: Trigger::CounterAbove {
            kind: TraitKind::Recursion,
            threshold: 2,
        },
        value: RuleValue::Flag(true),
    },
    MutationRule {
        name: "resilience_bonus",
        trigger: Trigger::CounterAbove {
            kind: TraitKind::Stability,
            threshold: 4,
        },
        value: RuleValue::Amount(0.1),
    },
    MutationRule {
        name: "mutation_token",
        trigger: Trigger::Chance(0.05),
        value: RuleValue::Token("chaos_seed"),
    },
];

impl MutationRule {
    /// Whether the rule fires. `Chance` triggers consume one draw.
    fn fires(&self, counters: &TraitCounters, signal: &mut dyn RandomSignal) -> bool {
        match self.trigger {
            Trigger::CounterAbove { kind, threshold } => counters.get(kind) > threshold,
            Trigger::Chance(probability) => signal.draw() < probability,
        }
    }
}

/// Evaluate the built-in rules.
///
/// Returns an empty list when `enabled` is false or nothing fires.
pub fn evaluate(
    counters: &TraitCounters,
    enabled: bool,
    signal: &mut dyn RandomSignal,
) -> Vec<MutationEvent> {
    evaluate_rules(&MUTATION_RULES, counters, enabled, signal)
}

/// Evaluate an arbitrary rule table.
///
/// A name fires at most once per call even if it appears in several rules;
/// later duplicates are skipped without being evaluated.
pub fn evaluate_rules(
    rules: &[MutationRule],
    counters: &TraitCounters,
    enabled: bool,
    signal: &mut dyn RandomSignal,
) -> Vec<MutationEvent> {
    if !enabled {
        return Vec::new();
    }

    let mut fired = BTreeSet::new();
    let mut events = Vec::new();
    for rule in rules {
        if fired.contains(rule.name) || !rule.fires(counters, signal) {
            continue;
        }
        fired.insert(rule.name);
        debug!(mutation = rule.name, ?counters, "Mutation fired");
        events.push(MutationEvent {
            name: rule.name.to_owned(),
            value: rule.value.into(),
        });
    }
    events
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::signal::ScriptedSignal;

    fn names(events: &[MutationEvent]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn novelty_above_three_fires_creative_mode_only() {
        let mut signal = ScriptedSignal::constant(0.9);
        let events = evaluate(&TraitCounters::new(4, 0, 0), true, &mut signal);
        assert_eq!(names(&events), vec!["creative_mode"]);
        assert_eq!(events[0].value, MutationValue::Flag(true));
    }

    #[test]
    fn thresholds_are_exclusive() {
        let mut signal = ScriptedSignal::constant(0.9);
        let events = evaluate(&TraitCounters::new(3, 2, 4), true, &mut signal);
        assert!(events.is_empty());
    }

    #[test]
    fn stability_above_four_grants_resilience() {
        let mut signal = ScriptedSignal::constant(0.9);
        let events = evaluate(&TraitCounters::new(0, 0, 5), true, &mut signal);
        assert_eq!(names(&events), vec!["resilience_bonus"]);
        assert_eq!(events[0].value, MutationValue::Amount(0.1));
    }

    #[test]
    fn all_rules_can_fire_together() {
        let mut signal = ScriptedSignal::constant(0.01);
        let events = evaluate(&TraitCounters::new(9, 9, 9), true, &mut signal);
        assert_eq!(
            names(&events),
            vec!["creative_mode", "loop_unroller", "resilience_bonus", "mutation_token"]
        );
        assert_eq!(
            events[3].value,
            MutationValue::Token(String::from("chaos_seed"))
        );
        assert_eq!(signal.drawn(), 1);
    }

    #[test]
    fn disabled_mutation_draws_nothing() {
        let mut signal = ScriptedSignal::constant(0.0);
        let events = evaluate(&TraitCounters::new(9, 9, 9), false, &mut signal);
        assert!(events.is_empty());
        assert_eq!(signal.drawn(), 0);
    }

    #[test]
    fn duplicate_names_fire_once() {
        let rules = [
            MutationRule {
                name: "creative_mode",
                trigger: Trigger::Chance(1.0),
                value: RuleValue::Flag(true),
            },
            MutationRule {
                name: "creative_mode",
                trigger: Trigger::Chance(1.0),
                value: RuleValue::Flag(false),
            },
        ];
        let mut signal = ScriptedSignal::constant(0.5);
        let events = evaluate_rules(&rules, &TraitCounters::default(), true, &mut signal);
        assert_eq!(events.len(), 1);
        assert_eq!(signal.drawn(), 1);
    }
}

//! End-to-end simulation runs through the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chronomorph_core::entropy::AlertConfig;
use chronomorph_core::{
    AgentStore, RunRequest, ScriptedSignal, SimulationError, Simulator,
    ThresholdAlertDetector,
};
use chronomorph_store::InMemoryStore;
use chronomorph_types::{AlertKind, MutationValue, Traits};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn single_rung_follows_formulas() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::default();
    let sim = Simulator::new(&store, &detector);
    sim.create_agent("Neo_Pulse", Traits::uniform(0.5), None).unwrap();

    let mut signal = ScriptedSignal::new([0.6, 0.4, 0.3, 0.7, 0.2, 0.9]);
    let result = sim
        .simulate(&RunRequest::new("Neo_Pulse").with_rungs(1), &mut signal)
        .unwrap();

    assert!(close(result.entropy_data[0], 0.65));
    assert_eq!(result.entropy_deltas.len(), 1);
    assert!(result.entropy_deltas[0].spike);
    assert_eq!(result.alerts.len(), 1);
    assert_eq!(result.alerts[0].alert, AlertKind::Spike);

    let memory = sim.memory("Neo_Pulse").unwrap();
    let step = &memory[0].steps[0];
    assert!(close(step.reward, 0.3));
    assert!(step.recursive);
    assert!(!step.novel);
    assert!(!step.error);
}

#[test]
fn novelty_run_fires_creative_mode_and_persists_it() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::default();
    let sim = Simulator::new(&store, &detector);
    sim.create_agent("Glyph_Crux", Traits::uniform(0.5), None).unwrap();

    let mut signal = ScriptedSignal::new([0.5, 0.5, 0.9, 0.1, 0.9]);
    let result = sim
        .simulate(&RunRequest::new("Glyph_Crux").with_rungs(4), &mut signal)
        .unwrap();

    let mutations = result.mutations.unwrap();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].name, "creative_mode");

    let stored = sim.agent("Glyph_Crux").unwrap();
    assert!(close(stored.traits.novelty, 0.45));
    assert_eq!(
        stored.mutations.get("creative_mode"),
        Some(&MutationValue::Flag(true))
    );
    assert_eq!(stored.level, 1);
}

#[test]
fn stable_run_levels_up_once() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::default();
    let sim = Simulator::new(&store, &detector);
    sim.create_agent("Omega_Axis", Traits::new(0.5, 0.5, 1.0), None).unwrap();

    let mut signal = ScriptedSignal::new([0.5, 0.5, 0.9, 0.9, 0.9]);
    let result = sim
        .simulate(&RunRequest::new("Omega_Axis").with_rungs(5), &mut signal)
        .unwrap();

    assert!(result.leveled_up);
    assert_eq!(result.counters.stability_count, 5);
    let stored = sim.agent("Omega_Axis").unwrap();
    assert_eq!(stored.level, 2);
    assert_eq!(
        stored.mutations.get("resilience_bonus"),
        Some(&MutationValue::Amount(0.1))
    );
}

#[test]
fn leaderboard_orders_by_score_not_insertion() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::default();
    let sim = Simulator::new(&store, &detector);

    let low = sim.create_agent("Hyper_Loop", Traits::uniform(0.0), None).unwrap();
    store.update_level(low.id, 2).unwrap();
    sim.create_agent("Zeta_Pulse", Traits::uniform(1.0), None).unwrap();

    let board = sim.leaderboard().unwrap();
    assert_eq!(board[0].name, "Zeta_Pulse");
    assert_eq!(board[0].display_score(), 80);
    assert_eq!(board[1].name, "Hyper_Loop");
    assert_eq!(board[1].display_score(), 20);
}

#[test]
fn repeated_runs_accumulate_memory() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::default();
    let sim = Simulator::new(&store, &detector);
    sim.create_agent("Neo_Delta", Traits::default(), Some("Injected Supreme Agent"))
        .unwrap();

    let mut signal = ScriptedSignal::constant(0.42);
    for _ in 0..3 {
        sim.simulate(&RunRequest::new("Neo_Delta").with_rungs(6), &mut signal)
            .unwrap();
    }

    let memory = sim.memory("Neo_Delta").unwrap();
    assert_eq!(memory.len(), 4);
    assert_eq!(memory[0].note, "Injected Supreme Agent");
    assert!(memory[1..].iter().all(|log| log.steps.len() == 6));
}

#[test]
fn sustained_rise_is_reported() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::new(AlertConfig {
        spike_threshold: 0.5,
        collapse_threshold: 0.5,
        sustained_rise_rungs: 3,
    });
    let sim = Simulator::new(&store, &detector);
    sim.create_agent("Glyph_Pulse", Traits::uniform(0.0), None).unwrap();

    // traits at zero make entropy equal to the first draw of each rung
    let mut signal = ScriptedSignal::new([
        0.1, 0.0, 0.0, 0.0, 0.0, //
        0.2, 0.0, 0.0, 0.0, 0.0, //
        0.3, 0.0, 0.0, 0.0, 0.0, //
        0.4, 0.0, 0.0, 0.0, 0.0,
    ]);
    let request = RunRequest::new("Glyph_Pulse").with_rungs(4).with_mutation(false);
    let result = sim.simulate(&request, &mut signal).unwrap();

    let rises: Vec<u32> = result
        .alerts
        .iter()
        .filter(|a| a.alert == AlertKind::SustainedRise)
        .map(|a| a.rung)
        .collect();
    assert_eq!(rises, [2, 3]);
}

#[test]
fn concurrent_runs_on_distinct_agents() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::default();
    let names = ["Neo_Pulse", "Hyper_Loop", "Glyph_Delta", "Zeta_Crux"];
    for name in names {
        store.create_agent(name, Traits::default(), None).unwrap();
    }

    std::thread::scope(|scope| {
        for (name, draw) in names.iter().zip([0.1, 0.3, 0.5, 0.7]) {
            let store = &store;
            let detector = &detector;
            scope.spawn(move || {
                let sim = Simulator::new(store, detector);
                let mut signal = ScriptedSignal::constant(draw);
                for _ in 0..5 {
                    sim.simulate(&RunRequest::new(*name).with_rungs(10), &mut signal)
                        .unwrap();
                }
            });
        }
    });

    for name in names {
        let agent = store.get_agent(name).unwrap();
        assert_eq!(store.memory(agent.id).unwrap().len(), 5);
        assert!(agent.traits.in_bounds());
    }
}

#[test]
fn unknown_agent_is_reported() {
    let store = InMemoryStore::new();
    let detector = ThresholdAlertDetector::default();
    let sim = Simulator::new(&store, &detector);
    let mut signal = ScriptedSignal::constant(0.5);
    let err = sim.simulate(&RunRequest::new("Nobody"), &mut signal);
    assert!(matches!(err, Err(SimulationError::AgentNotFound { .. })));
}

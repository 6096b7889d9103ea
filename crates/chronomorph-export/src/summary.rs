//! Plain-text agent summaries.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chronomorph_core::ExportError;
use chronomorph_core::entropy::{SPIKE_THRESHOLD, entropy_delta};
use chronomorph_types::{Agent, MemoryLog, MemoryStep};

/// Render the summary text for `agent` and its `memory`.
///
/// Only logs that contain steps count as runs. Spikes are recomputed from the
/// rounded entropy stored on each step, so a rung whose live delta sat just
/// above the threshold may not count here. The output line says so.
pub fn render_summary(
    agent: &Agent,
    memory: &[MemoryLog],
    generated_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    render(agent, memory, generated_at).map_err(|e| ExportError::Serialization {
        reason: e.to_string(),
    })
}

fn render(
    agent: &Agent,
    memory: &[MemoryLog],
    generated_at: DateTime<Utc>,
) -> Result<String, std::fmt::Error> {
    let steps: Vec<&MemoryStep> = memory.iter().flat_map(|log| &log.steps).collect();
    let runs = memory.iter().filter(|log| !log.steps.is_empty()).count();
    let spikes = steps
        .iter()
        .filter(|s| entropy_delta(s.entropy_before, s.entropy_after) > SPIKE_THRESHOLD)
        .count();

    let mut out = String::new();
    writeln!(out, "ChronoMorph agent summary")?;
    writeln!(out, "Agent: {}", agent.name)?;
    writeln!(out, "Level: {}", agent.level)?;
    writeln!(
        out,
        "Traits: novelty={:.3} recursion={:.3} stability={:.3}",
        agent.traits.novelty, agent.traits.recursion, agent.traits.stability
    )?;
    if agent.mutations.is_empty() {
        writeln!(out, "Mutations: none")?;
    } else {
        let listed: Vec<String> = agent
            .mutations
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        writeln!(out, "Mutations: {}", listed.join(", "))?;
    }
    writeln!(out, "Runs: {runs}")?;
    writeln!(out, "Steps: {}", steps.len())?;
    match (
        mean(steps.iter().map(|s| s.entropy)),
        mean(steps.iter().map(|s| s.reward)),
    ) {
        (Some(entropy), Some(reward)) => {
            writeln!(out, "Mean entropy: {entropy:.3}")?;
            writeln!(out, "Mean reward: {reward:.3}")?;
        }
        _ => writeln!(out, "Mean entropy: n/a\nMean reward: n/a")?,
    }
    writeln!(out, "Spikes (recorded entropy): {spikes}")?;
    if let Some(last) = steps.last() {
        writeln!(
            out,
            "Last step: rung {} entropy {:.3} reward {:.3} recursive={} novel={} error={}",
            last.rung_id, last.entropy, last.reward, last.recursive, last.novel, last.error
        )?;
    }
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    Ok(out)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0.0), |(sum, count), v| (sum + v, count + 1.0));
    (count > 0.0).then(|| sum / count)
}

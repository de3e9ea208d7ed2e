//! Seed agent spawner.
//!
//! At startup the spawner creates `population.initial_agents` residents
//! with pooled unique names and random personalities, and registers each
//! one with the scheduler so the usual `AgentJoined` event goes out.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use townsfolk_agents::AgentFactory;
use townsfolk_core::{EventSink, Scheduler};
use townsfolk_types::AgentId;
use tracing::info;

use crate::error::EngineError;

/// Upper bound on seeded residents.
pub const MAX_SEED_AGENTS: u32 = 500;

/// Who was spawned, in registration order.
#[derive(Debug, Default)]
pub struct SpawnResult {
    /// Agent ids paired with their display names.
    pub agents: Vec<(AgentId, String)>,
}

/// Build the spawner RNG.
///
/// A seeded world gets a derived seed so spawning does not consume the
/// scheduler's stream.
pub fn spawner_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, |s| {
        StdRng::seed_from_u64(s.wrapping_add(0x5eed))
    })
}

/// Create and register `count` seed agents.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if `count` exceeds
/// [`MAX_SEED_AGENTS`] or the scheduler refuses a registration.
pub fn spawn_seed_agents<S: EventSink, R: Rng + ?Sized>(
    scheduler: &mut Scheduler<S>,
    count: u32,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<SpawnResult, EngineError> {
    if count > MAX_SEED_AGENTS {
        return Err(EngineError::Spawner {
            message: format!("initial_agents {count} exceeds the limit of {MAX_SEED_AGENTS}"),
        });
    }

    let mut factory = AgentFactory::new();
    for existing in scheduler.world().agents.values() {
        factory.reserve_name(&existing.name);
    }

    let agents_config = scheduler.world().config.agents.clone();
    let mut result = SpawnResult::default();
    for _ in 0..count {
        let profile = factory.create_seed_agent(rng, now, &agents_config);
        if !scheduler.register_agent(profile.id, profile.name.clone(), profile.personality, now) {
            return Err(EngineError::Spawner {
                message: format!("agent {} was already registered", profile.id),
            });
        }
        info!(agent_id = %profile.id, name = %profile.name, "seed agent spawned");
        result.agents.push((profile.id, profile.name));
    }
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use townsfolk_core::{RecordingSink, SimulationConfig};
    use townsfolk_types::SimEvent;

    use super::*;

    fn scheduler() -> Scheduler<RecordingSink> {
        let mut config = SimulationConfig::default();
        config.world.seed = Some(9);
        Scheduler::new(config, RecordingSink::default(), Utc::now()).unwrap()
    }

    #[test]
    fn spawns_correct_count() {
        let mut s = scheduler();
        let mut rng = spawner_rng(Some(9));
        let result = spawn_seed_agents(&mut s, 5, &mut rng, Utc::now()).unwrap();

        assert_eq!(result.agents.len(), 5);
        assert_eq!(s.world().agents.len(), 5);
        let joined = s
            .sink()
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::AgentJoined { .. }))
            .count();
        assert_eq!(joined, 5);
    }

    #[test]
    fn names_stay_unique_past_the_pool() {
        let mut s = scheduler();
        let mut rng = spawner_rng(Some(1));
        let result = spawn_seed_agents(&mut s, 60, &mut rng, Utc::now()).unwrap();

        let names: BTreeSet<&String> = result.agents.iter().map(|(_, n)| n).collect();
        assert_eq!(names.len(), 60, "all names must be unique");
    }

    #[test]
    fn second_batch_avoids_existing_names() {
        let mut s = scheduler();
        let mut rng = spawner_rng(Some(2));
        spawn_seed_agents(&mut s, 10, &mut rng, Utc::now()).unwrap();
        spawn_seed_agents(&mut s, 10, &mut rng, Utc::now()).unwrap();

        let names: BTreeSet<&String> = s.world().agents.values().map(|a| &a.name).collect();
        assert_eq!(names.len(), 20);
    }

    #[test]
    fn rejects_oversized_population() {
        let mut s = scheduler();
        let mut rng = spawner_rng(Some(3));
        let result = spawn_seed_agents(&mut s, MAX_SEED_AGENTS.saturating_add(1), &mut rng, Utc::now());
        assert!(matches!(result, Err(EngineError::Spawner { .. })));
        assert!(s.world().agents.is_empty());
    }

    #[test]
    fn seeded_spawns_are_reproducible() {
        let names = |seed| {
            let mut s = scheduler();
            let mut rng = spawner_rng(Some(seed));
            spawn_seed_agents(&mut s, 8, &mut rng, Utc::now())
                .unwrap()
                .agents
                .into_iter()
                .map(|(_, n)| n)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(4), names(4));
    }
}

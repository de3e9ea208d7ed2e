//! Emergent social initiatives.
//!
//! Every initiative kind is an independent probabilistic generator with
//! explicit precondition gates plus an upkeep or resolution step keyed on
//! the tick counter. [`run_pass`] runs once per global tick pass: first all
//! upkeep and resolution, then one origination chance per kind for every
//! agent that is not traveling.
//!
//! Failed gates are opportunities that did not happen this tick, not
//! errors. Real failures (ledger overflow, vanished agents) are logged with
//! the agent id and the pass continues.

pub mod challenge;
pub mod crew;
pub mod gathering;
pub mod goal;
pub mod market;
pub mod structure;
pub mod territory;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use townsfolk_agents::AgentError;
use townsfolk_types::{
    AgentId, Challenge, Crew, Gathering, Goal, Personality, PersonalityTrait, Structure, Territory,
};

use crate::broadcast::EventSink;
use crate::world::World;

/// Every initiative record the world holds.
#[derive(Debug, Clone, Default)]
pub struct InitiativeState {
    /// Pending challenges plus a short history of settled ones.
    pub challenges: Vec<Challenge>,
    /// Tick at which each ordered (creator, target) pair last issued one.
    pub challenge_cooldowns: BTreeMap<(AgentId, AgentId), u64>,
    /// All crews, dissolved ones included.
    pub crews: Vec<Crew>,
    /// Announced gatherings plus a short history of held ones.
    pub gatherings: Vec<Gathering>,
    /// Tick of the most recent announcement.
    pub last_gathering_tick: Option<u64>,
    /// Active goals plus a short history of finished ones.
    pub goals: Vec<Goal>,
    /// Standing structures.
    pub structures: Vec<Structure>,
    /// Active territory claims.
    pub territories: Vec<Territory>,
}

/// Timing of the global pass being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Tick counter after this pass advanced it.
    pub tick: u64,
    /// Wall-clock time of the pass.
    pub now: DateTime<Utc>,
    /// Ticks this pass covers; per-tick upkeep is multiplied by it.
    pub elapsed: u64,
}

/// Run upkeep and resolution for every initiative kind, then give each
/// non-traveling agent one chance per kind to originate something.
pub fn run_pass<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) {
    log_failure(None, "challenge", challenge::resolve_due(world, rng, pass, sink));
    gathering::resolve_due(world, pass, sink);
    crew::upkeep(world, rng, pass, sink);
    log_failure(None, "goal", goal::evaluate(world, pass, sink));
    log_failure(None, "structure", structure::upkeep(world, pass, sink));
    territory::upkeep(world, pass, sink);

    let candidates: Vec<AgentId> = world
        .agents
        .values()
        .filter(|a| !a.location.is_traveling())
        .map(|a| a.id)
        .collect();

    for agent_id in candidates {
        let id = Some(agent_id);
        log_failure(id, "challenge", challenge::originate(world, agent_id, rng, pass, sink));
        log_failure(id, "crew", crew::originate(world, agent_id, rng, pass, sink));
        log_failure(id, "gathering", gathering::originate(world, agent_id, rng, pass, sink));
        log_failure(id, "goal", goal::originate(world, agent_id, rng, pass, sink));
        log_failure(id, "market", market::originate(world, agent_id, rng, pass, sink));
        log_failure(id, "structure", structure::originate(world, agent_id, rng, pass, sink));
        log_failure(id, "territory", territory::originate(world, agent_id, rng, pass, sink));
    }
}

fn log_failure(agent_id: Option<AgentId>, kind: &str, result: Result<(), AgentError>) {
    if let Err(err) = result {
        match agent_id {
            Some(agent_id) => {
                tracing::warn!(%agent_id, initiative = kind, error = %err, "initiative failed");
            }
            None => tracing::warn!(initiative = kind, error = %err, "initiative upkeep failed"),
        }
    }
}

/// Pick an index with probability proportional to its weight.
pub(crate) fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let mut roll = rng.random_range(0.0..total);
    for (index, weight) in weights.iter().enumerate() {
        let weight = weight.max(0.0);
        if roll < weight {
            return Some(index);
        }
        roll -= weight;
    }
    weights.len().checked_sub(1)
}

/// Pick a catalog entry weighted by `0.5 + trait` for the trait each entry
/// is bound to.
pub(crate) fn pick_by_trait<T: Copy, R: Rng + ?Sized>(
    catalog: &[T],
    bound_trait: fn(T) -> PersonalityTrait,
    personality: &Personality,
    rng: &mut R,
) -> Option<T> {
    let weights: Vec<f64> = catalog
        .iter()
        .map(|entry| 0.5 + personality.get(bound_trait(*entry)))
        .collect();
    weighted_index(&weights, rng).and_then(|i| catalog.get(i).copied())
}

/// `amount × fraction`, rounded and floored at zero.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn scaled_amount(amount: u64, fraction: f64) -> u64 {
    let value = (amount as f64 * fraction).round();
    if value <= 0.0 || value.is_nan() {
        0
    } else if value >= u64::MAX as f64 {
        u64::MAX
    } else {
        // Non-negative and in range after the guards above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = value as u64;
        rounded
    }
}

/// Elapsed ticks as a multiplier for per-tick amounts.
pub(crate) fn ticks_u32(elapsed: u64) -> u32 {
    u32::try_from(elapsed).unwrap_or(u32::MAX)
}

/// Look up an agent or report it missing.
pub(crate) fn require_agent(world: &World, agent_id: AgentId) -> Result<(), AgentError> {
    if world.agents.contains_key(&agent_id) {
        Ok(())
    } else {
        Err(AgentError::AgentNotFound(agent_id))
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..20 {
            assert_eq!(weighted_index(&[0.0, 0.0, 1.0], &mut rng), Some(2));
        }
        assert_eq!(weighted_index(&[0.0], &mut rng), None);
        assert_eq!(weighted_index(&[], &mut rng), None);
    }

    #[test]
    fn scaled_amount_rounds_and_floors() {
        assert_eq!(scaled_amount(100, 0.25), 25);
        assert_eq!(scaled_amount(7, 0.5), 4);
        assert_eq!(scaled_amount(100, -1.0), 0);
    }
}

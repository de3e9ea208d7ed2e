//! Low-probability flavor events with direct effects.
//!
//! Each processed agent rolls once per tick against the configured chance.
//! On a hit, one event is drawn uniformly from [`RandomEventKind::ALL`] and
//! its need effects and coin bonus are applied immediately.

use rand::Rng;
use townsfolk_types::{AgentProfile, MemoryKind, Need, RandomEventKind};

use crate::config::AgentsConfig;
use crate::economy;
use crate::memory;
use crate::needs::{MoodShift, apply_need_effects};

/// Static description of one random event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomEventSpec {
    /// Need changes applied on a hit.
    pub effects: &'static [(Need, f64)],
    /// Simcoins granted.
    pub coins: u64,
    /// First-person chat line.
    pub line: &'static str,
    /// Memory sentiment.
    pub sentiment: f64,
}

/// Catalog record for a random event kind.
pub const fn lookup(kind: RandomEventKind) -> RandomEventSpec {
    match kind {
        RandomEventKind::FoundCoins => RandomEventSpec {
            effects: &[],
            coins: 15,
            line: "Found some coins on the sidewalk!",
            sentiment: 0.6,
        },
        RandomEventKind::CaughtInRain => RandomEventSpec {
            effects: &[(Need::Hygiene, -15.0), (Need::Comfort, -10.0)],
            coins: 0,
            line: "Got caught in a sudden downpour. Soaked.",
            sentiment: -0.4,
        },
        RandomEventKind::StreetPerformance => RandomEventSpec {
            effects: &[(Need::Fun, 15.0)],
            coins: 0,
            line: "Stopped to watch a street performer. Brilliant!",
            sentiment: 0.5,
        },
        RandomEventKind::FreeCoffee => RandomEventSpec {
            effects: &[(Need::Energy, 10.0), (Need::Hunger, 5.0)],
            coins: 0,
            line: "Someone handed me a free coffee.",
            sentiment: 0.5,
        },
        RandomEventKind::StubbedToe => RandomEventSpec {
            effects: &[(Need::Comfort, -10.0), (Need::Fun, -5.0)],
            coins: 0,
            line: "Stubbed my toe. Ouch.",
            sentiment: -0.3,
        },
        RandomEventKind::Compliment => RandomEventSpec {
            effects: &[(Need::Social, 10.0)],
            coins: 0,
            line: "A stranger complimented my outfit.",
            sentiment: 0.7,
        },
    }
}

/// Outcome of a random event that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomEventHit {
    /// Which event fired.
    pub kind: RandomEventKind,
    /// Mood before and after the effects.
    pub mood: MoodShift,
}

/// Roll once for a random event.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> Option<RandomEventKind> {
    if !rng.random_bool(chance.clamp(0.0, 1.0)) {
        return None;
    }
    RandomEventKind::ALL
        .get(rng.random_range(0..RandomEventKind::ALL.len()))
        .copied()
}

/// Apply an event's effects, coins and memory to an agent.
pub fn apply(
    agent: &mut AgentProfile,
    kind: RandomEventKind,
    tick: u64,
    config: &AgentsConfig,
) -> RandomEventHit {
    let record = lookup(kind);
    let mood = apply_need_effects(agent, record.effects, &config.needs);
    if let Err(err) = economy::credit(agent, record.coins) {
        tracing::warn!(agent_id = %agent.id, error = %err, "random event coins not credited");
    }
    memory::remember(
        agent,
        memory::entry(MemoryKind::Incident, None, record.line, record.sentiment, tick),
        &config.memory,
    );
    RandomEventHit { kind, mood }
}

/// Roll and, on a hit, apply a random event.
pub fn maybe_trigger<R: Rng + ?Sized>(
    agent: &mut AgentProfile,
    rng: &mut R,
    tick: u64,
    config: &AgentsConfig,
) -> Option<RandomEventHit> {
    let kind = roll(rng, config.random_events.chance)?;
    tracing::debug!(agent_id = %agent.id, event = ?kind, "random event");
    Some(apply(agent, kind, tick, config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use townsfolk_types::{AgentId, Personality};

    use super::*;
    use crate::agent::new_profile;

    fn blank(config: &AgentsConfig) -> AgentProfile {
        new_profile(
            AgentId::new(),
            String::from("Kofi"),
            Personality::balanced(),
            Utc::now(),
            config,
        )
    }

    #[test]
    fn zero_chance_never_fires() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..1_000 {
            assert!(roll(&mut rng, 0.0).is_none());
        }
    }

    #[test]
    fn certain_chance_always_fires() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(roll(&mut rng, 1.0).is_some());
        }
    }

    #[test]
    fn found_coins_credits_and_remembers() {
        let config = AgentsConfig::default();
        let mut agent = blank(&config);
        let hit = apply(&mut agent, RandomEventKind::FoundCoins, 4, &config);
        assert_eq!(hit.kind, RandomEventKind::FoundCoins);
        assert_eq!(agent.balance, 115);
        assert_eq!(agent.memories.len(), 1);
        assert_eq!(agent.memories.first().unwrap().kind, MemoryKind::Incident);
    }

    #[test]
    fn rain_lowers_hygiene_and_comfort() {
        let config = AgentsConfig::default();
        let mut agent = blank(&config);
        apply(&mut agent, RandomEventKind::CaughtInRain, 1, &config);
        assert!((agent.needs.hygiene - 65.0).abs() < 1e-9);
        assert!((agent.needs.comfort - 70.0).abs() < 1e-9);
    }
}

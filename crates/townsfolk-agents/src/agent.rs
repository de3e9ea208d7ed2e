//! Agent creation.
//!
//! [`new_profile`] builds a fresh [`AgentProfile`] for an id the caller
//! already knows (create-on-first-reference). [`AgentFactory`] adds name
//! bookkeeping and random personalities for seeding a town.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rand::Rng;
use townsfolk_types::{Activity, AgentId, AgentProfile, Location, Needs, Personality, Place};

use crate::config::AgentsConfig;
use crate::needs::derive_mood;

/// Starting value of every need.
pub const STARTING_NEED: f64 = 80.0;

/// Names handed out to seeded agents before numbering kicks in.
const NAME_POOL: &[&str] = &[
    "Mira", "Theo", "Juno", "Ravi", "Odette", "Basil", "Nadia", "Felix", "Ines", "Kofi", "Lena",
    "Marco", "Priya", "Quinn", "Rosa", "Sami", "Tova", "Umar", "Vera", "Wes",
];

/// Build a new agent profile with default needs and the starting balance.
pub fn new_profile(
    id: AgentId,
    name: String,
    personality: Personality,
    now: DateTime<Utc>,
    config: &AgentsConfig,
) -> AgentProfile {
    let needs = Needs::uniform(STARTING_NEED);
    AgentProfile {
        id,
        name,
        mood: derive_mood(&needs, &config.needs.mood_thresholds),
        needs,
        personality: personality.clamped(),
        balance: config.economy.starting_balance,
        inventory: BTreeMap::new(),
        clout: 0,
        points: 0,
        location: Location::At { place: Place::Home },
        activity: Activity::Idle,
        remaining_ticks: 0,
        skills: BTreeMap::new(),
        memories: Vec::new(),
        thought: None,
        plan: None,
        created_at: now,
        last_processed_at: now,
    }
}

/// Draw each trait uniformly from `[0, 1]`.
pub fn random_personality<R: Rng + ?Sized>(rng: &mut R) -> Personality {
    Personality {
        openness: rng.random_range(0.0..=1.0),
        conscientiousness: rng.random_range(0.0..=1.0),
        extraversion: rng.random_range(0.0..=1.0),
        agreeableness: rng.random_range(0.0..=1.0),
        neuroticism: rng.random_range(0.0..=1.0),
    }
}

/// Hands out unique display names and builds seeded agents.
#[derive(Debug, Default)]
pub struct AgentFactory {
    names_in_use: BTreeSet<String>,
}

impl AgentFactory {
    /// Create an empty factory.
    pub const fn new() -> Self {
        Self {
            names_in_use: BTreeSet::new(),
        }
    }

    /// Reserve `name`, appending a number if it is already taken.
    pub fn reserve_name(&mut self, name: &str) -> String {
        let mut candidate = String::from(name);
        let mut suffix: u32 = 2;
        while self.names_in_use.contains(&candidate) {
            candidate = format!("{name} {suffix}");
            suffix = suffix.saturating_add(1);
        }
        self.names_in_use.insert(candidate.clone());
        candidate
    }

    /// Whether a name has already been handed out.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names_in_use.contains(name)
    }

    /// Build a seed agent with a fresh id, a pooled name and random traits.
    pub fn create_seed_agent<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
        config: &AgentsConfig,
    ) -> AgentProfile {
        let base = NAME_POOL
            .get(rng.random_range(0..NAME_POOL.len()))
            .copied()
            .unwrap_or("Townie");
        let name = self.reserve_name(base);
        let personality = random_personality(rng);
        new_profile(AgentId::new(), name, personality, now, config)
    }
}

//! Configuration constants and defaults for per-agent mechanics.
//!
//! These structs mirror the `needs`, `skills`, `social`, `economy`,
//! `memory` and `random_events` sections of `townsfolk-config.yaml`. Every
//! field has a default so a partial file (or none at all) yields a working
//! simulation.

use std::collections::BTreeMap;

use serde::Deserialize;
use townsfolk_types::{Mood, Need, PersonalityTrait};

/// A `(trait, need)` pair whose decay is scaled by `0.5 + trait_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TraitNeedModifier {
    /// The trait that scales the decay.
    #[serde(rename = "trait")]
    pub personality_trait: PersonalityTrait,
    /// The need whose decay is scaled.
    pub need: Need,
}

/// One row of the mood table: mood applies when the need mean is `>= min_mean`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MoodThreshold {
    /// Inclusive lower bound on the mean of all needs.
    pub min_mean: f64,
    /// Mood assigned when this row matches.
    pub mood: Mood,
}

/// Need decay and mood derivation parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    /// Base decay per tick for each need. Missing needs do not decay.
    pub decay_rates: BTreeMap<Need, f64>,
    /// Trait/need pairs that scale decay.
    pub trait_modifiers: Vec<TraitNeedModifier>,
    /// Mood table, evaluated in descending `min_mean` order.
    pub mood_thresholds: Vec<MoodThreshold>,
    /// A need strictly below this forces its corrective action.
    pub critical_threshold: f64,
    /// Needs below this add weight to their corrective action.
    pub low_threshold: f64,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            decay_rates: BTreeMap::from([
                (Need::Energy, 1.0),
                (Need::Hunger, 1.5),
                (Need::Hygiene, 0.8),
                (Need::Social, 1.0),
                (Need::Fun, 1.2),
                (Need::Comfort, 0.6),
            ]),
            trait_modifiers: vec![
                TraitNeedModifier {
                    personality_trait: PersonalityTrait::Extraversion,
                    need: Need::Social,
                },
                TraitNeedModifier {
                    personality_trait: PersonalityTrait::Openness,
                    need: Need::Fun,
                },
                TraitNeedModifier {
                    personality_trait: PersonalityTrait::Neuroticism,
                    need: Need::Comfort,
                },
                TraitNeedModifier {
                    personality_trait: PersonalityTrait::Conscientiousness,
                    need: Need::Hygiene,
                },
                TraitNeedModifier {
                    personality_trait: PersonalityTrait::Neuroticism,
                    need: Need::Energy,
                },
            ],
            mood_thresholds: vec![
                MoodThreshold { min_mean: 80.0, mood: Mood::Ecstatic },
                MoodThreshold { min_mean: 65.0, mood: Mood::Happy },
                MoodThreshold { min_mean: 50.0, mood: Mood::Content },
                MoodThreshold { min_mean: 35.0, mood: Mood::Uneasy },
                MoodThreshold { min_mean: 20.0, mood: Mood::Stressed },
            ],
            critical_threshold: 25.0,
            low_threshold: 50.0,
        }
    }
}

/// Skill leveling parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    /// XP needed to leave level N is `curve[N - 1]`. The last entry is unused.
    pub curve: [u32; 10],
    /// XP gain multiplier per mood. Missing moods use 1.0.
    pub mood_multipliers: BTreeMap<Mood, f64>,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            curve: [100, 250, 500, 800, 1200, 1700, 2300, 3000, 4000, 5000],
            mood_multipliers: BTreeMap::from([
                (Mood::Ecstatic, 1.3),
                (Mood::Happy, 1.15),
                (Mood::Content, 1.0),
                (Mood::Uneasy, 0.9),
                (Mood::Stressed, 0.7),
                (Mood::Miserable, 0.5),
            ]),
        }
    }
}

/// Relationship thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Friendship at or above this makes two agents friends.
    pub friend_threshold: f64,
    /// Rivalry at or above this makes two agents rivals.
    pub rival_threshold: f64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            friend_threshold: 30.0,
            rival_threshold: 30.0,
        }
    }
}

/// Starting balances, plots, and resale rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Simcoins granted to a new agent.
    pub starting_balance: u64,
    /// Number of plots in town.
    pub plot_count: u32,
    /// Price of plot 1.
    pub plot_base_price: u64,
    /// Price increase per subsequent plot.
    pub plot_price_step: u64,
    /// Percentage of the item price refunded on sale.
    pub item_resale_pct: u64,
    /// Percentage of the plot price refunded on sale.
    pub property_resale_pct: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            plot_count: 12,
            plot_base_price: 300,
            plot_price_step: 50,
            item_resale_pct: 50,
            property_resale_pct: 75,
        }
    }
}

/// Memory buffer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum memories kept per agent; the oldest is evicted on overflow.
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { capacity: 15 }
    }
}

/// Random event injector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomEventConfig {
    /// Chance per processed agent per tick that something happens.
    pub chance: f64,
}

impl Default for RandomEventConfig {
    fn default() -> Self {
        Self { chance: 0.03 }
    }
}

/// Everything the per-agent mechanics need, bundled for convenience.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Need decay and mood.
    pub needs: NeedsConfig,
    /// Skill leveling.
    pub skills: SkillConfig,
    /// Relationship thresholds.
    pub social: SocialConfig,
    /// Economy.
    pub economy: EconomyConfig,
    /// Memory buffer.
    pub memory: MemoryConfig,
    /// Random events.
    pub random_events: RandomEventConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AgentsConfig::default();
        assert_eq!(cfg.needs.decay_rates.len(), 6);
        assert_eq!(cfg.needs.mood_thresholds.len(), 5);
        assert_eq!(cfg.skills.curve.get(2), Some(&500));
        assert_eq!(cfg.memory.capacity, 15);
        assert_eq!(cfg.economy.starting_balance, 100);
    }

    #[test]
    fn mood_table_is_descending() {
        let cfg = NeedsConfig::default();
        let means: Vec<f64> = cfg.mood_thresholds.iter().map(|t| t.min_mean).collect();
        assert!(means.windows(2).all(|w| matches!(w, [a, b] if a > b)));
    }

    #[test]
    fn trait_modifier_deserializes_trait_key() {
        let json = r#"{"trait":"extraversion","need":"social"}"#;
        let parsed: Result<TraitNeedModifier, _> = serde_json::from_str(json);
        assert_eq!(
            parsed.ok(),
            Some(TraitNeedModifier {
                personality_trait: PersonalityTrait::Extraversion,
                need: Need::Social,
            })
        );
    }
}

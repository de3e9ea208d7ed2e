//! Configuration loading and typed config structures for the Townsfolk simulation.
//!
//! The canonical configuration lives in `townsfolk-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//!
//! Per-agent sections (`needs`, `skills`, `social`, `economy`, `memory`,
//! `random_events`) are defined in `townsfolk-agents` and flattened into the
//! top level here.

use std::path::Path;

use serde::Deserialize;
use townsfolk_agents::AgentsConfig;

/// Environment variable that overrides `world.tick_interval_ms`.
pub const TICK_INTERVAL_ENV: &str = "TOWNSFOLK_TICK_INTERVAL_MS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `townsfolk-config.yaml`. Every field has a
/// default, so an empty file yields a working town.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Seed population for the engine binary.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Per-agent mechanics.
    #[serde(flatten)]
    pub agents: AgentsConfig,

    /// Action selection, thoughts, plans, and conversations.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Emergent social mechanics.
    #[serde(default)]
    pub initiatives: InitiativesConfig,

    /// Outbound fan-out channel and headline buffer.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Periodic snapshot export.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `TOWNSFOLK_TICK_INTERVAL_MS` overrides `world.tick_interval_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.normalize()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides()?;
        config.normalize()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(TICK_INTERVAL_ENV) {
            self.world.tick_interval_ms =
                raw.trim().parse().map_err(|err| ConfigError::Invalid {
                    reason: format!("{TICK_INTERVAL_ENV} must be an integer, got {raw:?}: {err}"),
                })?;
        }
        Ok(())
    }

    /// Check ranges and put the mood table in descending order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on a zero tick interval or a
    /// malformed probability.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        if self.world.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("world.tick_interval_ms must be at least 1"),
            });
        }
        self.agents
            .needs
            .mood_thresholds
            .sort_by(|a, b| b.min_mean.total_cmp(&a.min_mean));

        let chances = [
            ("random_events.chance", self.agents.random_events.chance),
            ("decision.idle_thought_chance", self.decision.idle_thought_chance),
            ("decision.action_thought_chance", self.decision.action_thought_chance),
            ("decision.mood_thought_chance", self.decision.mood_thought_chance),
            ("decision.memory_thought_chance", self.decision.memory_thought_chance),
            ("decision.plan_chance", self.decision.plan_chance),
            ("decision.conversation_chance", self.decision.conversation_chance),
            ("initiatives.challenge.chance", self.initiatives.challenge.chance),
            ("initiatives.challenge.rival_bias", self.initiatives.challenge.rival_bias),
            ("initiatives.crew.chance", self.initiatives.crew.chance),
            (
                "initiatives.crew.succession_chance",
                self.initiatives.crew.succession_chance,
            ),
            ("initiatives.gathering.chance", self.initiatives.gathering.chance),
            ("initiatives.goal.chance", self.initiatives.goal.chance),
            ("initiatives.market.chance", self.initiatives.market.chance),
            ("initiatives.structure.chance", self.initiatives.structure.chance),
            ("initiatives.territory.chance", self.initiatives.territory.chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable town name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible runs; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many scheduler passes; run forever when absent.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: None,
        }
    }
}

/// Seed population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Agents spawned when the engine starts.
    pub initial_agents: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { initial_agents: 8 }
    }
}

/// Decision engine knobs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Weight multiplier when an action repeats the current activity.
    pub anti_repeat_factor: f64,
    /// Added to the action matching an active goal.
    pub goal_bonus: f64,
    /// Added to actions located where a crewmate currently is.
    pub crewmate_bonus: f64,
    /// Chance of an idle thought while mid-action.
    pub idle_thought_chance: f64,
    /// Chance of action-flavored thought text.
    pub action_thought_chance: f64,
    /// Chance of mood-flavored thought text when mood is extreme.
    pub mood_thought_chance: f64,
    /// Chance of memory/goal/crew-flavored thought text.
    pub memory_thought_chance: f64,
    /// Chance per tick of a narrative plan.
    pub plan_chance: f64,
    /// Chance per tick of a conversation with a co-located peer.
    pub conversation_chance: f64,
    /// Friendship gained by a conversation outside the arena.
    pub conversation_friendship: f64,
    /// Rivalry gained by a conversation in the arena.
    pub conversation_rivalry: f64,
    /// Social need gained by both participants.
    pub conversation_social_bonus: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            anti_repeat_factor: 0.3,
            goal_bonus: 3.0,
            crewmate_bonus: 2.0,
            idle_thought_chance: 0.1,
            action_thought_chance: 0.6,
            mood_thought_chance: 0.3,
            memory_thought_chance: 0.2,
            plan_chance: 0.05,
            conversation_chance: 0.2,
            conversation_friendship: 2.0,
            conversation_rivalry: 3.0,
            conversation_social_bonus: 5.0,
        }
    }
}

/// Every initiative's probability, cost, cap, and cooldown.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InitiativesConfig {
    /// Skill duels.
    pub challenge: ChallengeConfig,
    /// Crews.
    pub crew: CrewConfig,
    /// Hosted gatherings.
    pub gathering: GatheringConfig,
    /// Personal goals.
    pub goal: GoalConfig,
    /// Plot and item trading.
    pub market: MarketConfig,
    /// Built structures.
    pub structure: StructureConfig,
    /// Crew territory claims.
    pub territory: TerritoryConfig,
}

/// Challenge constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Origination chance per eligible agent per pass.
    pub chance: f64,
    /// Balance the creator needs before issuing.
    pub min_balance: u64,
    /// Smallest wager.
    pub min_wager: u64,
    /// Lower bound of the wager fraction of balance.
    pub wager_fraction_min: f64,
    /// Upper bound of the wager fraction of balance.
    pub wager_fraction_max: f64,
    /// Chance to target a rival when one exists.
    pub rival_bias: f64,
    /// Pending challenges allowed town-wide.
    pub max_active: usize,
    /// Ticks before the same ordered pair may duel again.
    pub pair_cooldown_ticks: u64,
    /// Base acceptance probability.
    pub accept_base: f64,
    /// Acceptance added per unit of agreeableness.
    pub accept_agreeableness: f64,
    /// Score bonus per unit of extraversion.
    pub extraversion_bonus: f64,
    /// Clout gained by the winner.
    pub winner_clout: u32,
    /// Clout lost by the loser.
    pub loser_clout: u32,
    /// Fun gained by the winner.
    pub winner_fun: f64,
    /// Fun lost by the loser.
    pub loser_fun: f64,
    /// XP awarded to the winner.
    pub winner_xp: u32,
    /// XP awarded to the loser.
    pub loser_xp: u32,
    /// Rivalry added between the duelists.
    pub rivalry_gain: f64,
    /// Friendship lost when the creator wins.
    pub friendship_cost_creator_won: f64,
    /// Friendship lost when the target wins.
    pub friendship_cost_target_won: f64,
    /// Finished challenges kept for snapshots.
    pub history: usize,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            chance: 0.04,
            min_balance: 20,
            min_wager: 10,
            wager_fraction_min: 0.1,
            wager_fraction_max: 0.3,
            rival_bias: 0.7,
            max_active: 3,
            pair_cooldown_ticks: 10,
            accept_base: 0.6,
            accept_agreeableness: 0.3,
            extraversion_bonus: 2.0,
            winner_clout: 5,
            loser_clout: 2,
            winner_fun: 15.0,
            loser_fun: 5.0,
            winner_xp: 40,
            loser_xp: 20,
            rivalry_gain: 10.0,
            friendship_cost_creator_won: 8.0,
            friendship_cost_target_won: 3.0,
            history: 20,
        }
    }
}

/// Crew constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CrewConfig {
    /// Founding chance per eligible agent per pass.
    pub chance: f64,
    /// Simcoins the founder pays.
    pub fee: u64,
    /// Active crews allowed town-wide.
    pub max_active: usize,
    /// Crew-less friends the founder needs.
    pub min_friends: usize,
    /// Most friends invited at founding.
    pub max_founding_friends: usize,
    /// Members at or above this clout add reputation each pass.
    pub reputation_clout_threshold: u32,
    /// Chance of succession when the leader's mood is poor.
    pub succession_chance: f64,
    /// Social gained by co-located members.
    pub colocated_social: f64,
    /// Fun gained by co-located members.
    pub colocated_fun: f64,
    /// A member leaves once friendship with the leader falls to this.
    pub leave_friendship: f64,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            chance: 0.02,
            fee: 100,
            max_active: 6,
            min_friends: 2,
            max_founding_friends: 3,
            reputation_clout_threshold: 50,
            succession_chance: 0.15,
            colocated_social: 3.0,
            colocated_fun: 2.0,
            leave_friendship: -20.0,
        }
    }
}

/// Hosted gathering constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GatheringConfig {
    /// Hosting chance per eligible agent per pass.
    pub chance: f64,
    /// Balance the host needs.
    pub min_balance: u64,
    /// Clout the host needs.
    pub min_clout: u32,
    /// Announced gatherings allowed town-wide.
    pub max_active: usize,
    /// Ticks since the last announcement before another may be hosted.
    pub cooldown_ticks: u64,
    /// Ticks between announcement and resolution.
    pub delay_ticks: u64,
    /// Simcoins the host pays.
    pub host_cost: u64,
    /// Clout the host gains per attendee.
    pub host_clout_per_attendee: u32,
    /// Cap on the host's clout gain.
    pub host_clout_cap: u32,
    /// Held gatherings kept for snapshots.
    pub history: usize,
}

impl Default for GatheringConfig {
    fn default() -> Self {
        Self {
            chance: 0.03,
            min_balance: 200,
            min_clout: 60,
            max_active: 1,
            cooldown_ticks: 20,
            delay_ticks: 2,
            host_cost: 50,
            host_clout_per_attendee: 2,
            host_clout_cap: 10,
            history: 20,
        }
    }
}

/// Goal constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    /// Chance per eligible agent per pass of setting a goal.
    pub chance: f64,
    /// Simcoins granted on completion.
    pub reward_coins: u64,
    /// Clout granted on completion.
    pub reward_clout: u32,
    /// Ticks after which an unfinished goal is abandoned.
    pub abandon_after_ticks: u64,
    /// Balance increase targeted by a savings goal.
    pub save_up_amount: f64,
    /// Need mean targeted by a calm goal.
    pub calm_mean: f64,
    /// Finished goals kept for snapshots.
    pub history: usize,
    /// Weight a telling memory adds to the category it points at.
    pub memory_bias: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            chance: 0.05,
            reward_coins: 50,
            reward_clout: 3,
            abandon_after_ticks: 300,
            save_up_amount: 200.0,
            calm_mean: 70.0,
            history: 30,
            memory_bias: 1.5,
        }
    }
}

/// Structure constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Build chance per eligible agent per pass.
    pub chance: f64,
    /// Standing structures allowed town-wide.
    pub max_global: usize,
    /// Standing structures allowed per place.
    pub max_per_place: usize,
    /// Health of a new structure.
    pub starting_health: u32,
    /// Health lost per elapsed tick.
    pub decay_per_tick: u32,
    /// Vendor stall income per co-located agent.
    pub vendor_income_per_agent: u64,
    /// Vendor stall income cap per pass.
    pub vendor_income_cap: u64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            chance: 0.03,
            max_global: 12,
            max_per_place: 3,
            starting_health: 100,
            decay_per_tick: 2,
            vendor_income_per_agent: 2,
            vendor_income_cap: 10,
        }
    }
}

/// Territory constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerritoryConfig {
    /// Claim chance per crew leader per pass.
    pub chance: f64,
    /// Simcoins the leader pays.
    pub cost: u64,
    /// Ticks a claim lasts.
    pub duration_ticks: u64,
    /// Fun granted to present crew members per pass.
    pub fun_bonus: f64,
    /// Social granted to present crew members per pass.
    pub social_bonus: f64,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            chance: 0.02,
            cost: 150,
            duration_ticks: 50,
            fun_bonus: 2.0,
            social_bonus: 2.0,
        }
    }
}

/// Plot and item trading constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Chance per eligible agent per pass of visiting the market.
    pub chance: f64,
    /// Simcoins a buyer keeps back after paying for a plot.
    pub reserve: u64,
    /// Below this balance an agent sells instead of buying.
    pub hardship_balance: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            chance: 0.02,
            reserve: 50,
            hardship_balance: 10,
        }
    }
}

/// Outbound fan-out configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Buffered messages per subscriber before lagging ones drop.
    pub channel_capacity: usize,
    /// Headlines kept in the ring buffer.
    pub headline_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            headline_capacity: 50,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Snapshot export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnapshotConfig {
    /// Where the engine writes the JSON snapshot.
    #[serde(default = "default_snapshot_path")]
    pub path: String,

    /// Write a snapshot every this many passes; 0 disables export.
    #[serde(default = "default_snapshot_every_ticks")]
    pub every_ticks: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            every_ticks: default_snapshot_every_ticks(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Townsfolk".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_snapshot_path() -> String {
    "townsfolk-snapshot.json".to_owned()
}

const fn default_snapshot_every_ticks() -> u64 {
    12
}

#[cfg(test)]
mod tests {
    use townsfolk_types::{Mood, Need};

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let mut config = SimulationConfig::default();
        assert!(config.normalize().is_ok());
        assert_eq!(config.world.tick_interval_ms, 5_000);
        assert_eq!(config.initiatives.challenge.max_active, 3);
        assert_eq!(config.initiatives.crew.max_active, 6);
        assert_eq!(config.broadcast.headline_capacity, 50);
        assert_eq!(config.agents.memory.capacity, 15);
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
world:
  name: Maple Hollow
  seed: 9
needs:
  critical_threshold: 20
  mood_thresholds:
    - { min_mean: 40, mood: content }
    - { min_mean: 70, mood: ecstatic }
initiatives:
  challenge:
    max_active: 5
logging:
  json: true
";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Maple Hollow");
        assert_eq!(config.world.seed, Some(9));
        assert!((config.agents.needs.critical_threshold - 20.0).abs() < f64::EPSILON);
        // untouched sibling fields keep their defaults
        assert_eq!(config.agents.needs.decay_rates.get(&Need::Hunger), Some(&1.5));
        assert_eq!(config.initiatives.challenge.max_active, 5);
        assert_eq!(config.initiatives.challenge.pair_cooldown_ticks, 10);
        assert!(config.logging.json);

        // mood table is re-sorted descending
        let first = config.agents.needs.mood_thresholds.first().map(|t| t.mood);
        assert_eq!(first, Some(Mood::Ecstatic));
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = SimulationConfig::parse(include_str!("../../../townsfolk-config.yaml"));
        assert!(shipped.is_ok(), "{shipped:?}");
        let shipped = shipped.ok().unwrap_or_default();
        let mut defaults = SimulationConfig::default();
        assert!(defaults.normalize().is_ok());
        assert_eq!(shipped, defaults);
    }

    #[test]
    fn rejects_bad_probability() {
        let yaml = "initiatives:\n  goal:\n    chance: 1.5\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_thought_and_bias_chances() {
        let cases = [
            "decision:\n  idle_thought_chance: 1.2\n",
            "decision:\n  action_thought_chance: 1.5\n",
            "decision:\n  mood_thought_chance: -0.1\n",
            "decision:\n  memory_thought_chance: 2.0\n",
            "initiatives:\n  challenge:\n    rival_bias: 1.01\n",
            "initiatives:\n  crew:\n    succession_chance: -0.5\n",
        ];
        for yaml in cases {
            assert!(
                matches!(SimulationConfig::parse(yaml), Err(ConfigError::Invalid { .. })),
                "accepted {yaml:?}"
            );
        }
    }

    #[test]
    fn rejects_zero_interval() {
        let yaml = "world:\n  tick_interval_ms: 0\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("townsfolk-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

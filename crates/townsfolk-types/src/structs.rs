//! Core entity structs for the Townsfolk simulation.
//!
//! These are plain data records. The rules that mutate them (decay,
//! clamping, leveling, ledger checks) live in `townsfolk-agents` and
//! `townsfolk-core`; this crate only defines shape and serialization.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    Activity, ChallengeStatus, CrewRole, GatheringKind, GatheringStatus, GoalCategory, GoalStatus,
    ItemKind, MemoryKind, Mood, Need, PersonalityTrait, Place, SkillName, StructureKind,
};
use crate::ids::{
    AgentId, ChallengeId, CrewId, GatheringId, GoalId, StructureId, TerritoryId,
};

// ---------------------------------------------------------------------------
// Agent building blocks
// ---------------------------------------------------------------------------

/// The six need values of an agent, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Needs {
    /// Rest.
    pub energy: f64,
    /// Fullness.
    pub hunger: f64,
    /// Cleanliness.
    pub hygiene: f64,
    /// Company.
    pub social: f64,
    /// Entertainment.
    pub fun: f64,
    /// Physical ease.
    pub comfort: f64,
}

impl Needs {
    /// Every need set to the same value.
    pub const fn uniform(value: f64) -> Self {
        Self {
            energy: value,
            hunger: value,
            hygiene: value,
            social: value,
            fun: value,
            comfort: value,
        }
    }

    /// Read one need.
    pub const fn get(&self, need: Need) -> f64 {
        match need {
            Need::Energy => self.energy,
            Need::Hunger => self.hunger,
            Need::Hygiene => self.hygiene,
            Need::Social => self.social,
            Need::Fun => self.fun,
            Need::Comfort => self.comfort,
        }
    }

    /// Mutable access to one need. Callers are responsible for clamping.
    pub const fn get_mut(&mut self, need: Need) -> &mut f64 {
        match need {
            Need::Energy => &mut self.energy,
            Need::Hunger => &mut self.hunger,
            Need::Hygiene => &mut self.hygiene,
            Need::Social => &mut self.social,
            Need::Fun => &mut self.fun,
            Need::Comfort => &mut self.comfort,
        }
    }

    /// Arithmetic mean of the six needs.
    pub fn mean(&self) -> f64 {
        Need::ALL.iter().map(|n| self.get(*n)).sum::<f64>() / 6.0
    }
}

impl Default for Needs {
    fn default() -> Self {
        Self::uniform(80.0)
    }
}

/// Five personality scalars, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Personality {
    /// Curiosity and appetite for novelty.
    pub openness: f64,
    /// Diligence.
    pub conscientiousness: f64,
    /// Outgoing nature.
    pub extraversion: f64,
    /// Cooperativeness.
    pub agreeableness: f64,
    /// Stress-proneness.
    pub neuroticism: f64,
}

impl Personality {
    /// A perfectly average personality (every trait at 0.5).
    pub const fn balanced() -> Self {
        Self {
            openness: 0.5,
            conscientiousness: 0.5,
            extraversion: 0.5,
            agreeableness: 0.5,
            neuroticism: 0.5,
        }
    }

    /// Read one trait.
    pub const fn get(&self, personality_trait: PersonalityTrait) -> f64 {
        match personality_trait {
            PersonalityTrait::Openness => self.openness,
            PersonalityTrait::Conscientiousness => self.conscientiousness,
            PersonalityTrait::Extraversion => self.extraversion,
            PersonalityTrait::Agreeableness => self.agreeableness,
            PersonalityTrait::Neuroticism => self.neuroticism,
        }
    }

    /// Copy with every trait clamped to `[0, 1]`.
    #[must_use]
    pub const fn clamped(self) -> Self {
        Self {
            openness: self.openness.clamp(0.0, 1.0),
            conscientiousness: self.conscientiousness.clamp(0.0, 1.0),
            extraversion: self.extraversion.clamp(0.0, 1.0),
            agreeableness: self.agreeableness.clamp(0.0, 1.0),
            neuroticism: self.neuroticism.clamp(0.0, 1.0),
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Where an agent is: at a named place, or on the way to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "state", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Location {
    /// Standing at a place.
    At {
        /// The place.
        place: Place,
    },
    /// Traveling toward a place.
    Traveling {
        /// Destination.
        to: Place,
    },
}

impl Location {
    /// The place the agent stands at, or `None` while traveling.
    pub const fn place(self) -> Option<Place> {
        match self {
            Self::At { place } => Some(place),
            Self::Traveling { .. } => None,
        }
    }

    /// Whether the agent is on the move.
    pub const fn is_traveling(self) -> bool {
        matches!(self, Self::Traveling { .. })
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::At { place: Place::Home }
    }
}

/// Progress in one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SkillProgress {
    /// Current level, 1 through 10.
    pub level: u32,
    /// XP accumulated toward the next level. Pinned to 0 at level 10.
    pub xp: u32,
    /// Lifetime XP ever gained in this skill.
    pub total_xp: u64,
}

impl Default for SkillProgress {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            total_xp: 0,
        }
    }
}

/// A remembered qualitative event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemoryEntry {
    /// What kind of event this was.
    pub kind: MemoryKind,
    /// The other agent involved, if any.
    pub related_agent: Option<AgentId>,
    /// Human-readable description.
    pub description: String,
    /// How the agent felt about it, in `[-1, 1]`.
    pub sentiment: f64,
    /// Simulation tick when it happened.
    pub tick: u64,
}

/// The full mutable profile of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentProfile {
    /// Agent identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Current needs.
    pub needs: Needs,
    /// Mood derived from `needs`.
    pub mood: Mood,
    /// Personality traits.
    pub personality: Personality,
    /// Simcoin balance.
    pub balance: u64,
    /// Items held.
    pub inventory: BTreeMap<ItemKind, u32>,
    /// Social standing, 0 to 100.
    pub clout: u32,
    /// Points granted by the scoring collaborator.
    pub points: u64,
    /// Where the agent is.
    pub location: Location,
    /// What the agent is doing.
    pub activity: Activity,
    /// Ticks left on the current activity.
    pub remaining_ticks: u32,
    /// Skill progress by name.
    pub skills: BTreeMap<SkillName, SkillProgress>,
    /// Bounded memory buffer, oldest first.
    pub memories: Vec<MemoryEntry>,
    /// Latest flavor thought.
    pub thought: Option<String>,
    /// Latest narrative plan.
    pub plan: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// Wall-clock instant up to which ticks have been processed.
    pub last_processed_at: DateTime<Utc>,
}

impl AgentProfile {
    /// The skill's progress, or the level-1 default if never used.
    pub fn skill(&self, skill: SkillName) -> SkillProgress {
        self.skills.get(&skill).copied().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Relationships and economy
// ---------------------------------------------------------------------------

/// A relationship row between an unordered pair, stored under (min, max).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Relationship {
    /// The smaller agent id of the pair.
    pub agent_a: AgentId,
    /// The larger agent id of the pair.
    pub agent_b: AgentId,
    /// Friendship, -100 to 100.
    pub friendship: f64,
    /// Rivalry, 0 to 100.
    pub rivalry: f64,
    /// Number of recorded interactions.
    pub interactions: u32,
    /// When they last interacted.
    pub last_interaction: DateTime<Utc>,
}

/// A purchasable plot of land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Property {
    /// Plot number, unique across town.
    pub plot: u32,
    /// Purchase price in simcoins.
    pub price: u64,
    /// Current owner.
    pub owner: Option<AgentId>,
}

// ---------------------------------------------------------------------------
// Initiatives
// ---------------------------------------------------------------------------

/// Outcome of an accepted challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChallengeOutcome {
    /// Who won.
    pub winner: AgentId,
    /// Who lost.
    pub loser: AgentId,
    /// Winner's score.
    pub winner_score: f64,
    /// Loser's score.
    pub loser_score: f64,
    /// Simcoins that actually moved.
    pub payout: u64,
}

/// A skill duel between two agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Challenge {
    /// Identifier.
    pub id: ChallengeId,
    /// Who issued it.
    pub creator: AgentId,
    /// Who was challenged.
    pub target: AgentId,
    /// Skill being contested.
    pub skill: SkillName,
    /// Simcoins at stake.
    pub wager: u64,
    /// Lifecycle state.
    pub status: ChallengeStatus,
    /// Tick it was issued.
    pub created_tick: u64,
    /// Present once resolved.
    pub outcome: Option<ChallengeOutcome>,
}

/// One crew member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CrewMember {
    /// The member.
    pub agent_id: AgentId,
    /// Role in the crew.
    pub role: CrewRole,
    /// Tick they joined.
    pub joined_tick: u64,
}

/// A named group of agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Crew {
    /// Identifier.
    pub id: CrewId,
    /// Unique display name.
    pub name: String,
    /// Motto.
    pub motto: String,
    /// Hex color.
    pub color: String,
    /// Current leader.
    pub leader: AgentId,
    /// Members, leader included.
    pub members: Vec<CrewMember>,
    /// Accumulated reputation.
    pub reputation: u64,
    /// Tick it was founded.
    pub founded_tick: u64,
    /// Whether the crew has dissolved.
    pub dissolved: bool,
}

impl Crew {
    /// Whether the agent is a member.
    pub fn has_member(&self, agent_id: AgentId) -> bool {
        self.members.iter().any(|m| m.agent_id == agent_id)
    }
}

/// A gathering hosted by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Gathering {
    /// Identifier.
    pub id: GatheringId,
    /// Host.
    pub host: AgentId,
    /// Subtype.
    pub kind: GatheringKind,
    /// Where it takes place.
    pub place: Place,
    /// Lifecycle state.
    pub status: GatheringStatus,
    /// Tick it was announced.
    pub created_tick: u64,
    /// Tick it resolves.
    pub starts_tick: u64,
    /// Agents present at resolution.
    pub attendees: Vec<AgentId>,
}

/// A personal goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Goal {
    /// Identifier.
    pub id: GoalId,
    /// Owner.
    pub agent_id: AgentId,
    /// Category.
    pub category: GoalCategory,
    /// Value the progress must reach.
    pub target: f64,
    /// Latest evaluated progress.
    pub progress: f64,
    /// Lifecycle state.
    pub status: GoalStatus,
    /// Tick it was set.
    pub created_tick: u64,
}

/// A structure built at a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Structure {
    /// Identifier.
    pub id: StructureId,
    /// Builder and owner.
    pub owner: AgentId,
    /// Kind.
    pub kind: StructureKind,
    /// Where it stands.
    pub place: Place,
    /// Remaining health; removed at zero.
    pub health: u32,
    /// Tick it was built.
    pub built_tick: u64,
    /// Simcoins earned so far (vendor stalls only).
    pub income_earned: u64,
}

/// A crew's claim on a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Territory {
    /// Identifier.
    pub id: TerritoryId,
    /// Claiming crew.
    pub crew_id: CrewId,
    /// Claimed place.
    pub place: Place,
    /// Leader who paid for the claim.
    pub claimed_by: AgentId,
    /// Tick it was claimed.
    pub claimed_tick: u64,
    /// Tick it expires.
    pub expires_tick: u64,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A full read of the world state for polling and reconnect catch-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Simulation tick counter.
    pub tick: u64,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Every agent.
    pub agents: Vec<AgentProfile>,
    /// Every relationship row.
    pub relationships: Vec<Relationship>,
    /// Every plot.
    pub properties: Vec<Property>,
    /// Every crew, dissolved ones included.
    pub crews: Vec<Crew>,
    /// Pending and recently resolved challenges.
    pub challenges: Vec<Challenge>,
    /// Announced and recently held gatherings.
    pub gatherings: Vec<Gathering>,
    /// Goals, active and recently finished.
    pub goals: Vec<Goal>,
    /// Standing structures.
    pub structures: Vec<Structure>,
    /// Active territory claims.
    pub territories: Vec<Territory>,
    /// Recent headlines, oldest first.
    pub headlines: Vec<String>,
}

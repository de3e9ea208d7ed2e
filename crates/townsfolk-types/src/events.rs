//! Strongly typed outbound payloads.
//!
//! The simulation core hands these to the event and chat sinks. They are
//! serialized only at the fan-out boundary; nothing inside the core ever
//! inspects a serialized blob.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ActionKind, GatheringKind, GoalCategory, ItemKind, Mood, Need, Place, RandomEventKind,
    SkillName, StructureKind,
};
use crate::ids::{AgentId, ChallengeId, CrewId, GatheringId, GoalId, StructureId, TerritoryId};

/// A structured event emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SimEvent {
    /// An agent was created on first reference.
    AgentJoined {
        /// The agent.
        agent_id: AgentId,
        /// Display name.
        name: String,
    },
    /// A traveling agent reached its destination.
    Arrived {
        /// The agent.
        agent_id: AgentId,
        /// Where they arrived.
        place: Place,
    },
    /// An agent set off toward another place.
    Departed {
        /// The agent.
        agent_id: AgentId,
        /// Where they left from.
        from: Place,
        /// Where they are heading.
        to: Place,
    },
    /// An agent started a catalog action.
    ActionStarted {
        /// The agent.
        agent_id: AgentId,
        /// The action.
        action: ActionKind,
        /// Where.
        place: Place,
        /// Forced by a critical need.
        critical: bool,
    },
    /// An agent's mood category changed.
    MoodChanged {
        /// The agent.
        agent_id: AgentId,
        /// New mood.
        mood: Mood,
    },
    /// A random flavor event hit an agent.
    RandomEvent {
        /// The agent.
        agent_id: AgentId,
        /// What happened.
        kind: RandomEventKind,
    },
    /// Two co-located agents chatted.
    Conversation {
        /// Who started it.
        initiator: AgentId,
        /// Who answered.
        partner: AgentId,
        /// Where.
        place: Place,
        /// The scripted lines, in order.
        lines: Vec<String>,
    },
    /// An agent made a narrative plan.
    PlanMade {
        /// The agent.
        agent_id: AgentId,
        /// Plan text.
        plan: String,
    },
    /// An external reward was applied.
    RewardApplied {
        /// The agent.
        agent_id: AgentId,
        /// Net simcoin change actually applied.
        currency_delta: i64,
        /// Needs that were touched.
        needs: Vec<Need>,
        /// Skills that gained XP.
        skills: Vec<SkillName>,
    },
    /// An agent bought a plot.
    PropertyBought {
        /// The buyer.
        agent_id: AgentId,
        /// Plot number.
        plot: u32,
        /// Price paid.
        price: u64,
    },
    /// An agent sold their plot back to town.
    PropertySold {
        /// The seller.
        agent_id: AgentId,
        /// Plot number.
        plot: u32,
        /// Simcoins refunded.
        refund: u64,
    },
    /// An agent sold items back at the resale price.
    ItemSold {
        /// The seller.
        agent_id: AgentId,
        /// What was sold.
        item: ItemKind,
        /// How many.
        quantity: u32,
        /// Simcoins refunded.
        refund: u64,
    },
    /// A skill reached a new level.
    SkillLevelUp {
        /// The agent.
        agent_id: AgentId,
        /// The skill.
        skill: SkillName,
        /// New level.
        level: u32,
    },
    /// A challenge was issued.
    ChallengeIssued {
        /// Challenge id.
        challenge_id: ChallengeId,
        /// Challenger.
        creator: AgentId,
        /// Challenged.
        target: AgentId,
        /// Contested skill.
        skill: SkillName,
        /// Simcoins at stake.
        wager: u64,
    },
    /// A challenge was accepted and fought.
    ChallengeResolved {
        /// Challenge id.
        challenge_id: ChallengeId,
        /// Winner.
        winner: AgentId,
        /// Loser.
        loser: AgentId,
        /// Simcoins moved.
        payout: u64,
    },
    /// A challenge was declined or dropped.
    ChallengeExpired {
        /// Challenge id.
        challenge_id: ChallengeId,
    },
    /// A crew was founded.
    CrewFormed {
        /// Crew id.
        crew_id: CrewId,
        /// Crew name.
        name: String,
        /// Founder.
        leader: AgentId,
        /// All founding members.
        members: Vec<AgentId>,
    },
    /// A member left a crew.
    CrewMemberLeft {
        /// Crew id.
        crew_id: CrewId,
        /// Departing member.
        agent_id: AgentId,
    },
    /// Crew leadership passed to another member.
    CrewLeaderChanged {
        /// Crew id.
        crew_id: CrewId,
        /// Previous leader.
        previous: AgentId,
        /// New leader.
        leader: AgentId,
    },
    /// A crew dissolved.
    CrewDissolved {
        /// Crew id.
        crew_id: CrewId,
        /// Crew name.
        name: String,
    },
    /// A gathering was announced.
    GatheringAnnounced {
        /// Gathering id.
        gathering_id: GatheringId,
        /// Host.
        host: AgentId,
        /// Subtype.
        kind: GatheringKind,
        /// Venue.
        place: Place,
        /// Tick it will be held.
        starts_tick: u64,
    },
    /// A gathering took place.
    GatheringHeld {
        /// Gathering id.
        gathering_id: GatheringId,
        /// Agents present.
        attendees: Vec<AgentId>,
    },
    /// A goal was set.
    GoalSet {
        /// Goal id.
        goal_id: GoalId,
        /// Owner.
        agent_id: AgentId,
        /// Category.
        category: GoalCategory,
        /// Target value.
        target: f64,
    },
    /// A goal was completed.
    GoalCompleted {
        /// Goal id.
        goal_id: GoalId,
        /// Owner.
        agent_id: AgentId,
        /// Category.
        category: GoalCategory,
    },
    /// A goal ran out of time.
    GoalAbandoned {
        /// Goal id.
        goal_id: GoalId,
        /// Owner.
        agent_id: AgentId,
    },
    /// A structure was built.
    StructureBuilt {
        /// Structure id.
        structure_id: StructureId,
        /// Builder.
        owner: AgentId,
        /// Kind.
        kind: StructureKind,
        /// Where.
        place: Place,
    },
    /// A structure crumbled.
    StructureDestroyed {
        /// Structure id.
        structure_id: StructureId,
        /// Kind.
        kind: StructureKind,
        /// Where.
        place: Place,
    },
    /// A crew claimed a place.
    TerritoryClaimed {
        /// Territory id.
        territory_id: TerritoryId,
        /// Crew id.
        crew_id: CrewId,
        /// Claimed place.
        place: Place,
        /// Tick it expires.
        expires_tick: u64,
    },
    /// A territory claim lapsed.
    TerritoryExpired {
        /// Territory id.
        territory_id: TerritoryId,
        /// Crew id.
        crew_id: CrewId,
        /// Place released.
        place: Place,
    },
}

/// One line of chat attributed to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatLine {
    /// Speaker.
    pub agent_id: AgentId,
    /// Speaker's display name.
    pub agent_name: String,
    /// What they said or thought.
    pub text: String,
}

/// Everything that leaves the core over the fan-out channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "channel", content = "payload", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Outbound {
    /// A structured event.
    Event(SimEvent),
    /// A chat line.
    Chat(ChatLine),
}

//! Enumeration types for the Townsfolk simulation.
//!
//! Every string-keyed catalog of the town (needs, traits, places, actions,
//! items, initiative kinds) is a closed enumeration here. Catalog data bound
//! to a variant lives next to the subsystem that uses it and is selected by
//! exhaustive `match`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Needs, traits, mood
// ---------------------------------------------------------------------------

/// One of the six bounded agent resources. 100 means fully satisfied.
///
/// The declaration order is the documented priority used to break ties when
/// several needs are equally critical: the first listed wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Need {
    /// Rest. Restored by sleeping.
    Energy,
    /// Fullness. Restored by eating or cooking.
    Hunger,
    /// Cleanliness. Restored by showering.
    Hygiene,
    /// Company. Restored by socializing and conversations.
    Social,
    /// Entertainment. Restored by games and hobbies.
    Fun,
    /// Physical ease. Restored by lounging.
    Comfort,
}

impl Need {
    /// Every need in tie-break priority order.
    pub const ALL: [Self; 6] = [
        Self::Energy,
        Self::Hunger,
        Self::Hygiene,
        Self::Social,
        Self::Fun,
        Self::Comfort,
    ];

    /// Lower-case display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Hunger => "hunger",
            Self::Hygiene => "hygiene",
            Self::Social => "social",
            Self::Fun => "fun",
            Self::Comfort => "comfort",
        }
    }
}

/// One of the five personality scalars, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PersonalityTrait {
    /// Curiosity and appetite for novelty.
    Openness,
    /// Diligence and orderliness.
    Conscientiousness,
    /// Outgoing, energised by company.
    Extraversion,
    /// Cooperative and accommodating.
    Agreeableness,
    /// Prone to stress and worry.
    Neuroticism,
}

impl PersonalityTrait {
    /// Every trait in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Openness,
        Self::Conscientiousness,
        Self::Extraversion,
        Self::Agreeableness,
        Self::Neuroticism,
    ];
}

/// Discrete mood derived from the mean of the six needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Mood {
    /// Everything is going well.
    Ecstatic,
    /// Mostly satisfied.
    Happy,
    /// Getting by.
    Content,
    /// A few needs are slipping.
    Uneasy,
    /// Several needs are low.
    Stressed,
    /// Needs are collapsing.
    Miserable,
}

impl Mood {
    /// Whether the mood is extreme enough to colour an agent's thoughts.
    pub const fn is_extreme(self) -> bool {
        matches!(self, Self::Ecstatic | Self::Stressed | Self::Miserable)
    }

    /// Whether the mood counts as poor (crew leaders step down on poor mood).
    pub const fn is_poor(self) -> bool {
        matches!(self, Self::Stressed | Self::Miserable)
    }

    /// Lower-case display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ecstatic => "ecstatic",
            Self::Happy => "happy",
            Self::Content => "content",
            Self::Uneasy => "uneasy",
            Self::Stressed => "stressed",
            Self::Miserable => "miserable",
        }
    }
}

// ---------------------------------------------------------------------------
// Places, actions, activities
// ---------------------------------------------------------------------------

/// A named place in town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Place {
    /// Every agent's private home.
    Home,
    /// Coffee and meals.
    Cafe,
    /// Green space for lounging and painting.
    Park,
    /// Weights and treadmills.
    Gym,
    /// Quiet study.
    Library,
    /// Competitive games. Conversations here breed rivalry.
    Arena,
    /// The town square.
    Plaza,
    /// Shops and stalls.
    Market,
    /// Paid work.
    Office,
}

impl Place {
    /// Every place in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Home,
        Self::Cafe,
        Self::Park,
        Self::Gym,
        Self::Library,
        Self::Arena,
        Self::Plaza,
        Self::Market,
        Self::Office,
    ];

    /// Lower-case display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Cafe => "cafe",
            Self::Park => "park",
            Self::Gym => "gym",
            Self::Library => "library",
            Self::Arena => "arena",
            Self::Plaza => "plaza",
            Self::Market => "market",
            Self::Office => "office",
        }
    }
}

/// An entry in the autonomous action catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// Sleep at home.
    Sleep,
    /// Buy a meal at the cafe.
    Eat,
    /// Cook at home.
    Cook,
    /// Wash up at home.
    Shower,
    /// Lounge in the park.
    Lounge,
    /// Hang out at the plaza.
    Socialize,
    /// Play competitive games at the arena.
    Compete,
    /// Train at the gym.
    Workout,
    /// Read at the library.
    Study,
    /// Paint in the park.
    Paint,
    /// Browse the market.
    Shop,
    /// Earn simcoins at the office.
    Work,
}

impl ActionKind {
    /// The full catalog in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Sleep,
        Self::Eat,
        Self::Cook,
        Self::Shower,
        Self::Lounge,
        Self::Socialize,
        Self::Compete,
        Self::Workout,
        Self::Study,
        Self::Paint,
        Self::Shop,
        Self::Work,
    ];

    /// Present-participle verb for narrative text ("sleeping").
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Sleep => "sleeping",
            Self::Eat => "eating",
            Self::Cook => "cooking",
            Self::Shower => "showering",
            Self::Lounge => "lounging",
            Self::Socialize => "socializing",
            Self::Compete => "competing",
            Self::Workout => "working out",
            Self::Study => "studying",
            Self::Paint => "painting",
            Self::Shop => "shopping",
            Self::Work => "working",
        }
    }
}

/// What an agent is currently doing. At most one activity at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "action", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Activity {
    /// Nothing in progress.
    Idle,
    /// On the way to another place.
    Traveling,
    /// Performing a catalog action.
    Performing(ActionKind),
}

impl Activity {
    /// Whether the agent is asleep.
    pub const fn is_sleeping(self) -> bool {
        matches!(self, Self::Performing(ActionKind::Sleep))
    }
}

// ---------------------------------------------------------------------------
// Skills and items
// ---------------------------------------------------------------------------

/// A skill an agent can level from 1 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SkillName {
    /// Kitchen craft.
    Cooking,
    /// Strength and stamina.
    Fitness,
    /// Social grace.
    Charisma,
    /// Reasoning.
    Logic,
    /// Artistic flair.
    Creativity,
}

impl SkillName {
    /// Every skill in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Cooking,
        Self::Fitness,
        Self::Charisma,
        Self::Logic,
        Self::Creativity,
    ];

    /// Lower-case display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cooking => "cooking",
            Self::Fitness => "fitness",
            Self::Charisma => "charisma",
            Self::Logic => "logic",
            Self::Creativity => "creativity",
        }
    }
}

/// An item agents can buy at the market and hold in inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ItemKind {
    /// A takeaway coffee.
    Coffee,
    /// A paperback.
    Book,
    /// A potted plant.
    Plant,
    /// An acoustic guitar.
    Guitar,
    /// A shiny trophy.
    Trophy,
}

impl ItemKind {
    /// Every item in ascending price order.
    pub const ALL: [Self; 5] = [
        Self::Coffee,
        Self::Book,
        Self::Plant,
        Self::Guitar,
        Self::Trophy,
    ];

    /// Market price in simcoins.
    pub const fn price(self) -> u64 {
        match self {
            Self::Coffee => 5,
            Self::Book => 15,
            Self::Plant => 20,
            Self::Guitar => 60,
            Self::Trophy => 100,
        }
    }

    /// Lower-case display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coffee => "coffee",
            Self::Book => "book",
            Self::Plant => "plant",
            Self::Guitar => "guitar",
            Self::Trophy => "trophy",
        }
    }
}

// ---------------------------------------------------------------------------
// Memories and random events
// ---------------------------------------------------------------------------

/// Category of a remembered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MemoryKind {
    /// A chat with a peer.
    Conversation,
    /// A duel won, lost, or declined.
    Challenge,
    /// Founding, joining, leading, or losing a crew.
    Crew,
    /// Attending or hosting a gathering.
    Gathering,
    /// Setting or completing a goal.
    Goal,
    /// Building or losing a structure.
    Structure,
    /// Claiming or losing territory.
    Territory,
    /// A random happening.
    Incident,
    /// A reward from outside the simulation.
    Reward,
    /// Buying or selling a plot.
    Property,
}

/// A low-probability flavor event with a direct effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RandomEventKind {
    /// Found some simcoins on the ground.
    FoundCoins,
    /// Got soaked by a sudden shower.
    CaughtInRain,
    /// Stumbled on a street performance.
    StreetPerformance,
    /// A barista handed out a free coffee.
    FreeCoffee,
    /// Stubbed a toe.
    StubbedToe,
    /// Got a compliment from a stranger.
    Compliment,
}

impl RandomEventKind {
    /// Every random event in declaration order.
    pub const ALL: [Self; 6] = [
        Self::FoundCoins,
        Self::CaughtInRain,
        Self::StreetPerformance,
        Self::FreeCoffee,
        Self::StubbedToe,
        Self::Compliment,
    ];
}

// ---------------------------------------------------------------------------
// Initiative kinds and states
// ---------------------------------------------------------------------------

/// Lifecycle of a challenge: `Pending` → `Resolved` (accepted) or `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ChallengeStatus {
    /// Issued, awaiting the target's answer.
    Pending,
    /// Accepted and fought.
    Resolved,
    /// Declined, or a participant vanished.
    Expired,
}

/// A member's role inside a crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum CrewRole {
    /// Founder or successor in charge.
    Leader,
    /// Regular member.
    Member,
}

/// A hosted gathering subtype, each bound to one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GatheringKind {
    /// A party on the plaza.
    Party,
    /// An open-air concert in the park.
    Concert,
    /// A tournament at the arena.
    Tournament,
    /// A book club at the library.
    BookClub,
    /// A potluck dinner at home.
    Potluck,
}

impl GatheringKind {
    /// Every gathering kind in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Party,
        Self::Concert,
        Self::Tournament,
        Self::BookClub,
        Self::Potluck,
    ];
}

/// Lifecycle of a gathering: `Announced` → `Held`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GatheringStatus {
    /// Waiting for the start tick.
    Announced,
    /// Effects applied to attendees.
    Held,
}

/// Category of a personal goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GoalCategory {
    /// Gain a fitness level.
    GetFit,
    /// Grow the simcoin balance.
    SaveUp,
    /// Gain a friend.
    MakeFriends,
    /// Gain a logic level.
    LearnSomething,
    /// Gain a creativity level.
    MakeArt,
    /// Bring the average need level up.
    FindCalm,
}

impl GoalCategory {
    /// Every category in declaration order.
    pub const ALL: [Self; 6] = [
        Self::GetFit,
        Self::SaveUp,
        Self::MakeFriends,
        Self::LearnSomething,
        Self::MakeArt,
        Self::FindCalm,
    ];
}

/// Lifecycle of a goal: `Active` → `Completed` or `Abandoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GoalStatus {
    /// Progress is re-evaluated every tick.
    Active,
    /// Target reached, reward granted.
    Completed,
    /// Ran out of time.
    Abandoned,
}

/// Kind of a built structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StructureKind {
    /// A place to sit.
    Bench,
    /// A painted wall.
    Mural,
    /// A small flower bed.
    Garden,
    /// A stall that earns its owner passive income.
    VendorStall,
}

impl StructureKind {
    /// Every structure kind in declaration order.
    pub const ALL: [Self; 4] = [Self::Bench, Self::Mural, Self::Garden, Self::VendorStall];

    /// Lower-case display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bench => "bench",
            Self::Mural => "mural",
            Self::Garden => "garden",
            Self::VendorStall => "vendor stall",
        }
    }
}

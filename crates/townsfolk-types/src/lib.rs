//! Shared type definitions for the Townsfolk simulation.
//!
//! This crate is the single source of truth for all data shapes used across
//! the Townsfolk workspace. Types flow downstream to `TypeScript` via `ts-rs`
//! for the 3D client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Closed catalogs (needs, traits, moods, places, actions, kinds)
//! - [`structs`] -- Agent profile, relationships, initiatives, world snapshot
//! - [`events`] -- Outbound event and chat payloads

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActionKind, Activity, ChallengeStatus, CrewRole, GatheringKind, GatheringStatus,
    GoalCategory, GoalStatus, ItemKind, MemoryKind, Mood, Need, PersonalityTrait, Place,
    RandomEventKind, SkillName, StructureKind,
};
pub use events::{ChatLine, Outbound, SimEvent};
pub use ids::{AgentId, ChallengeId, CrewId, GatheringId, GoalId, StructureId, TerritoryId};
pub use structs::{
    AgentProfile, Challenge, ChallengeOutcome, Crew, CrewMember, Gathering, Goal, Location,
    MemoryEntry, Needs, Personality, Property, Relationship, SkillProgress, Structure, Territory,
    WorldSnapshot,
};

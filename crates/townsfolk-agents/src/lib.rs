//! Per-agent mechanics for the Townsfolk simulation.
//!
//! This crate contains the logic layer for individual agents and pairs of
//! agents: everything that operates on agent state without touching I/O or
//! the clock. It sits between `townsfolk-types` (data shapes) and
//! `townsfolk-core` (orchestration).
//!
//! # Modules
//!
//! - [`agent`] -- Profile construction and seeded agent factory ([`AgentFactory`])
//! - [`config`] -- Tunable constants with defaults ([`AgentsConfig`])
//! - [`economy`] -- Simcoin ledger, items, and the plot registry ([`PropertyRegistry`])
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`memory`] -- Bounded per-agent memory buffer
//! - [`needs`] -- Need decay, clamping, and mood derivation
//! - [`random_events`] -- Low-probability flavor events
//! - [`skills`] -- Mood-scaled XP and the level curve
//! - [`social`] -- Symmetric relationship ledger ([`RelationshipGraph`])

pub mod agent;
pub mod config;
pub mod economy;
pub mod error;
pub mod memory;
pub mod needs;
pub mod random_events;
pub mod skills;
pub mod social;

// Re-export primary types at crate root for convenience.
pub use agent::{AgentFactory, new_profile, random_personality};
pub use config::{
    AgentsConfig, EconomyConfig, MemoryConfig, MoodThreshold, NeedsConfig, RandomEventConfig,
    SkillConfig, SocialConfig, TraitNeedModifier,
};
pub use economy::PropertyRegistry;
pub use error::AgentError;
pub use needs::{MoodShift, apply_need_effects, critical_need, derive_mood};
pub use skills::{MAX_SKILL_LEVEL, XpGain, award_xp};
pub use social::{RelationshipGraph, canonical_pair};

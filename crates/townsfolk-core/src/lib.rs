//! World state, decision engine, initiatives and the tick scheduler for the
//! Townsfolk simulation.
//!
//! This crate owns everything that happens between two agents: where they
//! go, what they do, who they talk to, and the duels, crews, gatherings,
//! goals, structures and territory claims that emerge from it.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and elapsed-tick computation from wall-clock
//!   drift.
//! - [`config`] -- Configuration loading from `townsfolk-config.yaml` into
//!   strongly-typed structs.
//! - [`world`] -- In-memory world state and the [`WorldQuery`] view handed
//!   to the decision engine.
//! - [`broadcast`] -- [`EventSink`] and the tokio-backed [`Broadcaster`].
//! - [`effects`] -- Need, XP and clout mutations that announce what changed.
//! - [`decision`] -- Per-agent action selection, travel, thoughts, plans and
//!   conversations.
//! - [`initiatives`] -- Challenges, crews, gatherings, goals, structures and
//!   territory.
//! - [`trigger`] -- Validated reward triggers from outside the simulation.
//! - [`tick`] -- The [`Scheduler`] that runs one pass at a time.
//! - [`runner`] -- The async loop around the scheduler.
//!
//! [`WorldQuery`]: world::WorldQuery
//! [`EventSink`]: broadcast::EventSink
//! [`Broadcaster`]: broadcast::Broadcaster
//! [`Scheduler`]: tick::Scheduler

pub mod broadcast;
pub mod clock;
pub mod config;
pub mod decision;
pub mod effects;
pub mod initiatives;
pub mod runner;
pub mod tick;
pub mod trigger;
pub mod world;

pub use broadcast::{Broadcaster, EventSink, RecordingSink};
pub use config::SimulationConfig;
pub use runner::{RunControl, SimulationResult, TickCallback, run_simulation};
pub use tick::{Scheduler, TickError, TickReport};
pub use trigger::{RewardTrigger, TriggerError};
pub use world::{World, WorldQuery};

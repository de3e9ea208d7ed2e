//! Tick scheduler: the per-pass orchestration of the whole town.
//!
//! Each call to [`Scheduler::tick`] runs one pass at a wall-clock instant:
//!
//! 1. **Agents** -- in id order, every agent whose last processed instant is
//!    at least one interval behind gets its elapsed ticks of need decay, one
//!    random event roll per elapsed tick, a decision engine turn against a
//!    read-only view of the world, and a chance to strike up a conversation.
//!    Agents with zero elapsed ticks are skipped untouched.
//!
//! 2. **Initiatives** -- the global clock advances by its own elapsed ticks;
//!    if that is non-zero, one initiative pass runs (resolution and upkeep,
//!    then origination).
//!
//! A failure while processing one agent is logged with its id and the pass
//! moves on to the next agent. Nothing in a pass is fatal except a clock
//! overflow.
//!
//! An agent's decay, random events and turn are buffered and only reach
//! the sink once the turn succeeds, so a discarded turn publishes nothing.
//! They are tagged with the tick the pass started from; initiative events
//! carry the tick after the advance.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use townsfolk_agents::{AgentError, needs, random_events};
use townsfolk_types::{AgentId, Personality, SimEvent, WorldSnapshot};
use tracing::{debug, info, warn};

use crate::broadcast::{Broadcaster, EventSink, RecordingSink};
use crate::clock::{self, ClockError};
use crate::config::SimulationConfig;
use crate::decision::{self, DecisionError, TurnOutcome, conversation};
use crate::effects;
use crate::initiatives::{self, Pass};
use crate::trigger::{self, RewardOutcome, RewardTrigger, TriggerError};
use crate::world::World;

/// Errors that can occur during a scheduler pass.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The agent vanished between listing and processing.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The decision engine failed for one agent.
    #[error("decision error for {agent_id}: {source}")]
    Decision {
        /// The agent whose turn failed.
        agent_id: AgentId,
        /// The underlying decision error.
        source: DecisionError,
    },
}

/// Summary of one scheduler pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Simulation tick after the pass.
    pub tick: u64,
    /// Global ticks the pass advanced; 0 means no initiative pass ran.
    pub elapsed: u64,
    /// Agents that had at least one elapsed tick.
    pub agents_processed: u32,
    /// Agents skipped with zero elapsed ticks.
    pub agents_skipped: u32,
    /// Agents whose processing failed and was logged.
    pub failures: u32,
}

/// Owns the world, the outbound sink and the random source, and drives
/// passes over them.
#[derive(Debug)]
pub struct Scheduler<S: EventSink = Broadcaster> {
    world: World,
    sink: S,
    rng: StdRng,
}

impl<S: EventSink> Scheduler<S> {
    /// Create an empty town anchored at `now`.
    ///
    /// `world.seed` in the configuration makes runs reproducible; without it
    /// the random source is seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] for an unusable tick interval.
    pub fn new(config: SimulationConfig, sink: S, now: DateTime<Utc>) -> Result<Self, TickError> {
        let rng = config
            .world
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let world = World::new(config, now)?;
        Ok(Self { world, sink, rng })
    }

    /// The world being simulated.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for seeding and tests.
    pub const fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The outbound sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the outbound sink.
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Create the agent on first reference and announce it.
    ///
    /// Returns `true` if the agent is new.
    pub fn register_agent(
        &mut self,
        id: AgentId,
        name: String,
        personality: Personality,
        now: DateTime<Utc>,
    ) -> bool {
        let created = self.world.register_agent(id, name.clone(), personality, now);
        if created {
            self.sink.emit_event(SimEvent::AgentJoined { agent_id: id, name });
        }
        created
    }

    /// Apply an already decoded reward trigger.
    ///
    /// # Errors
    ///
    /// See [`World::apply_trigger`].
    pub fn apply_trigger(&mut self, trigger: &RewardTrigger) -> Result<RewardOutcome, TriggerError> {
        self.world.apply_trigger(trigger, &mut self.sink)
    }

    /// Decode, validate and apply a JSON reward payload.
    ///
    /// A rejected payload is logged and leaves the world untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`TriggerError`] that rejected the payload.
    pub fn apply_trigger_json(&mut self, json: &str) -> Result<RewardOutcome, TriggerError> {
        let result = trigger::decode(json).and_then(|t| self.apply_trigger(&t));
        if let Err(err) = &result {
            warn!(error = %err, "reward trigger rejected");
        }
        result
    }

    /// Full read of the current state, headlines included.
    pub fn snapshot(&self, now: DateTime<Utc>) -> WorldSnapshot {
        self.world.snapshot(self.sink.recent_headlines(), now)
    }

    /// Run one pass at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if the tick counter would overflow.
    /// Per-agent failures are logged and counted in the report instead.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, TickError> {
        let mut report = TickReport::default();
        let ids: Vec<AgentId> = self.world.agents.keys().copied().collect();

        for agent_id in ids {
            match self.process_agent(agent_id, now) {
                Ok(true) => report.agents_processed = report.agents_processed.saturating_add(1),
                Ok(false) => report.agents_skipped = report.agents_skipped.saturating_add(1),
                Err(err) => {
                    warn!(%agent_id, error = %err, "agent processing failed");
                    report.failures = report.failures.saturating_add(1);
                }
            }
        }

        let elapsed = self.world.clock.advance_global(now)?;
        report.elapsed = elapsed;
        report.tick = self.world.tick();
        if elapsed > 0 {
            let pass = Pass {
                tick: report.tick,
                now,
                elapsed,
            };
            initiatives::run_pass(&mut self.world, &mut self.rng, pass, &mut self.sink);
            debug!(
                tick = report.tick,
                elapsed,
                processed = report.agents_processed,
                skipped = report.agents_skipped,
                failures = report.failures,
                "pass complete"
            );
        }
        Ok(report)
    }

    /// Process one agent. Returns `false` when it had no elapsed ticks.
    ///
    /// The turn runs on a copy of the profile with its emissions held back.
    /// A failed turn is discarded along with them, but the agent's
    /// processed instant still moves forward so the same span is not
    /// replayed.
    fn process_agent(&mut self, agent_id: AgentId, now: DateTime<Utc>) -> Result<bool, TickError> {
        let mut agent = self
            .world
            .agent(agent_id)
            .cloned()
            .ok_or(AgentError::AgentNotFound(agent_id))?;
        let elapsed = self.world.clock.elapsed_since(agent.last_processed_at, now);
        if elapsed == 0 {
            return Ok(false);
        }
        let tick = self.world.tick();
        let config = &self.world.config;
        let mut pending = RecordingSink::default();

        let shift = needs::decay_agent(&mut agent, &config.agents.needs, elapsed);
        effects::report_mood(&agent, shift, &mut pending);

        for _ in 0..elapsed {
            if let Some(hit) = random_events::maybe_trigger(&mut agent, &mut self.rng, tick, &config.agents) {
                pending.emit_event(SimEvent::RandomEvent {
                    agent_id,
                    kind: hit.kind,
                });
                pending.emit_chat(agent_id, &agent.name, random_events::lookup(hit.kind).line);
                effects::report_mood(&agent, hit.mood, &mut pending);
            }
        }

        let turn = decision::run_agent_turn(
            &mut agent,
            &self.world,
            &mut self.rng,
            config,
            tick,
            elapsed,
            &mut pending,
        );
        let processed_until = clock::advance(agent.last_processed_at, elapsed, self.world.clock.interval());

        match turn {
            Ok(outcome) => {
                agent.last_processed_at = processed_until;
                log_turn(agent_id, outcome);
                self.world.agents.insert(agent_id, agent);
                pending.forward_to(&mut self.sink);
            }
            Err(source) => {
                if let Some(stored) = self.world.agents.get_mut(&agent_id) {
                    stored.last_processed_at = processed_until;
                }
                return Err(TickError::Decision { agent_id, source });
            }
        }

        conversation::maybe_converse(&mut self.world, agent_id, &mut self.rng, now, &mut self.sink);
        Ok(true)
    }
}

impl Scheduler<Broadcaster> {
    /// Close the outbound channel. Later emissions are dropped.
    pub fn shutdown(&mut self) {
        self.sink.close();
        info!(tick = self.world.tick(), "scheduler shut down");
    }
}

fn log_turn(agent_id: AgentId, outcome: TurnOutcome) {
    match outcome {
        TurnOutcome::Busy { remaining } => debug!(%agent_id, remaining, "busy"),
        TurnOutcome::Arrived(place) => debug!(%agent_id, place = place.as_str(), "arrived"),
        TurnOutcome::Departed { action, to } => {
            debug!(%agent_id, action = action.verb(), to = to.as_str(), "departed");
        }
        TurnOutcome::Started { action, critical } => {
            debug!(%agent_id, action = action.verb(), critical, "started action");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;
    use townsfolk_types::Activity;

    use super::*;
    use crate::broadcast::RecordingSink;

    fn scheduler(now: DateTime<Utc>) -> Scheduler<RecordingSink> {
        let mut config = SimulationConfig::default();
        config.world.seed = Some(7);
        config.world.tick_interval_ms = 1_000;
        Scheduler::new(config, RecordingSink::default(), now).unwrap()
    }

    #[test]
    fn register_announces_new_agents_once() {
        let now = Utc::now();
        let mut s = scheduler(now);
        let id = AgentId::new();
        assert!(s.register_agent(id, "Ada".into(), Personality::balanced(), now));
        assert!(!s.register_agent(id, "Ada".into(), Personality::balanced(), now));
        assert_eq!(s.sink().events.len(), 1);
    }

    #[test]
    fn ticking_inside_one_interval_changes_nothing() {
        let start = Utc::now();
        let mut s = scheduler(start);
        s.register_agent(AgentId::new(), "Ada".into(), Personality::balanced(), start);
        s.register_agent(AgentId::new(), "Ben".into(), Personality::balanced(), start);
        let agents_before = s.world().agents.clone();
        let events_before = s.sink().events.len();

        for offset in [200, 999] {
            let report = s.tick(start + Duration::milliseconds(offset)).unwrap();
            assert_eq!(report.agents_processed, 0);
            assert_eq!(report.agents_skipped, 2);
            assert_eq!(report.elapsed, 0);
        }
        assert_eq!(s.world().agents, agents_before);
        assert_eq!(s.world().tick(), 0);
        assert_eq!(s.sink().events.len(), events_before);
    }

    #[test]
    fn a_full_interval_processes_everyone() {
        let start = Utc::now();
        let mut s = scheduler(start);
        let id = AgentId::new();
        s.register_agent(id, "Ada".into(), Personality::balanced(), start);

        let later = start + Duration::milliseconds(1_500);
        let report = s.tick(later).unwrap();
        assert_eq!(report.agents_processed, 1);
        assert_eq!(report.elapsed, 1);
        assert_eq!(report.tick, 1);

        let agent = s.world().agent(id).unwrap();
        assert_eq!(agent.last_processed_at, start + Duration::milliseconds(1_000));
        assert_ne!(agent.activity, Activity::Idle);
    }

    #[test]
    fn failed_turn_publishes_nothing() {
        let start = Utc::now();
        let mut s = scheduler(start);
        {
            let initiatives = &mut s.world_mut().config.initiatives;
            initiatives.challenge.chance = 0.0;
            initiatives.crew.chance = 0.0;
            initiatives.gathering.chance = 0.0;
            initiatives.goal.chance = 0.0;
            initiatives.structure.chance = 0.0;
            initiatives.territory.chance = 0.0;
        }
        let id = AgentId::new();
        s.register_agent(id, "Ada".into(), Personality::balanced(), start);
        {
            let agent = s.world_mut().agents.get_mut(&id).unwrap();
            agent.location = townsfolk_types::Location::At {
                place: townsfolk_types::Place::Cafe,
            };
            agent.needs.hunger = 5.0;
            agent.skills.insert(
                townsfolk_types::SkillName::Cooking,
                townsfolk_types::SkillProgress {
                    level: 1,
                    xp: u32::MAX,
                    total_xp: 0,
                },
            );
        }
        let before = s.world().agent(id).cloned().unwrap();
        let events_before = s.sink().events.len();
        let chats_before = s.sink().chats.len();

        let report = s.tick(start + Duration::seconds(1)).unwrap();
        assert_eq!(report.failures, 1);
        assert_eq!(s.sink().events.len(), events_before);
        assert_eq!(s.sink().chats.len(), chats_before);

        let after = s.world().agent(id).unwrap();
        assert_eq!(after.needs, before.needs);
        assert_eq!(after.last_processed_at, start + Duration::seconds(1));
    }

    #[test]
    fn catch_up_covers_every_missed_tick() {
        let start = Utc::now();
        let mut s = scheduler(start);
        s.register_agent(AgentId::new(), "Ada".into(), Personality::balanced(), start);
        let report = s.tick(start + Duration::seconds(5)).unwrap();
        assert_eq!(report.elapsed, 5);
        assert_eq!(s.world().tick(), 5);
    }

    #[test]
    fn rejected_json_trigger_leaves_the_world_alone() {
        let now = Utc::now();
        let mut s = scheduler(now);
        let id = AgentId::new();
        s.register_agent(id, "Ada".into(), Personality::balanced(), now);
        let before = s.world().agents.clone();

        let bad = format!(r#"{{"agentId":"{id}","needDeltas":{{"fun":1000.0}}}}"#);
        assert!(matches!(s.apply_trigger_json(&bad), Err(TriggerError::Invalid(_))));
        assert_eq!(s.world().agents, before);

        let good = format!(r#"{{"agentId":"{id}","currencyDelta":25}}"#);
        let outcome = s.apply_trigger_json(&good).unwrap();
        assert_eq!(outcome.currency_delta, 25);
        assert_eq!(s.world().agent(id).unwrap().balance, 125);
    }

    #[test]
    fn snapshot_carries_headlines() {
        let now = Utc::now();
        let mut s = scheduler(now);
        s.sink_mut().headline("Big news".into());
        let snapshot = s.snapshot(now);
        assert_eq!(snapshot.headlines, vec!["Big news".to_owned()]);
    }
}

//! In-memory world state and the read-only query capability.
//!
//! [`World`] owns every agent profile, the relationship graph, the plot
//! registry, all initiative records, and the simulation clock. The decision
//! engine never sees the whole world: it receives a [`WorldQuery`], a narrow
//! read-only view covering goal and crew lookups.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use townsfolk_agents::{AgentError, PropertyRegistry, RelationshipGraph, economy, memory, new_profile};
use townsfolk_types::{
    AgentId, AgentProfile, Crew, GoalCategory, GoalStatus, ItemKind, MemoryKind, Personality,
    Place, SimEvent, WorldSnapshot,
};

use crate::broadcast::EventSink;
use crate::clock::{ClockError, WorldClock};
use crate::config::SimulationConfig;
use crate::initiatives::InitiativeState;

/// Read-only lookups the decision engine is allowed to make.
pub trait WorldQuery {
    /// Category of the agent's active goal, if any.
    fn active_goal(&self, agent_id: AgentId) -> Option<GoalCategory>;

    /// Name of the active crew the agent belongs to, if any.
    fn crew_name(&self, agent_id: AgentId) -> Option<&str>;

    /// Places where the agent's crewmates are currently standing.
    fn crewmate_places(&self, agent_id: AgentId) -> Vec<Place>;
}

/// Everything the simulation knows, in memory.
#[derive(Debug, Clone)]
pub struct World {
    /// Loaded configuration.
    pub config: SimulationConfig,
    /// Simulation clock and tick counter.
    pub clock: WorldClock,
    /// Agent profiles keyed by id.
    pub agents: BTreeMap<AgentId, AgentProfile>,
    /// Pairwise relationships.
    pub relationships: RelationshipGraph,
    /// Plot ownership.
    pub properties: PropertyRegistry,
    /// Challenges, crews, gatherings, goals, structures, territories.
    pub initiatives: InitiativeState,
}

impl World {
    /// Create an empty town anchored at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidInterval`] for a zero tick interval.
    pub fn new(config: SimulationConfig, now: DateTime<Utc>) -> Result<Self, ClockError> {
        let clock = WorldClock::new(config.world.tick_interval_ms, now)?;
        let properties = PropertyRegistry::new(&config.agents.economy);
        Ok(Self {
            config,
            clock,
            agents: BTreeMap::new(),
            relationships: RelationshipGraph::new(),
            properties,
            initiatives: InitiativeState::default(),
        })
    }

    /// Current simulation tick.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Create the agent on first reference; later calls are no-ops.
    ///
    /// Returns `true` if a new profile was created.
    pub fn register_agent(
        &mut self,
        id: AgentId,
        name: String,
        personality: Personality,
        now: DateTime<Utc>,
    ) -> bool {
        if self.agents.contains_key(&id) {
            return false;
        }
        let profile = new_profile(id, name, personality, now, &self.config.agents);
        tracing::info!(agent_id = %id, name = %profile.name, "agent registered");
        self.agents.insert(id, profile);
        true
    }

    /// Look up an agent.
    pub fn agent(&self, id: AgentId) -> Option<&AgentProfile> {
        self.agents.get(&id)
    }

    /// Mutable access to two distinct agents at once.
    pub fn pair_mut(
        &mut self,
        a: AgentId,
        b: AgentId,
    ) -> Option<(&mut AgentProfile, &mut AgentProfile)> {
        if a == b {
            return None;
        }
        let mut first = None;
        let mut second = None;
        for (id, profile) in &mut self.agents {
            if *id == a {
                first = Some(profile);
            } else if *id == b {
                second = Some(profile);
            }
        }
        first.zip(second)
    }

    /// Agents standing at `place`, in id order.
    pub fn agents_at(&self, place: Place) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|a| a.location.place() == Some(place))
            .map(|a| a.id)
            .collect()
    }

    /// The active crew an agent belongs to.
    pub fn crew_of(&self, agent_id: AgentId) -> Option<&Crew> {
        self.initiatives
            .crews
            .iter()
            .find(|c| !c.dissolved && c.has_member(agent_id))
    }

    /// Buy `plot` for the agent at its listed price.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown agent, or the
    /// registry's error when the agent already owns a plot, the plot is
    /// taken or missing, or the agent cannot afford it. Nothing changes on
    /// error.
    pub fn buy_property(
        &mut self,
        agent_id: AgentId,
        plot: u32,
        sink: &mut dyn EventSink,
    ) -> Result<u64, AgentError> {
        let tick = self.tick();
        let agent = self
            .agents
            .get_mut(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))?;
        let price = self.properties.buy(agent, plot)?;
        memory::remember(
            agent,
            memory::entry(MemoryKind::Property, None, format!("Bought plot {plot}"), 0.8, tick),
            &self.config.agents.memory,
        );
        let name = agent.name.clone();
        sink.emit_event(SimEvent::PropertyBought {
            agent_id,
            plot,
            price,
        });
        sink.headline(format!("{name} bought plot {plot} for {price} simcoins."));
        Ok(price)
    }

    /// Sell the agent's plot back to town. Returns the plot and the refund.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown agent or
    /// [`AgentError::NoPropertyOwned`] when there is nothing to sell.
    pub fn sell_property(
        &mut self,
        agent_id: AgentId,
        sink: &mut dyn EventSink,
    ) -> Result<(u32, u64), AgentError> {
        let tick = self.tick();
        let agent = self
            .agents
            .get_mut(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))?;
        let plot = self
            .properties
            .owned_by(agent_id)
            .map(|p| p.plot)
            .ok_or(AgentError::NoPropertyOwned(agent_id))?;
        let refund = self.properties.sell(agent, &self.config.agents.economy)?;
        memory::remember(
            agent,
            memory::entry(MemoryKind::Property, None, format!("Sold plot {plot}"), -0.4, tick),
            &self.config.agents.memory,
        );
        sink.emit_event(SimEvent::PropertySold {
            agent_id,
            plot,
            refund,
        });
        Ok((plot, refund))
    }

    /// Sell `quantity` of `item` from the agent's inventory at the resale
    /// price.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown agent or
    /// [`AgentError::InsufficientItems`] when the agent holds too few.
    pub fn sell_item(
        &mut self,
        agent_id: AgentId,
        item: ItemKind,
        quantity: u32,
        sink: &mut dyn EventSink,
    ) -> Result<u64, AgentError> {
        let agent = self
            .agents
            .get_mut(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))?;
        let refund = economy::sell_item(agent, item, quantity, &self.config.agents.economy)?;
        sink.emit_event(SimEvent::ItemSold {
            agent_id,
            item,
            quantity,
            refund,
        });
        tracing::debug!(%agent_id, item = item.as_str(), quantity, refund, "item sold");
        Ok(refund)
    }

    /// Full read of the current state.
    pub fn snapshot(&self, headlines: Vec<String>, taken_at: DateTime<Utc>) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick(),
            taken_at,
            agents: self.agents.values().cloned().collect(),
            relationships: self.relationships.rows().cloned().collect(),
            properties: self.properties.all().cloned().collect(),
            crews: self.initiatives.crews.clone(),
            challenges: self.initiatives.challenges.clone(),
            gatherings: self.initiatives.gatherings.clone(),
            goals: self.initiatives.goals.clone(),
            structures: self.initiatives.structures.clone(),
            territories: self.initiatives.territories.clone(),
            headlines,
        }
    }
}

impl WorldQuery for World {
    fn active_goal(&self, agent_id: AgentId) -> Option<GoalCategory> {
        self.initiatives
            .goals
            .iter()
            .find(|g| g.agent_id == agent_id && g.status == GoalStatus::Active)
            .map(|g| g.category)
    }

    fn crew_name(&self, agent_id: AgentId) -> Option<&str> {
        self.crew_of(agent_id).map(|c| c.name.as_str())
    }

    fn crewmate_places(&self, agent_id: AgentId) -> Vec<Place> {
        let Some(crew) = self.crew_of(agent_id) else {
            return Vec::new();
        };
        crew.members
            .iter()
            .filter(|m| m.agent_id != agent_id)
            .filter_map(|m| self.agents.get(&m.agent_id))
            .filter_map(|a| a.location.place())
            .collect()
    }
}

//! Per-agent decision engine.
//!
//! Each processed pass an agent either keeps doing what it is doing, arrives
//! somewhere, or picks a new action. Picking is a critical-need override
//! followed, when nothing is critical, by a weighted roulette over the
//! action catalog. The engine sees the rest of the world only through a
//! [`WorldQuery`].
//!
//! Conversations between co-located agents need two mutable profiles at
//! once, so they live in [`conversation`] and run against the whole world
//! after the agent's turn has been written back.

pub mod catalog;
pub mod conversation;
pub mod thoughts;

use rand::Rng;
use townsfolk_agents::{AgentError, critical_need, economy};
use townsfolk_types::{
    ActionKind, Activity, AgentProfile, Location, Need, PersonalityTrait, Place, SimEvent,
};

use crate::broadcast::EventSink;
use crate::config::SimulationConfig;
use crate::effects;
use crate::world::WorldQuery;

use self::catalog::CoinEffect;

/// Errors that can occur while running an agent's turn.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecisionError {
    /// A ledger or skill operation failed.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// What happened on one agent's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Still busy with an action.
    Busy {
        /// Ticks left after this pass.
        remaining: u32,
    },
    /// Reached the travel destination.
    Arrived(Place),
    /// Set off toward the place of the chosen action.
    Departed {
        /// The action waiting at the destination.
        action: ActionKind,
        /// Destination.
        to: Place,
    },
    /// Started an action in place.
    Started {
        /// The action.
        action: ActionKind,
        /// Whether a critical need forced it.
        critical: bool,
    },
}

/// Run one agent's decision step.
///
/// `elapsed` is the number of virtual ticks this pass covers; a busy agent
/// burns down that many ticks of its current action. Whatever the turn
/// did, an agent that is awake and not on the road may also make a plan.
///
/// # Errors
///
/// Returns [`DecisionError::Agent`] if a ledger or XP update fails. The
/// agent may be partially updated; the scheduler logs and moves on.
pub fn run_agent_turn<R: Rng + ?Sized>(
    agent: &mut AgentProfile,
    query: &dyn WorldQuery,
    rng: &mut R,
    config: &SimulationConfig,
    tick: u64,
    elapsed: u64,
    sink: &mut dyn EventSink,
) -> Result<TurnOutcome, DecisionError> {
    let outcome = take_turn(agent, query, rng, config, tick, elapsed, sink)?;
    maybe_plan(agent, rng, config, sink);
    Ok(outcome)
}

fn take_turn<R: Rng + ?Sized>(
    agent: &mut AgentProfile,
    query: &dyn WorldQuery,
    rng: &mut R,
    config: &SimulationConfig,
    tick: u64,
    elapsed: u64,
    sink: &mut dyn EventSink,
) -> Result<TurnOutcome, DecisionError> {
    if agent.remaining_ticks > 0 {
        let burn = u32::try_from(elapsed).unwrap_or(u32::MAX).max(1);
        agent.remaining_ticks = agent.remaining_ticks.saturating_sub(burn);
        let current = match agent.activity {
            Activity::Performing(action) => Some(action),
            Activity::Idle | Activity::Traveling => None,
        };
        if let Some(text) = thoughts::idle_thought(agent, current, rng, &config.decision) {
            set_thought(agent, text, sink);
        }
        return Ok(TurnOutcome::Busy {
            remaining: agent.remaining_ticks,
        });
    }

    if let Location::Traveling { to } = agent.location {
        agent.location = Location::At { place: to };
        agent.activity = Activity::Idle;
        sink.emit_event(SimEvent::Arrived {
            agent_id: agent.id,
            place: to,
        });
        set_thought(agent, thoughts::arrival_thought(to), sink);
        tracing::debug!(agent_id = %agent.id, place = to.as_str(), "arrived");
        return Ok(TurnOutcome::Arrived(to));
    }

    let critical = critical_need(&agent.needs, config.agents.needs.critical_threshold);
    let action = choose_action(agent, critical, query, rng, config);
    let entry = catalog::lookup(action);

    let outcome = match agent.location.place() {
        Some(here) if here != entry.place => {
            agent.location = Location::Traveling { to: entry.place };
            agent.activity = Activity::Traveling;
            sink.emit_event(SimEvent::Departed {
                agent_id: agent.id,
                from: here,
                to: entry.place,
            });
            TurnOutcome::Departed {
                action,
                to: entry.place,
            }
        }
        _ => {
            start_action(agent, action, critical.is_some(), tick, config, sink)?;
            TurnOutcome::Started {
                action,
                critical: critical.is_some(),
            }
        }
    };

    if let Some(text) =
        thoughts::decision_thought(agent, action, critical, query, rng, &config.decision)
    {
        set_thought(agent, text, sink);
    }
    Ok(outcome)
}

/// Sleepers and travelers never plan.
fn maybe_plan<R: Rng + ?Sized>(
    agent: &mut AgentProfile,
    rng: &mut R,
    config: &SimulationConfig,
    sink: &mut dyn EventSink,
) {
    let resting = agent.activity.is_sleeping() || agent.location.is_traveling();
    if resting || !rng.random_bool(config.decision.plan_chance) {
        return;
    }
    let plan = thoughts::plan(agent, rng);
    sink.emit_event(SimEvent::PlanMade {
        agent_id: agent.id,
        plan: plan.clone(),
    });
    agent.plan = Some(plan);
}

fn set_thought(agent: &mut AgentProfile, text: String, sink: &mut dyn EventSink) {
    sink.emit_chat(agent.id, &agent.name, &text);
    agent.thought = Some(text);
}

/// Pick the next action, honoring a critical need first.
pub fn choose_action<R: Rng + ?Sized>(
    agent: &AgentProfile,
    critical: Option<Need>,
    query: &dyn WorldQuery,
    rng: &mut R,
    config: &SimulationConfig,
) -> ActionKind {
    if let Some(need) = critical {
        return catalog::corrective(need);
    }
    let weights = action_weights(agent, query, config);
    roulette(&weights, rng).unwrap_or(ActionKind::Lounge)
}

/// Weight of every catalog action for this agent, in catalog order.
pub fn action_weights(
    agent: &AgentProfile,
    query: &dyn WorldQuery,
    config: &SimulationConfig,
) -> Vec<(ActionKind, f64)> {
    let decision = &config.decision;
    let low = config.agents.needs.low_threshold;
    let goal_action = query.active_goal(agent.id).map(catalog::goal_action);
    let crew_places = query.crewmate_places(agent.id);

    ActionKind::ALL
        .iter()
        .map(|&action| {
            let mut weight = 1.0;
            for personality_trait in PersonalityTrait::ALL {
                let value = agent.personality.get(personality_trait);
                weight += catalog::trait_boosts(personality_trait)
                    .iter()
                    .filter(|(boosted, _)| *boosted == action)
                    .map(|(_, boost)| boost * value)
                    .sum::<f64>();
            }
            if agent.activity == Activity::Performing(action) {
                weight *= decision.anti_repeat_factor;
            }
            for need in Need::ALL {
                let value = agent.needs.get(need);
                if value < low && catalog::corrective(need) == action {
                    weight += (low - value) / 10.0;
                }
            }
            if goal_action == Some(action) {
                weight += decision.goal_bonus;
            }
            if crew_places.contains(&catalog::lookup(action).place) {
                weight += decision.crewmate_bonus;
            }
            (action, weight)
        })
        .collect()
}

/// Cumulative-weight roulette. `None` when every weight is zero.
pub fn roulette<R: Rng + ?Sized>(weights: &[(ActionKind, f64)], rng: &mut R) -> Option<ActionKind> {
    let total: f64 = weights.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let mut roll = rng.random_range(0.0..total);
    for &(action, weight) in weights {
        let weight = weight.max(0.0);
        if roll < weight {
            return Some(action);
        }
        roll -= weight;
    }
    weights.last().map(|(action, _)| *action)
}

/// Begin an action at the agent's current place.
///
/// Applies the need bundle, trains the linked skill and settles coins.
/// A fee the agent cannot afford is waived.
///
/// # Errors
///
/// Returns [`DecisionError::Agent`] if a ledger or XP update fails.
pub fn start_action(
    agent: &mut AgentProfile,
    action: ActionKind,
    critical: bool,
    tick: u64,
    config: &SimulationConfig,
    sink: &mut dyn EventSink,
) -> Result<(), DecisionError> {
    let entry = catalog::lookup(action);
    agent.activity = Activity::Performing(action);
    agent.remaining_ticks = entry.ticks;
    effects::nudge_needs(agent, entry.effects, &config.agents, sink);

    if let Some((skill, xp)) = entry.xp {
        effects::grant_xp(agent, skill, xp, &config.agents, sink)?;
    }

    match entry.coins {
        CoinEffect::None => {}
        CoinEffect::Fee(fee) => {
            if agent.balance >= fee {
                economy::debit(agent, fee)?;
            }
        }
        CoinEffect::Wage(wage) => {
            economy::credit(agent, wage)?;
        }
        CoinEffect::BuyItem => {
            if let Some(item) = economy::best_affordable_item(agent.balance) {
                economy::buy_item(agent, item, 1)?;
                tracing::debug!(agent_id = %agent.id, item = item.as_str(), "bought item");
            }
        }
    }

    sink.emit_event(SimEvent::ActionStarted {
        agent_id: agent.id,
        action,
        place: entry.place,
        critical,
    });
    tracing::debug!(agent_id = %agent.id, action = action.verb(), tick, critical, "action started");
    Ok(())
}

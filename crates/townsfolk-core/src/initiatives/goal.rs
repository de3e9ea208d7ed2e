//! Personal goals.
//!
//! An agent with no active goal occasionally picks one, weighted by
//! personality and tilted by what it remembers: a lost duel points at
//! getting fit, soured company at making friends, money coming or going at
//! saving up, and a gloomy memory buffer at finding calm. Every pass, each active goal's progress is re-measured
//! against the world; reaching the target pays a flat reward, and goals
//! left unfinished for too long are abandoned.

use rand::Rng;
use townsfolk_agents::{AgentError, economy, memory};
use townsfolk_types::{
    AgentId, AgentProfile, Goal, GoalCategory, GoalId, GoalStatus, MemoryKind, PersonalityTrait,
    SimEvent, SkillName,
};

use super::{Pass, weighted_index};
use crate::broadcast::EventSink;
use crate::effects;
use crate::world::World;

/// Display label for a goal category.
pub const fn label(category: GoalCategory) -> &'static str {
    match category {
        GoalCategory::GetFit => "get fit",
        GoalCategory::SaveUp => "save up",
        GoalCategory::MakeFriends => "make friends",
        GoalCategory::LearnSomething => "learn something",
        GoalCategory::MakeArt => "make art",
        GoalCategory::FindCalm => "find calm",
    }
}

/// Trait that draws an agent toward a category.
pub const fn bound_trait(category: GoalCategory) -> PersonalityTrait {
    match category {
        GoalCategory::GetFit | GoalCategory::SaveUp => PersonalityTrait::Conscientiousness,
        GoalCategory::MakeFriends => PersonalityTrait::Extraversion,
        GoalCategory::LearnSomething | GoalCategory::MakeArt => PersonalityTrait::Openness,
        GoalCategory::FindCalm => PersonalityTrait::Neuroticism,
    }
}

/// Selection weight of every category for this agent: `0.5 + trait`, plus
/// `memory_bias` for each category a recent memory points at.
pub fn category_weights(agent: &AgentProfile, memory_bias: f64) -> [(GoalCategory, f64); 6] {
    let soured = |kind| memory::latest_of(agent, kind).is_some_and(|m| m.sentiment < 0.0);
    let lost_duel = soured(MemoryKind::Challenge);
    let lonely = soured(MemoryKind::Conversation) || soured(MemoryKind::Crew);
    let money_on_mind = [MemoryKind::Reward, MemoryKind::Incident]
        .into_iter()
        .any(|kind| memory::latest_of(agent, kind).is_some());
    let gloom = (-memory::mean_sentiment(agent)).max(0.0);

    GoalCategory::ALL.map(|category| {
        let nudge = match category {
            GoalCategory::GetFit if lost_duel => memory_bias,
            GoalCategory::MakeFriends if lonely => memory_bias,
            GoalCategory::SaveUp if money_on_mind => memory_bias,
            GoalCategory::FindCalm => memory_bias * gloom,
            _ => 0.0,
        };
        (category, 0.5 + agent.personality.get(bound_trait(category)) + nudge)
    })
}

/// Current value of whatever a category tracks, or `None` for an unknown
/// agent.
#[allow(clippy::cast_precision_loss)]
pub fn measure(world: &World, agent_id: AgentId, category: GoalCategory) -> Option<f64> {
    let agent = world.agent(agent_id)?;
    let value = match category {
        GoalCategory::GetFit => f64::from(agent.skill(SkillName::Fitness).level),
        GoalCategory::SaveUp => agent.balance as f64,
        GoalCategory::MakeFriends => world
            .relationships
            .friends_of(agent_id, &world.config.agents.social)
            .len() as f64,
        GoalCategory::LearnSomething => f64::from(agent.skill(SkillName::Logic).level),
        GoalCategory::MakeArt => f64::from(agent.skill(SkillName::Creativity).level),
        GoalCategory::FindCalm => agent.needs.mean(),
    };
    Some(value)
}

fn target_for(world: &World, category: GoalCategory, current: f64) -> f64 {
    let config = &world.config.initiatives.goal;
    match category {
        GoalCategory::GetFit
        | GoalCategory::MakeFriends
        | GoalCategory::LearnSomething
        | GoalCategory::MakeArt => current + 1.0,
        GoalCategory::SaveUp => current + config.save_up_amount,
        GoalCategory::FindCalm => config.calm_mean,
    }
}

/// The agent's active goal, if any.
pub fn active_goal(world: &World, agent_id: AgentId) -> Option<&Goal> {
    world
        .initiatives
        .goals
        .iter()
        .find(|g| g.agent_id == agent_id && g.status == GoalStatus::Active)
}

/// Maybe give `agent_id` a new goal.
pub fn originate<R: Rng + ?Sized>(
    world: &mut World,
    agent_id: AgentId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.goal;
    if !rng.random_bool(config.chance) {
        return Ok(());
    }
    let agent = world.agent(agent_id).ok_or(AgentError::AgentNotFound(agent_id))?;
    if agent.activity.is_sleeping()
        || agent.location.is_traveling()
        || active_goal(world, agent_id).is_some()
    {
        return Ok(());
    }
    let choices = category_weights(agent, config.memory_bias);
    let weights = choices.map(|(_, weight)| weight);
    let Some(category) = weighted_index(&weights, rng)
        .and_then(|i| choices.get(i))
        .map(|(category, _)| *category)
    else {
        return Ok(());
    };
    let name = agent.name.clone();
    let current = measure(world, agent_id, category).unwrap_or_default();
    let target = target_for(world, category, current);

    let goal = Goal {
        id: GoalId::new(),
        agent_id,
        category,
        target,
        progress: current,
        status: GoalStatus::Active,
        created_tick: pass.tick,
    };
    sink.emit_event(SimEvent::GoalSet {
        goal_id: goal.id,
        agent_id,
        category,
        target,
    });
    sink.headline(format!("{name} has decided to {}.", label(category)));
    tracing::debug!(goal_id = %goal.id, %agent_id, category = label(category), target, "goal set");
    world.initiatives.goals.push(goal);
    Ok(())
}

/// Re-measure every active goal, completing or abandoning as due.
pub fn evaluate(world: &mut World, pass: Pass, sink: &mut dyn EventSink) -> Result<(), AgentError> {
    let config = world.config.initiatives.goal;
    let active: Vec<(GoalId, AgentId, GoalCategory, f64, u64)> = world
        .initiatives
        .goals
        .iter()
        .filter(|g| g.status == GoalStatus::Active)
        .map(|g| (g.id, g.agent_id, g.category, g.target, g.created_tick))
        .collect();

    let mut first_error = None;
    for (goal_id, agent_id, category, target, created_tick) in active {
        let progress = measure(world, agent_id, category);
        let status = match progress {
            Some(value) if value >= target => GoalStatus::Completed,
            Some(_) if pass.tick.saturating_sub(created_tick) < config.abandon_after_ticks => {
                GoalStatus::Active
            }
            _ => GoalStatus::Abandoned,
        };
        if let Some(goal) = world.initiatives.goals.iter_mut().find(|g| g.id == goal_id) {
            goal.progress = progress.unwrap_or(goal.progress);
            goal.status = status;
        }
        let finished = match status {
            GoalStatus::Active => Ok(()),
            GoalStatus::Completed => complete(world, goal_id, agent_id, category, pass, sink),
            GoalStatus::Abandoned => {
                abandon(world, goal_id, agent_id, category, pass, sink);
                Ok(())
            }
        };
        if let Err(err) = finished {
            first_error.get_or_insert(err);
        }
    }
    prune(world);
    first_error.map_or(Ok(()), Err)
}

fn complete(
    world: &mut World,
    goal_id: GoalId,
    agent_id: AgentId,
    category: GoalCategory,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.goal;
    let agent = world
        .agents
        .get_mut(&agent_id)
        .ok_or(AgentError::AgentNotFound(agent_id))?;
    economy::credit(agent, config.reward_coins)?;
    effects::add_clout(agent, config.reward_clout);
    memory::remember(
        agent,
        memory::entry(
            MemoryKind::Goal,
            None,
            format!("Managed to {}", label(category)),
            0.9,
            pass.tick,
        ),
        &world.config.agents.memory,
    );
    let name = agent.name.clone();
    sink.emit_event(SimEvent::GoalCompleted {
        goal_id,
        agent_id,
        category,
    });
    sink.headline(format!("{name} achieved their goal to {}!", label(category)));
    tracing::info!(%goal_id, %agent_id, category = label(category), "goal completed");
    Ok(())
}

fn abandon(
    world: &mut World,
    goal_id: GoalId,
    agent_id: AgentId,
    category: GoalCategory,
    pass: Pass,
    sink: &mut dyn EventSink,
) {
    if let Some(agent) = world.agents.get_mut(&agent_id) {
        memory::remember(
            agent,
            memory::entry(
                MemoryKind::Goal,
                None,
                format!("Gave up trying to {}", label(category)),
                -0.3,
                pass.tick,
            ),
            &world.config.agents.memory,
        );
    }
    sink.emit_event(SimEvent::GoalAbandoned { goal_id, agent_id });
    tracing::debug!(%goal_id, %agent_id, "goal abandoned");
}

fn prune(world: &mut World) {
    let keep = world.config.initiatives.goal.history;
    let goals = &mut world.initiatives.goals;
    let finished = goals
        .iter()
        .filter(|g| g.status != GoalStatus::Active)
        .count();
    let mut to_drop = finished.saturating_sub(keep);
    goals.retain(|g| {
        if to_drop > 0 && g.status != GoalStatus::Active {
            to_drop = to_drop.saturating_sub(1);
            false
        } else {
            true
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use townsfolk_types::Place;

    use super::*;
    use crate::broadcast::RecordingSink;
    use crate::initiatives::test_support::{add_agent, pass, world};
    use crate::world::WorldQuery;

    fn with_goal(world: &mut World, agent_id: AgentId, category: GoalCategory, target: f64) -> GoalId {
        let id = GoalId::new();
        world.initiatives.goals.push(Goal {
            id,
            agent_id,
            category,
            target,
            progress: 0.0,
            status: GoalStatus::Active,
            created_tick: 1,
        });
        id
    }

    #[test]
    fn one_active_goal_per_agent() {
        let mut world = world();
        world.config.initiatives.goal.chance = 1.0;
        let a = add_agent(&mut world, "Gus", Place::Park);
        let mut rng = SmallRng::seed_from_u64(6);
        let mut sink = RecordingSink::default();
        for tick in 1..5 {
            originate(&mut world, a, &mut rng, pass(tick), &mut sink).unwrap();
        }
        assert_eq!(world.initiatives.goals.len(), 1);
        assert!(world.active_goal(a).is_some());
    }

    fn weight(weights: &[(GoalCategory, f64)], category: GoalCategory) -> f64 {
        weights.iter().find(|(c, _)| *c == category).map(|(_, w)| *w).unwrap()
    }

    #[test]
    fn memories_tilt_category_weights() {
        let mut world = world();
        let a = add_agent(&mut world, "Gus", Place::Park);
        let plain = category_weights(world.agent(a).unwrap(), 1.5);
        for (_, w) in plain {
            assert!((w - 1.0).abs() < 1e-9);
        }

        let memory_config = world.config.agents.memory;
        let agent = world.agents.get_mut(&a).unwrap();
        memory::remember(
            agent,
            memory::entry(MemoryKind::Challenge, None, "Lost a duel", -0.5, 1),
            &memory_config,
        );
        let tilted = category_weights(agent, 1.5);
        assert!((weight(&tilted, GoalCategory::GetFit) - 2.5).abs() < 1e-9);
        // the lost duel is the only memory, so the mean is -0.5
        assert!((weight(&tilted, GoalCategory::FindCalm) - 1.75).abs() < 1e-9);
        assert!((weight(&tilted, GoalCategory::SaveUp) - 1.0).abs() < 1e-9);
        assert!((weight(&tilted, GoalCategory::MakeFriends) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn a_lost_duel_sends_agents_to_the_gym() {
        let mut world = world();
        world.config.initiatives.goal.chance = 1.0;
        world.config.initiatives.goal.memory_bias = 1.0e6;
        let memory_config = world.config.agents.memory;
        let mut rng = SmallRng::seed_from_u64(8);
        let mut sink = RecordingSink::default();
        for n in 0..10 {
            let a = add_agent(&mut world, &format!("Loser {n}"), Place::Arena);
            let agent = world.agents.get_mut(&a).unwrap();
            memory::remember(
                agent,
                memory::entry(MemoryKind::Challenge, None, "Lost a duel", -0.5, 1),
                &memory_config,
            );
            memory::remember(
                agent,
                memory::entry(MemoryKind::Gathering, None, "Lovely party", 0.5, 2),
                &memory_config,
            );
            originate(&mut world, a, &mut rng, pass(3), &mut sink).unwrap();
            assert_eq!(active_goal(&world, a).map(|g| g.category), Some(GoalCategory::GetFit));
        }
    }

    #[test]
    fn reaching_the_target_pays_out() {
        let mut world = world();
        let a = add_agent(&mut world, "Gus", Place::Park);
        let id = with_goal(&mut world, a, GoalCategory::SaveUp, 150.0);
        let mut sink = RecordingSink::default();

        evaluate(&mut world, pass(2), &mut sink).unwrap();
        assert_eq!(active_goal(&world, a).map(|g| g.id), Some(id));

        world.agents.get_mut(&a).unwrap().balance = 160;
        evaluate(&mut world, pass(3), &mut sink).unwrap();
        let goal = world.initiatives.goals.iter().find(|g| g.id == id).unwrap();
        assert_eq!(goal.status, GoalStatus::Completed);
        let agent = world.agent(a).unwrap();
        assert_eq!(agent.balance, 210);
        assert_eq!(agent.clout, 3);
    }

    #[test]
    fn stale_goals_are_abandoned() {
        let mut world = world();
        let a = add_agent(&mut world, "Gus", Place::Park);
        let id = with_goal(&mut world, a, GoalCategory::GetFit, 5.0);
        let mut sink = RecordingSink::default();
        evaluate(&mut world, pass(301), &mut sink).unwrap();
        let goal = world.initiatives.goals.iter().find(|g| g.id == id).unwrap();
        assert_eq!(goal.status, GoalStatus::Abandoned);
        assert!(sink.events.contains(&SimEvent::GoalAbandoned { goal_id: id, agent_id: a }));
    }
}

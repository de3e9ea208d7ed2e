//! Crew territory claims.
//!
//! A crew leader may pay to claim the place they are standing in for their
//! crew. One claim per crew and one per place. While the claim lasts, crew
//! members at the place get a small bonus each tick.

use rand::Rng;
use townsfolk_agents::{AgentError, economy, memory};
use townsfolk_types::{AgentId, MemoryKind, Need, SimEvent, Territory, TerritoryId};

use super::{Pass, ticks_u32};
use crate::broadcast::EventSink;
use crate::effects;
use crate::world::World;

/// Maybe claim the leader's current place for their crew.
pub fn originate<R: Rng + ?Sized>(
    world: &mut World,
    leader: AgentId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.territory;
    if !rng.random_bool(config.chance) {
        return Ok(());
    }
    let agent = world.agent(leader).ok_or(AgentError::AgentNotFound(leader))?;
    let Some(place) = agent.location.place() else {
        return Ok(());
    };
    let Some(crew) = world.crew_of(leader).filter(|c| c.leader == leader) else {
        return Ok(());
    };
    let territories = &world.initiatives.territories;
    if agent.balance < config.cost
        || territories.iter().any(|t| t.crew_id == crew.id || t.place == place)
    {
        return Ok(());
    }
    let crew_id = crew.id;
    let crew_name = crew.name.clone();
    let members: Vec<AgentId> = crew.members.iter().map(|m| m.agent_id).collect();

    let agent = world
        .agents
        .get_mut(&leader)
        .ok_or(AgentError::AgentNotFound(leader))?;
    economy::debit(agent, config.cost)?;

    let memory_config = world.config.agents.memory;
    for member in &members {
        if let Some(agent) = world.agents.get_mut(member) {
            memory::remember(
                agent,
                memory::entry(
                    MemoryKind::Territory,
                    Some(leader),
                    format!("{crew_name} claimed the {}", place.as_str()),
                    0.6,
                    pass.tick,
                ),
                &memory_config,
            );
        }
    }

    let territory = Territory {
        id: TerritoryId::new(),
        crew_id,
        place,
        claimed_by: leader,
        claimed_tick: pass.tick,
        expires_tick: pass.tick.saturating_add(config.duration_ticks),
    };
    sink.emit_event(SimEvent::TerritoryClaimed {
        territory_id: territory.id,
        crew_id,
        place,
        expires_tick: territory.expires_tick,
    });
    sink.headline(format!("{crew_name} has claimed the {}!", place.as_str()));
    tracing::info!(territory_id = %territory.id, %crew_id, place = place.as_str(), "territory claimed");
    world.initiatives.territories.push(territory);
    Ok(())
}

/// Expire finished claims, then reward crew members standing on live ones.
pub fn upkeep(world: &mut World, pass: Pass, sink: &mut dyn EventSink) {
    let expired: Vec<Territory> = world
        .initiatives
        .territories
        .iter()
        .filter(|t| {
            t.expires_tick <= pass.tick
                || !world
                    .initiatives
                    .crews
                    .iter()
                    .any(|c| c.id == t.crew_id && !c.dissolved)
        })
        .cloned()
        .collect();
    world
        .initiatives
        .territories
        .retain(|t| !expired.iter().any(|e| e.id == t.id));
    for t in expired {
        sink.emit_event(SimEvent::TerritoryExpired {
            territory_id: t.id,
            crew_id: t.crew_id,
            place: t.place,
        });
        sink.headline(format!("The claim on the {} has lapsed.", t.place.as_str()));
        tracing::debug!(territory_id = %t.id, "territory expired");
    }

    let config = world.config.initiatives.territory;
    let ticks = f64::from(ticks_u32(pass.elapsed));
    let bonus = [
        (Need::Fun, config.fun_bonus * ticks),
        (Need::Social, config.social_bonus * ticks),
    ];
    let view: &World = world;
    let beneficiaries: Vec<AgentId> = view
        .initiatives
        .territories
        .iter()
        .flat_map(|t| {
            view.initiatives
                .crews
                .iter()
                .filter(move |c| c.id == t.crew_id)
                .flat_map(|c| c.members.iter().map(|m| m.agent_id))
                .filter(move |id| {
                    view.agent(*id)
                        .is_some_and(|a| a.location.place() == Some(t.place))
                })
        })
        .collect();
    let agents_config = world.config.agents.clone();
    for agent_id in beneficiaries {
        if let Some(agent) = world.agents.get_mut(&agent_id) {
            effects::nudge_needs(agent, &bonus, &agents_config, sink);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use townsfolk_types::{Crew, CrewId, CrewMember, CrewRole, Place};

    use super::*;
    use crate::broadcast::RecordingSink;
    use crate::initiatives::test_support::{add_agent, pass, world};

    fn crew_of_two(world: &mut World, place: Place) -> (CrewId, AgentId, AgentId) {
        let leader = add_agent(world, "Lea", place);
        let member = add_agent(world, "Max", place);
        let id = CrewId::new();
        world.initiatives.crews.push(Crew {
            id,
            name: "The Lucky Owls".into(),
            motto: "Hoot.".into(),
            color: "#abcdef".into(),
            leader,
            members: vec![
                CrewMember {
                    agent_id: leader,
                    role: CrewRole::Leader,
                    joined_tick: 0,
                },
                CrewMember {
                    agent_id: member,
                    role: CrewRole::Member,
                    joined_tick: 0,
                },
            ],
            reputation: 0,
            founded_tick: 0,
            dissolved: false,
        });
        (id, leader, member)
    }

    #[test]
    fn only_leaders_claim_once() {
        let mut world = world();
        world.config.initiatives.territory.chance = 1.0;
        let (crew_id, leader, member) = crew_of_two(&mut world, Place::Park);
        world.agents.get_mut(&leader).unwrap().balance = 400;
        world.agents.get_mut(&member).unwrap().balance = 400;
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();

        originate(&mut world, member, &mut rng, pass(1), &mut sink).unwrap();
        assert!(world.initiatives.territories.is_empty());

        originate(&mut world, leader, &mut rng, pass(1), &mut sink).unwrap();
        originate(&mut world, leader, &mut rng, pass(2), &mut sink).unwrap();
        assert_eq!(world.initiatives.territories.len(), 1);
        let claim = world.initiatives.territories.first().unwrap();
        assert_eq!(claim.crew_id, crew_id);
        assert_eq!(claim.expires_tick, 51);
        assert_eq!(world.agent(leader).unwrap().balance, 250);
    }

    #[test]
    fn claims_reward_members_then_lapse() {
        let mut world = world();
        world.config.initiatives.territory.chance = 1.0;
        let (_, leader, member) = crew_of_two(&mut world, Place::Plaza);
        world.agents.get_mut(&leader).unwrap().balance = 400;
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();
        originate(&mut world, leader, &mut rng, pass(1), &mut sink).unwrap();

        world.agents.get_mut(&member).unwrap().needs.fun = 50.0;
        upkeep(&mut world, pass(2), &mut sink);
        assert!((world.agent(member).unwrap().needs.fun - 52.0).abs() < 1e-9);

        upkeep(&mut world, pass(51), &mut sink);
        assert!(world.initiatives.territories.is_empty());
        assert!(
            sink.events
                .iter()
                .any(|e| matches!(e, SimEvent::TerritoryExpired { .. }))
        );
    }
}

//! Crews: named friend groups with a leader and a reputation score.
//!
//! An agent with enough crew-less friends and the founding fee can start a
//! crew with one to three of them. Each pass, members who fell out with the
//! leader walk away, reputation grows with the number of high-clout members,
//! a miserable leader may be replaced, and members who share a place get a
//! small bonus. A crew left with zero members is dissolved.

use rand::Rng;
use rand::seq::IndexedRandom;
use townsfolk_agents::{AgentError, economy, memory};
use townsfolk_types::{
    AgentId, Crew, CrewId, CrewMember, CrewRole, MemoryKind, Need, Place, SimEvent,
};

use super::{Pass, ticks_u32};
use crate::broadcast::EventSink;
use crate::effects;
use crate::world::World;

const ADJECTIVES: [&str; 8] = [
    "Midnight", "Golden", "Lucky", "Wild", "Quiet", "Electric", "Velvet", "Rusty",
];
const NOUNS: [&str; 8] = [
    "Owls", "Foxes", "Comets", "Rebels", "Gardeners", "Strangers", "Lanterns", "Pigeons",
];
const MOTTOS: [&str; 6] = [
    "Together or not at all.",
    "Loud, proud, and slightly late.",
    "We came, we saw, we had snacks.",
    "Friends first, plans later.",
    "Never the last to leave.",
    "Small town, big dreams.",
];

/// Whether the agent belongs to an active crew.
pub fn in_crew(world: &World, agent_id: AgentId) -> bool {
    world.crew_of(agent_id).is_some()
}

/// Number of active crews.
pub fn active_count(world: &World) -> usize {
    world.initiatives.crews.iter().filter(|c| !c.dissolved).count()
}

fn crew_mut(world: &mut World, crew_id: CrewId) -> Option<&mut Crew> {
    world.initiatives.crews.iter_mut().find(|c| c.id == crew_id)
}

fn unique_name<R: Rng + ?Sized>(world: &World, rng: &mut R) -> String {
    let taken = |name: &str| world.initiatives.crews.iter().any(|c| c.name == name);
    for _ in 0..16 {
        let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Nameless");
        let noun = NOUNS.choose(rng).copied().unwrap_or("Crew");
        let name = format!("The {adjective} {noun}");
        if !taken(&name) {
            return name;
        }
    }
    let mut number = world.initiatives.crews.len().saturating_add(1);
    loop {
        let name = format!("Crew No. {number}");
        if !taken(&name) {
            return name;
        }
        number = number.saturating_add(1);
    }
}

/// Maybe found a crew led by `founder`.
pub fn originate<R: Rng + ?Sized>(
    world: &mut World,
    founder: AgentId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.crew;
    if !rng.random_bool(config.chance) {
        return Ok(());
    }
    let balance = world
        .agent(founder)
        .ok_or(AgentError::AgentNotFound(founder))?
        .balance;
    if in_crew(world, founder) || active_count(world) >= config.max_active || balance < config.fee
    {
        return Ok(());
    }
    let friends: Vec<AgentId> = world
        .relationships
        .friends_of(founder, &world.config.agents.social)
        .into_iter()
        .filter(|id| world.agents.contains_key(id) && !in_crew(world, *id))
        .collect();
    if friends.len() < config.min_friends.max(1) {
        return Ok(());
    }

    let count = rng.random_range(1..=config.max_founding_friends.clamp(1, friends.len()));
    let recruits: Vec<AgentId> = friends.choose_multiple(rng, count).copied().collect();
    let name = unique_name(world, rng);
    let motto = MOTTOS.choose(rng).copied().unwrap_or("Together.").to_owned();
    let color = format!("#{:06x}", rng.random_range(0..0x0100_0000_u32));

    let founder_profile = world
        .agents
        .get_mut(&founder)
        .ok_or(AgentError::AgentNotFound(founder))?;
    economy::debit(founder_profile, config.fee)?;

    let mut members = vec![CrewMember {
        agent_id: founder,
        role: CrewRole::Leader,
        joined_tick: pass.tick,
    }];
    members.extend(recruits.iter().map(|id| CrewMember {
        agent_id: *id,
        role: CrewRole::Member,
        joined_tick: pass.tick,
    }));

    let crew = Crew {
        id: CrewId::new(),
        name: name.clone(),
        motto,
        color,
        leader: founder,
        members,
        reputation: 0,
        founded_tick: pass.tick,
        dissolved: false,
    };

    let memory_config = world.config.agents.memory;
    for member in &crew.members {
        if let Some(agent) = world.agents.get_mut(&member.agent_id) {
            memory::remember(
                agent,
                memory::entry(MemoryKind::Crew, Some(founder), format!("Joined {name}"), 0.8, pass.tick),
                &memory_config,
            );
        }
    }

    let founder_name = world.agent(founder).map(|a| a.name.clone()).unwrap_or_default();
    sink.emit_event(SimEvent::CrewFormed {
        crew_id: crew.id,
        name: name.clone(),
        leader: founder,
        members: crew.members.iter().map(|m| m.agent_id).collect(),
    });
    sink.headline(format!(
        "{founder_name} founded {name} with {} friends!",
        recruits.len()
    ));
    tracing::info!(crew_id = %crew.id, %founder, name = %name, "crew formed");
    world.initiatives.crews.push(crew);
    Ok(())
}

/// Membership churn, reputation, succession and co-location bonus for
/// every active crew.
pub fn upkeep<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) {
    let active: Vec<CrewId> = world
        .initiatives
        .crews
        .iter()
        .filter(|c| !c.dissolved)
        .map(|c| c.id)
        .collect();

    for crew_id in active {
        drop_departed(world, crew_id, pass, sink);
        if dissolve_if_empty(world, crew_id, sink) {
            continue;
        }
        accrue_reputation(world, crew_id, pass);
        maybe_succession(world, crew_id, rng, sink);
        colocated_bonus(world, crew_id, pass, sink);
    }
}

/// Remove vanished agents and members whose friendship with the leader
/// has soured.
fn drop_departed(world: &mut World, crew_id: CrewId, pass: Pass, sink: &mut dyn EventSink) {
    let leave_at = world.config.initiatives.crew.leave_friendship;
    let Some(crew) = world.initiatives.crews.iter().find(|c| c.id == crew_id) else {
        return;
    };
    let leader = crew.leader;
    let crew_name = crew.name.clone();
    let leaving: Vec<AgentId> = crew
        .members
        .iter()
        .map(|m| m.agent_id)
        .filter(|id| {
            !world.agents.contains_key(id)
                || (*id != leader && world.relationships.friendship(*id, leader) <= leave_at)
        })
        .collect();
    if leaving.is_empty() {
        return;
    }

    if let Some(crew) = crew_mut(world, crew_id) {
        crew.members.retain(|m| !leaving.contains(&m.agent_id));
        if !crew.has_member(crew.leader) {
            let next = crew.members.first().map(|m| m.agent_id);
            if let Some(next) = next {
                crew.leader = next;
            }
        }
        let current = crew.leader;
        for member in &mut crew.members {
            member.role = if member.agent_id == current {
                CrewRole::Leader
            } else {
                CrewRole::Member
            };
        }
    }

    let memory_config = world.config.agents.memory;
    for agent_id in leaving {
        if let Some(agent) = world.agents.get_mut(&agent_id) {
            memory::remember(
                agent,
                memory::entry(MemoryKind::Crew, None, format!("Left {crew_name}"), -0.4, pass.tick),
                &memory_config,
            );
        }
        sink.emit_event(SimEvent::CrewMemberLeft { crew_id, agent_id });
        tracing::debug!(%crew_id, %agent_id, "crew member left");
    }
}

fn dissolve_if_empty(world: &mut World, crew_id: CrewId, sink: &mut dyn EventSink) -> bool {
    let Some(crew) = crew_mut(world, crew_id) else {
        return true;
    };
    if !crew.members.is_empty() {
        return false;
    }
    crew.dissolved = true;
    let name = crew.name.clone();
    sink.emit_event(SimEvent::CrewDissolved {
        crew_id,
        name: name.clone(),
    });
    sink.headline(format!("{name} has disbanded."));
    tracing::info!(%crew_id, name = %name, "crew dissolved");
    true
}

fn accrue_reputation(world: &mut World, crew_id: CrewId, pass: Pass) {
    let threshold = world.config.initiatives.crew.reputation_clout_threshold;
    let Some(crew) = world.initiatives.crews.iter().find(|c| c.id == crew_id) else {
        return;
    };
    let notable = crew
        .members
        .iter()
        .filter_map(|m| world.agents.get(&m.agent_id))
        .filter(|a| a.clout > threshold)
        .count();
    let gain = u64::try_from(notable)
        .unwrap_or(u64::MAX)
        .saturating_mul(pass.elapsed);
    if let Some(crew) = crew_mut(world, crew_id) {
        crew.reputation = crew.reputation.saturating_add(gain);
    }
}

/// A leader in a poor mood may hand over to the highest-clout member.
fn maybe_succession<R: Rng + ?Sized>(
    world: &mut World,
    crew_id: CrewId,
    rng: &mut R,
    sink: &mut dyn EventSink,
) {
    let chance = world.config.initiatives.crew.succession_chance;
    let Some(crew) = world.initiatives.crews.iter().find(|c| c.id == crew_id) else {
        return;
    };
    let previous = crew.leader;
    let leader_unhappy = world.agent(previous).is_some_and(|a| a.mood.is_poor());
    if !leader_unhappy || crew.members.len() < 2 || !rng.random_bool(chance) {
        return;
    }
    let Some(next) = crew
        .members
        .iter()
        .filter(|m| m.agent_id != previous)
        .filter_map(|m| world.agents.get(&m.agent_id))
        .max_by_key(|a| a.clout)
        .map(|a| a.id)
    else {
        return;
    };
    let next_name = world.agent(next).map(|a| a.name.clone()).unwrap_or_default();

    let Some(crew) = crew_mut(world, crew_id) else {
        return;
    };
    crew.leader = next;
    for member in &mut crew.members {
        member.role = if member.agent_id == next {
            CrewRole::Leader
        } else {
            CrewRole::Member
        };
    }
    let crew_name = crew.name.clone();
    sink.emit_event(SimEvent::CrewLeaderChanged {
        crew_id,
        previous,
        leader: next,
    });
    sink.headline(format!("{next_name} now leads {crew_name}."));
    tracing::info!(%crew_id, %previous, leader = %next, "crew leadership changed");
}

fn colocated_bonus(world: &mut World, crew_id: CrewId, pass: Pass, sink: &mut dyn EventSink) {
    let config = world.config.initiatives.crew;
    let Some(crew) = world.initiatives.crews.iter().find(|c| c.id == crew_id) else {
        return;
    };
    let placed: Vec<(AgentId, Place)> = crew
        .members
        .iter()
        .filter_map(|m| world.agents.get(&m.agent_id))
        .filter_map(|a| a.location.place().map(|p| (a.id, p)))
        .collect();
    let together: Vec<AgentId> = placed
        .iter()
        .filter(|(id, place)| placed.iter().any(|(other, p)| other != id && p == place))
        .map(|(id, _)| *id)
        .collect();

    let ticks = f64::from(ticks_u32(pass.elapsed));
    let bonus = [
        (Need::Social, config.colocated_social * ticks),
        (Need::Fun, config.colocated_fun * ticks),
    ];
    let agents_config = world.config.agents.clone();
    for agent_id in together {
        if let Some(agent) = world.agents.get_mut(&agent_id) {
            effects::nudge_needs(agent, &bonus, &agents_config, sink);
        }
    }
}

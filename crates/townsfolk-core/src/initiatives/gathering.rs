//! Hosted gatherings: parties, concerts and the like.
//!
//! A well-off, well-known agent pays to announce a gathering at a place
//! bound to its kind. A couple of ticks later it is held, and everyone
//! standing at that place at that moment gets the kind's need bundle.

use rand::Rng;
use townsfolk_agents::{AgentError, economy, memory};
use townsfolk_types::{
    AgentId, Gathering, GatheringId, GatheringKind, GatheringStatus, MemoryKind, Need,
    PersonalityTrait, Place, SimEvent,
};

use super::{Pass, pick_by_trait};
use crate::broadcast::EventSink;
use crate::effects;
use crate::world::World;

/// Static description of a gathering kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatheringSpec {
    /// Display label.
    pub label: &'static str,
    /// Where it is held.
    pub place: Place,
    /// Applied to every attendee.
    pub effects: &'static [(Need, f64)],
    /// Hosts high in this trait favor the kind.
    pub host_trait: PersonalityTrait,
}

/// Catalog record for a gathering kind.
pub const fn lookup(kind: GatheringKind) -> GatheringSpec {
    match kind {
        GatheringKind::Party => GatheringSpec {
            label: "party",
            place: Place::Plaza,
            effects: &[(Need::Social, 20.0), (Need::Fun, 15.0)],
            host_trait: PersonalityTrait::Extraversion,
        },
        GatheringKind::Concert => GatheringSpec {
            label: "concert",
            place: Place::Park,
            effects: &[(Need::Fun, 25.0), (Need::Comfort, 5.0)],
            host_trait: PersonalityTrait::Openness,
        },
        GatheringKind::Tournament => GatheringSpec {
            label: "tournament",
            place: Place::Arena,
            effects: &[(Need::Fun, 20.0), (Need::Energy, -5.0)],
            host_trait: PersonalityTrait::Neuroticism,
        },
        GatheringKind::BookClub => GatheringSpec {
            label: "book club",
            place: Place::Library,
            effects: &[(Need::Social, 10.0), (Need::Fun, 10.0)],
            host_trait: PersonalityTrait::Conscientiousness,
        },
        GatheringKind::Potluck => GatheringSpec {
            label: "potluck",
            place: Place::Home,
            effects: &[(Need::Hunger, 25.0), (Need::Social, 10.0)],
            host_trait: PersonalityTrait::Agreeableness,
        },
    }
}

/// Number of announced, not yet held, gatherings.
pub fn announced_count(world: &World) -> usize {
    world
        .initiatives
        .gatherings
        .iter()
        .filter(|g| g.status == GatheringStatus::Announced)
        .count()
}

/// Maybe announce a gathering hosted by `host`.
pub fn originate<R: Rng + ?Sized>(
    world: &mut World,
    host: AgentId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.gathering;
    if !rng.random_bool(config.chance) {
        return Ok(());
    }
    let profile = world.agent(host).ok_or(AgentError::AgentNotFound(host))?;
    let cooled = world
        .initiatives
        .last_gathering_tick
        .is_none_or(|last| pass.tick >= last.saturating_add(config.cooldown_ticks));
    if profile.balance < config.min_balance
        || profile.clout < config.min_clout
        || announced_count(world) >= config.max_active
        || !cooled
    {
        return Ok(());
    }
    let Some(kind) = pick_by_trait(
        &GatheringKind::ALL,
        |k| lookup(k).host_trait,
        &profile.personality,
        rng,
    ) else {
        return Ok(());
    };
    let record = lookup(kind);
    let host_name = profile.name.clone();

    let profile = world
        .agents
        .get_mut(&host)
        .ok_or(AgentError::AgentNotFound(host))?;
    economy::debit(profile, config.host_cost)?;
    memory::remember(
        profile,
        memory::entry(
            MemoryKind::Gathering,
            None,
            format!("Announced a {}", record.label),
            0.6,
            pass.tick,
        ),
        &world.config.agents.memory,
    );

    let gathering = Gathering {
        id: GatheringId::new(),
        host,
        kind,
        place: record.place,
        status: GatheringStatus::Announced,
        created_tick: pass.tick,
        starts_tick: pass.tick.saturating_add(config.delay_ticks),
        attendees: Vec::new(),
    };
    sink.emit_event(SimEvent::GatheringAnnounced {
        gathering_id: gathering.id,
        host,
        kind,
        place: record.place,
        starts_tick: gathering.starts_tick,
    });
    sink.headline(format!(
        "{host_name} is throwing a {} at the {}!",
        record.label,
        record.place.as_str()
    ));
    tracing::info!(gathering_id = %gathering.id, %host, kind = record.label, "gathering announced");

    world.initiatives.last_gathering_tick = Some(pass.tick);
    world.initiatives.gatherings.push(gathering);
    Ok(())
}

/// Hold every announced gathering whose start tick has come.
pub fn resolve_due(world: &mut World, pass: Pass, sink: &mut dyn EventSink) {
    let due: Vec<GatheringId> = world
        .initiatives
        .gatherings
        .iter()
        .filter(|g| g.status == GatheringStatus::Announced && g.starts_tick <= pass.tick)
        .map(|g| g.id)
        .collect();
    for gathering_id in due {
        hold(world, gathering_id, pass, sink);
    }
    prune(world);
}

fn hold(world: &mut World, gathering_id: GatheringId, pass: Pass, sink: &mut dyn EventSink) {
    let Some((host, kind, place)) = world
        .initiatives
        .gatherings
        .iter()
        .find(|g| g.id == gathering_id)
        .map(|g| (g.host, g.kind, g.place))
    else {
        return;
    };
    let record = lookup(kind);
    let config = world.config.initiatives.gathering;
    let agents_config = world.config.agents.clone();
    let attendees = world.agents_at(place);

    for agent_id in &attendees {
        if let Some(agent) = world.agents.get_mut(agent_id) {
            effects::nudge_needs(agent, record.effects, &agents_config, sink);
            memory::remember(
                agent,
                memory::entry(
                    MemoryKind::Gathering,
                    Some(host),
                    format!("Went to a {} at the {}", record.label, place.as_str()),
                    0.7,
                    pass.tick,
                ),
                &agents_config.memory,
            );
        }
    }

    let guests = attendees.iter().filter(|id| **id != host).count();
    let clout = u32::try_from(guests)
        .unwrap_or(u32::MAX)
        .saturating_mul(config.host_clout_per_attendee)
        .min(config.host_clout_cap);
    if let Some(agent) = world.agents.get_mut(&host) {
        effects::add_clout(agent, clout);
    }

    if let Some(gathering) = world
        .initiatives
        .gatherings
        .iter_mut()
        .find(|g| g.id == gathering_id)
    {
        gathering.status = GatheringStatus::Held;
        gathering.attendees.clone_from(&attendees);
    }
    let count = attendees.len();
    sink.emit_event(SimEvent::GatheringHeld {
        gathering_id,
        attendees,
    });
    sink.headline(format!(
        "{count} showed up to the {} at the {}.",
        record.label,
        place.as_str()
    ));
    tracing::info!(%gathering_id, attendees = count, "gathering held");
}

fn prune(world: &mut World) {
    let keep = world.config.initiatives.gathering.history;
    let gatherings = &mut world.initiatives.gatherings;
    let held = gatherings
        .iter()
        .filter(|g| g.status == GatheringStatus::Held)
        .count();
    let mut to_drop = held.saturating_sub(keep);
    gatherings.retain(|g| {
        if to_drop > 0 && g.status == GatheringStatus::Held {
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
    use townsfolk_types::Location;

    use super::*;
    use crate::broadcast::RecordingSink;
    use crate::initiatives::test_support::{add_agent, pass, world};

    fn rich_host(world: &mut World) -> AgentId {
        let host = add_agent(world, "Hana", Place::Office);
        let agent = world.agents.get_mut(&host).unwrap();
        agent.balance = 500;
        agent.clout = 70;
        host
    }

    #[test]
    fn announcement_is_gated_and_paid_for() {
        let mut world = world();
        world.config.initiatives.gathering.chance = 1.0;
        let poor = add_agent(&mut world, "Pip", Place::Office);
        let host = rich_host(&mut world);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut sink = RecordingSink::default();

        originate(&mut world, poor, &mut rng, pass(1), &mut sink).unwrap();
        assert_eq!(announced_count(&world), 0);

        originate(&mut world, host, &mut rng, pass(1), &mut sink).unwrap();
        assert_eq!(announced_count(&world), 1);
        assert_eq!(world.agent(host).unwrap().balance, 450);

        // one at a time, then a cooldown
        originate(&mut world, host, &mut rng, pass(2), &mut sink).unwrap();
        assert_eq!(world.initiatives.gatherings.len(), 1);
    }

    #[test]
    fn attendance_is_decided_when_it_is_held() {
        let mut world = world();
        world.config.initiatives.gathering.chance = 1.0;
        let host = rich_host(&mut world);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut sink = RecordingSink::default();
        originate(&mut world, host, &mut rng, pass(1), &mut sink).unwrap();
        let place = world.initiatives.gatherings.first().unwrap().place;

        let early = add_agent(&mut world, "Early", place);
        let late = add_agent(&mut world, "Late", Place::Office);
        world.agents.get_mut(&early).unwrap().location = Location::At { place: Place::Gym };
        world.agents.get_mut(&late).unwrap().location = Location::At { place };

        resolve_due(&mut world, pass(2), &mut sink);
        assert_eq!(announced_count(&world), 1, "not due before the delay");

        resolve_due(&mut world, pass(3), &mut sink);
        let held = world.initiatives.gatherings.first().unwrap();
        assert_eq!(held.status, GatheringStatus::Held);
        assert_eq!(held.attendees, vec![late]);
        assert_eq!(world.agent(host).unwrap().clout, 72);
    }
}

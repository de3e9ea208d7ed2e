//! Short scripted exchanges between co-located agents.

use chrono::{DateTime, Utc};
use rand::Rng;
use townsfolk_agents::memory;
use townsfolk_types::{AgentId, MemoryKind, Need, Place, SimEvent};

use crate::broadcast::EventSink;
use crate::effects;
use crate::world::World;

/// Topic scripts per place. Each script is two or three lines, spoken in
/// alternation starting with the initiator.
const fn topics(place: Place) -> &'static [&'static [&'static str]] {
    match place {
        Place::Home => &[
            &["Did you leave the stove on again?", "Only a little.", "That's not how stoves work."],
            &["Movie night later?", "Only if I pick."],
        ],
        Place::Cafe => &[
            &["Have you tried the new roast?", "Tastes like burnt toast.", "That's the point!"],
            &["Is this seat taken?", "All yours."],
        ],
        Place::Park => &[
            &["Look at those ducks.", "They're plotting something."],
            &["Perfect weather today.", "Don't jinx it.", "Too late, I see clouds."],
        ],
        Place::Gym => &[
            &["You done with that bench?", "Two more sets."],
            &["How much are you lifting?", "Enough to feel it tomorrow."],
        ],
        Place::Library => &[
            &["Any good recommendations?", "This one kept me up all night."],
            &["Shh.", "I didn't say anything!", "Shh!"],
        ],
        Place::Arena => &[
            &["You're going down next round.", "Big talk for someone who lost last time."],
            &["Nice moves. Lucky, though.", "Luck is a skill.", "We'll see about that."],
        ],
        Place::Plaza => &[
            &["Heard the latest gossip?", "Always. Spill it."],
            &["Great to see you!", "You too! It's been ages.", "We should do this more often."],
        ],
        Place::Market => &[
            &["Those prices are criminal.", "Haggle harder."],
            &["What are you buying?", "Something I definitely don't need."],
        ],
        Place::Office => &[
            &["Did you finish the report?", "What report?"],
            &["Coffee break?", "Already on my third.", "Make it four."],
        ],
    }
}

/// Roll for a conversation started by `initiator`.
///
/// Needs the initiator awake at a place with at least one awake peer.
/// Returns the partner when a conversation happened.
pub fn maybe_converse<R: Rng + ?Sized>(
    world: &mut World,
    initiator: AgentId,
    rng: &mut R,
    now: DateTime<Utc>,
    sink: &mut dyn EventSink,
) -> Option<AgentId> {
    let agent = world.agent(initiator)?;
    let place = agent.location.place()?;
    if agent.activity.is_sleeping() || !rng.random_bool(world.config.decision.conversation_chance)
    {
        return None;
    }
    let peers: Vec<AgentId> = world
        .agents_at(place)
        .into_iter()
        .filter(|id| *id != initiator)
        .filter(|id| world.agent(*id).is_some_and(|a| !a.activity.is_sleeping()))
        .collect();
    if peers.is_empty() {
        return None;
    }
    let partner = *peers.get(rng.random_range(0..peers.len()))?;
    converse(world, initiator, partner, place, rng, now, sink).then_some(partner)
}

/// Run one exchange between two agents at `place`.
///
/// The arena breeds rivalry; everywhere else builds friendship. Both
/// participants get a social bump and a memory. Returns `false` when
/// either agent is unknown.
pub fn converse<R: Rng + ?Sized>(
    world: &mut World,
    initiator: AgentId,
    partner: AgentId,
    place: Place,
    rng: &mut R,
    now: DateTime<Utc>,
    sink: &mut dyn EventSink,
) -> bool {
    let tick = world.tick();
    let decision = world.config.decision;
    let agents_config = world.config.agents.clone();

    let scripts = topics(place);
    let script = scripts
        .get(rng.random_range(0..scripts.len()))
        .copied()
        .unwrap_or_default();

    let Some((a, b)) = world.pair_mut(initiator, partner) else {
        return false;
    };

    let mut lines = Vec::with_capacity(script.len());
    for (turn, text) in script.iter().enumerate() {
        let speaker = if turn % 2 == 0 { &*a } else { &*b };
        sink.emit_chat(speaker.id, &speaker.name, text);
        lines.push(format!("{}: {text}", speaker.name));
    }

    let bonus = [(Need::Social, decision.conversation_social_bonus)];
    effects::nudge_needs(a, &bonus, &agents_config, sink);
    effects::nudge_needs(b, &bonus, &agents_config, sink);

    let (description_a, description_b, sentiment) = if place == Place::Arena {
        (
            format!("Traded trash talk with {} at the arena", b.name),
            format!("Traded trash talk with {} at the arena", a.name),
            -0.1,
        )
    } else {
        (
            format!("Chatted with {} at the {}", b.name, place.as_str()),
            format!("Chatted with {} at the {}", a.name, place.as_str()),
            0.4,
        )
    };
    memory::remember(
        a,
        memory::entry(MemoryKind::Conversation, Some(partner), description_a, sentiment, tick),
        &agents_config.memory,
    );
    memory::remember(
        b,
        memory::entry(MemoryKind::Conversation, Some(initiator), description_b, sentiment, tick),
        &agents_config.memory,
    );

    let (friendship, rivalry) = if place == Place::Arena {
        (0.0, decision.conversation_rivalry)
    } else {
        (decision.conversation_friendship, 0.0)
    };
    world
        .relationships
        .update(initiator, partner, friendship, rivalry, now);

    sink.emit_event(SimEvent::Conversation {
        initiator,
        partner,
        place,
        lines,
    });
    tracing::debug!(%initiator, %partner, place = place.as_str(), "conversation");
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use townsfolk_types::{Location, Personality};

    use super::*;
    use crate::broadcast::RecordingSink;
    use crate::config::SimulationConfig;

    fn world_with_pair(place: Place) -> (World, AgentId, AgentId) {
        let now = Utc::now();
        let mut world = World::new(SimulationConfig::default(), now).unwrap();
        let [a, b] = [AgentId::new(), AgentId::new()];
        world.register_agent(a, "Ada".into(), Personality::balanced(), now);
        world.register_agent(b, "Bo".into(), Personality::balanced(), now);
        for id in [a, b] {
            let agent = world.agents.get_mut(&id).unwrap();
            agent.location = Location::At { place };
            agent.needs.social = 50.0;
        }
        (world, a, b)
    }

    #[test]
    fn arena_talk_breeds_rivalry_not_friendship() {
        let (mut world, a, b) = world_with_pair(Place::Arena);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut sink = RecordingSink::default();
        assert!(converse(&mut world, a, b, Place::Arena, &mut rng, Utc::now(), &mut sink));

        let rel = world.relationships.get(b, a).unwrap();
        assert!(rel.rivalry > 0.0);
        assert!(rel.friendship <= 0.0);
        assert!((world.agent(a).unwrap().needs.social - 55.0).abs() < 1e-9);
        assert!((world.agent(b).unwrap().needs.social - 55.0).abs() < 1e-9);
    }

    #[test]
    fn plaza_talk_builds_friendship() {
        let (mut world, a, b) = world_with_pair(Place::Plaza);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut sink = RecordingSink::default();
        assert!(converse(&mut world, a, b, Place::Plaza, &mut rng, Utc::now(), &mut sink));

        assert!(world.relationships.friendship(a, b) > 0.0);
        assert!(world.relationships.rivalry(a, b).abs() < f64::EPSILON);
        assert!((2..=3).contains(&sink.chats.len()));
        assert!(
            sink.events
                .iter()
                .any(|e| matches!(e, SimEvent::Conversation { lines, .. } if lines.len() == sink.chats.len()))
        );
        assert_eq!(world.agent(b).unwrap().memories.len(), 1);
    }

    #[test]
    fn sleeping_peers_are_left_alone() {
        let (mut world, a, b) = world_with_pair(Place::Home);
        world.config.decision.conversation_chance = 1.0;
        world.agents.get_mut(&b).unwrap().activity =
            townsfolk_types::Activity::Performing(townsfolk_types::ActionKind::Sleep);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();
        assert_eq!(maybe_converse(&mut world, a, &mut rng, Utc::now(), &mut sink), None);
        assert!(world.relationships.is_empty());
    }
}

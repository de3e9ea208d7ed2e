//! End-to-end scenarios for the simulation core.
//!
//! Each test drives the public API the way the engine binary does and
//! checks one of the properties the town must always hold.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use townsfolk_agents::skills::add_scaled_xp;
use townsfolk_agents::{RelationshipGraph, SkillConfig, needs};
use townsfolk_core::decision::{self, TurnOutcome, conversation};
use townsfolk_core::initiatives::{self, Pass, challenge};
use townsfolk_core::{RecordingSink, Scheduler, SimulationConfig, World};
use townsfolk_types::{
    ActionKind, AgentId, Challenge, ChallengeId, ChallengeStatus, Crew, CrewId, CrewMember,
    CrewRole, Location, Needs, Personality, Place, SkillProgress, Territory, TerritoryId,
};

fn seeded_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.seed = Some(seed);
    config.world.tick_interval_ms = 1_000;
    config
}

fn add(world: &mut World, name: &str, place: Place, now: DateTime<Utc>) -> AgentId {
    let id = AgentId::new();
    world.register_agent(id, name.into(), Personality::balanced(), now);
    world.agents.get_mut(&id).unwrap().location = Location::At { place };
    id
}

fn pass(tick: u64) -> Pass {
    Pass {
        tick,
        now: Utc::now(),
        elapsed: 1,
    }
}

/// A config where no initiative is ever originated, only upkept.
fn quiet_config(seed: u64) -> SimulationConfig {
    let mut config = seeded_config(seed);
    config.initiatives.challenge.chance = 0.0;
    config.initiatives.crew.chance = 0.0;
    config.initiatives.gathering.chance = 0.0;
    config.initiatives.goal.chance = 0.0;
    config.initiatives.market.chance = 0.0;
    config.initiatives.structure.chance = 0.0;
    config.initiatives.territory.chance = 0.0;
    config
}

fn member(agent_id: AgentId, role: CrewRole) -> CrewMember {
    CrewMember {
        agent_id,
        role,
        joined_tick: 0,
    }
}

fn extreme_personalities() -> Vec<Personality> {
    let mut all = vec![Personality::balanced()];
    for i in 0..5 {
        let mut p = Personality {
            openness: 0.0,
            conscientiousness: 0.0,
            extraversion: 0.0,
            agreeableness: 0.0,
            neuroticism: 0.0,
        };
        match i {
            0 => p.openness = 1.0,
            1 => p.conscientiousness = 1.0,
            2 => p.extraversion = 1.0,
            3 => p.agreeableness = 1.0,
            _ => p.neuroticism = 1.0,
        }
        all.push(p);
    }
    all
}

#[test]
fn exhausted_agent_always_heads_for_bed() {
    let now = Utc::now();
    let config = seeded_config(1);
    let world = World::new(config.clone(), now).unwrap();

    for (seed, personality) in extreme_personalities().into_iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let mut agent = townsfolk_agents::new_profile(
            AgentId::new(),
            "Tired".into(),
            personality,
            now,
            &config.agents,
        );
        agent.needs = Needs::uniform(80.0);
        agent.needs.energy = 10.0;

        let mut sink = RecordingSink::default();
        let outcome =
            decision::run_agent_turn(&mut agent, &world, &mut rng, &config, 0, 1, &mut sink)
                .unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Started {
                action: ActionKind::Sleep,
                critical: true
            }
        );
    }
}

#[test]
fn arena_talk_breeds_rivalry_not_friendship() {
    let now = Utc::now();
    let mut world = World::new(seeded_config(2), now).unwrap();
    let a = add(&mut world, "Ari", Place::Arena, now);
    let b = add(&mut world, "Bo", Place::Arena, now);
    let mut rng = StdRng::seed_from_u64(2);
    let mut sink = RecordingSink::default();

    assert!(conversation::converse(&mut world, a, b, Place::Arena, &mut rng, now, &mut sink));
    assert!(world.relationships.rivalry(a, b) > 0.0);
    assert!(world.relationships.friendship(a, b) <= 0.0);
    assert!(sink.chats.len() >= 2);
}

#[test]
fn skill_progress_follows_the_curve() {
    let config = SkillConfig::default();
    let start = SkillProgress {
        level: 3,
        xp: 90,
        total_xp: 0,
    };

    let mut small = start;
    add_scaled_xp(&mut small, 20, &config).unwrap();
    assert_eq!((small.level, small.xp), (3, 110));

    // 990 xp at level 3: 500 to leave 3, leaving 490 of the 800 for level 4.
    let mut big = start;
    add_scaled_xp(&mut big, 900, &config).unwrap();
    assert_eq!((big.level, big.xp), (4, 490));
    assert_eq!(big.total_xp, 900);
}

#[test]
fn duel_payout_is_capped_by_the_losers_balance() {
    let now = Utc::now();
    let mut config = seeded_config(3);
    config.initiatives.challenge.accept_base = 1.0;
    let mut world = World::new(config, now).unwrap();
    let creator = add(&mut world, "Cy", Place::Arena, now);
    let target = add(&mut world, "Di", Place::Arena, now);
    for id in [creator, target] {
        world.agents.get_mut(&id).unwrap().balance = 40;
    }
    let id = ChallengeId::new();
    world.initiatives.challenges.push(Challenge {
        id,
        creator,
        target,
        skill: townsfolk_types::SkillName::Fitness,
        wager: 100,
        status: ChallengeStatus::Pending,
        created_tick: 1,
        outcome: None,
    });

    let mut rng = StdRng::seed_from_u64(3);
    let mut sink = RecordingSink::default();
    challenge::resolve_due(&mut world, &mut rng, pass(2), &mut sink).unwrap();

    let settled = world.initiatives.challenges.iter().find(|c| c.id == id).unwrap();
    assert_eq!(settled.status, ChallengeStatus::Resolved);
    let outcome = settled.outcome.clone().unwrap();
    assert_eq!(outcome.payout, 40);
    assert_eq!(world.agent(outcome.loser).unwrap().balance, 0);
    assert_eq!(world.agent(outcome.winner).unwrap().balance, 80);
}

#[test]
fn ticking_within_one_interval_is_a_no_op() {
    let start = Utc::now();
    let mut scheduler = Scheduler::new(seeded_config(4), RecordingSink::default(), start).unwrap();
    for name in ["Ed", "Flo", "Gil"] {
        scheduler.register_agent(AgentId::new(), name.into(), Personality::balanced(), start);
    }
    scheduler.tick(start + Duration::seconds(1)).unwrap();

    let agents = scheduler.world().agents.clone();
    let initiatives_before = format!("{:?}", scheduler.world().initiatives);
    let emitted = scheduler.sink().events.len();
    let chats = scheduler.sink().chats.len();

    scheduler.tick(start + Duration::milliseconds(1_300)).unwrap();
    scheduler.tick(start + Duration::milliseconds(1_999)).unwrap();

    assert_eq!(scheduler.world().agents, agents);
    assert_eq!(format!("{:?}", scheduler.world().initiatives), initiatives_before);
    assert_eq!(scheduler.sink().events.len(), emitted);
    assert_eq!(scheduler.sink().chats.len(), chats);
    assert_eq!(scheduler.world().tick(), 1);
}

#[test]
fn catch_up_decay_matches_single_steps() {
    let now = Utc::now();
    let config = SimulationConfig::default();
    let personality = Personality {
        openness: 0.9,
        conscientiousness: 0.2,
        extraversion: 0.7,
        agreeableness: 0.4,
        neuroticism: 0.8,
    };
    let fresh = || {
        townsfolk_agents::new_profile(AgentId::new(), "Hal".into(), personality, now, &config.agents)
    };

    let mut batched = fresh();
    needs::decay_agent(&mut batched, &config.agents.needs, 7);
    let mut stepped = fresh();
    for _ in 0..7 {
        needs::decay_agent(&mut stepped, &config.agents.needs, 1);
    }
    for need in townsfolk_types::Need::ALL {
        assert!((batched.needs.get(need) - stepped.needs.get(need)).abs() < 1e-9);
    }
    assert_eq!(batched.mood, stepped.mood);
}

#[test]
fn relationships_read_the_same_both_ways() {
    let mut graph = RelationshipGraph::new();
    let a = AgentId::new();
    let b = AgentId::new();
    let now = Utc::now();
    graph.update(a, b, 12.0, 4.0, now);
    graph.update(b, a, -2.0, 1.0, now);

    assert_eq!(graph.len(), 1);
    assert_eq!(graph.get(a, b), graph.get(b, a));
    assert!((graph.friendship(b, a) - 10.0).abs() < f64::EPSILON);
    assert!((graph.rivalry(a, b) - 5.0).abs() < f64::EPSILON);
}

#[test]
fn long_run_keeps_every_invariant() {
    let start = Utc::now();
    let mut config = seeded_config(5);
    config.initiatives.challenge.chance = 0.5;
    config.initiatives.crew.chance = 0.3;
    config.initiatives.goal.chance = 0.2;
    config.initiatives.structure.chance = 0.2;
    config.decision.conversation_chance = 0.6;
    let mut scheduler = Scheduler::new(config, RecordingSink::default(), start).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let ids: Vec<AgentId> = (0..10).map(|_| AgentId::new()).collect();
    for (n, id) in ids.iter().enumerate() {
        let personality = townsfolk_agents::random_personality(&mut rng);
        scheduler.register_agent(*id, format!("Resident {n}"), personality, start);
    }
    // Everyone starts as friends so crews can form.
    for (i, a) in ids.iter().enumerate() {
        for b in ids.iter().skip(i + 1) {
            scheduler.world_mut().relationships.update(*a, *b, 40.0, 0.0, start);
        }
    }

    for step in 1..=200_i64 {
        scheduler.tick(start + Duration::seconds(step)).unwrap();
        let world = scheduler.world();

        for agent in world.agents.values() {
            for need in townsfolk_types::Need::ALL {
                let value = agent.needs.get(need);
                assert!((0.0..=100.0).contains(&value), "need {need:?} = {value}");
            }
            for progress in agent.skills.values() {
                assert!((1..=10).contains(&progress.level));
            }
        }

        assert!(challenge::pending_count(world) <= 3);
        let mut busy = BTreeSet::new();
        for c in world
            .initiatives
            .challenges
            .iter()
            .filter(|c| c.status == ChallengeStatus::Pending)
        {
            assert!(busy.insert(c.creator), "creator in two challenges");
            assert!(busy.insert(c.target), "target in two challenges");
        }

        let mut crewed = BTreeSet::new();
        for crew in world.initiatives.crews.iter().filter(|c| !c.dissolved) {
            assert!(!crew.members.is_empty(), "active crew without members");
            assert!(crew.has_member(crew.leader));
            for member in &crew.members {
                assert!(crewed.insert(member.agent_id), "agent in two crews");
            }
        }
        assert!(initiatives::crew::active_count(world) <= 6);
    }
    assert_eq!(scheduler.world().tick(), 200);
}

#[test]
fn territory_pays_crewmates_standing_on_it() {
    let now = Utc::now();
    let mut config = quiet_config(6);
    config.initiatives.crew.colocated_fun = 0.0;
    config.initiatives.crew.colocated_social = 0.0;
    let mut world = World::new(config, now).unwrap();
    let leader = add(&mut world, "Ivy", Place::Plaza, now);
    let present = add(&mut world, "Jo", Place::Plaza, now);
    let away = add(&mut world, "Kit", Place::Home, now);
    let crew_id = CrewId::new();
    world.initiatives.crews.push(Crew {
        id: crew_id,
        name: "The Plaza Pigeons".into(),
        motto: "Coo.".into(),
        color: "#123456".into(),
        leader,
        members: vec![
            member(leader, CrewRole::Leader),
            member(present, CrewRole::Member),
            member(away, CrewRole::Member),
        ],
        reputation: 0,
        founded_tick: 0,
        dissolved: false,
    });
    world.initiatives.territories.push(Territory {
        id: TerritoryId::new(),
        crew_id,
        place: Place::Plaza,
        claimed_by: leader,
        claimed_tick: 0,
        expires_tick: 40,
    });
    for id in [leader, present, away] {
        let agent = world.agents.get_mut(&id).unwrap();
        agent.needs.fun = 50.0;
        agent.needs.social = 50.0;
    }

    let mut rng = StdRng::seed_from_u64(6);
    let mut sink = RecordingSink::default();
    initiatives::run_pass(&mut world, &mut rng, pass(3), &mut sink);

    for id in [leader, present] {
        let needs = &world.agent(id).unwrap().needs;
        assert!((needs.fun - 52.0).abs() < 1e-9, "fun = {}", needs.fun);
        assert!((needs.social - 52.0).abs() < 1e-9, "social = {}", needs.social);
    }
    let needs = &world.agent(away).unwrap().needs;
    assert!((needs.fun - 50.0).abs() < 1e-9);
    assert_eq!(world.initiatives.territories.len(), 1);
}

#[test]
fn wealthy_residents_end_up_owning_plots() {
    let start = Utc::now();
    let mut config = quiet_config(7);
    config.initiatives.market.chance = 0.05;
    let mut scheduler = Scheduler::new(config, RecordingSink::default(), start).unwrap();
    let ids: Vec<AgentId> = (0..10).map(|_| AgentId::new()).collect();
    for (n, id) in ids.iter().enumerate() {
        scheduler.register_agent(*id, format!("Owner {n}"), Personality::balanced(), start);
        scheduler.world_mut().agents.get_mut(id).unwrap().balance = 5_000;
    }

    for step in 1..=400_i64 {
        scheduler.tick(start + Duration::seconds(step)).unwrap();
    }

    let world = scheduler.world();
    let mut plots = BTreeSet::new();
    for id in &ids {
        let owned = world.properties.owned_by(*id).expect("every resident bought a plot");
        assert_eq!(owned.owner, Some(*id));
        assert!(plots.insert(owned.plot), "plot {} sold twice", owned.plot);
    }
    let bought = scheduler
        .sink()
        .events
        .iter()
        .filter(|e| matches!(e, townsfolk_types::SimEvent::PropertyBought { .. }))
        .count();
    assert_eq!(bought, 10);
}

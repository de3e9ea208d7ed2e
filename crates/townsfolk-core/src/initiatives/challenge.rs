//! Skill duels with a simcoin wager.
//!
//! A creator issues a pending challenge to a rival or a co-located peer.
//! On any later pass the target either accepts, in which case the duel is
//! resolved on the spot, or declines and the challenge expires.
//!
//! Guards: a global cap on pending challenges, one pending challenge per
//! agent (as creator or target), and a cooldown per ordered pair.

use rand::Rng;
use townsfolk_agents::{AgentError, economy, memory};
use townsfolk_types::{
    AgentId, AgentProfile, Challenge, ChallengeId, ChallengeOutcome, ChallengeStatus, MemoryKind,
    Need, SimEvent, SkillName,
};

use super::{Pass, require_agent, scaled_amount, weighted_index};
use crate::broadcast::EventSink;
use crate::config::ChallengeConfig;
use crate::effects;
use crate::world::World;

/// Whether the agent is party to a pending challenge.
pub fn has_pending(world: &World, agent_id: AgentId) -> bool {
    world
        .initiatives
        .challenges
        .iter()
        .any(|c| c.status == ChallengeStatus::Pending && (c.creator == agent_id || c.target == agent_id))
}

/// Number of pending challenges town-wide.
pub fn pending_count(world: &World) -> usize {
    world
        .initiatives
        .challenges
        .iter()
        .filter(|c| c.status == ChallengeStatus::Pending)
        .count()
}

fn cooled_down(world: &World, creator: AgentId, target: AgentId, tick: u64, cooldown: u64) -> bool {
    world
        .initiatives
        .challenge_cooldowns
        .get(&(creator, target))
        .is_none_or(|last| tick >= last.saturating_add(cooldown))
}

/// Wager for a creator holding `balance`: a random fraction of it, at least
/// the configured minimum, never more than the balance.
pub fn wager_for<R: Rng + ?Sized>(balance: u64, config: &ChallengeConfig, rng: &mut R) -> u64 {
    let low = config.wager_fraction_min.min(config.wager_fraction_max);
    let high = config.wager_fraction_min.max(config.wager_fraction_max);
    let fraction = if high > low {
        rng.random_range(low..high)
    } else {
        low
    };
    scaled_amount(balance, fraction)
        .max(config.min_wager)
        .min(balance)
}

fn pick_skill<R: Rng + ?Sized>(creator: &AgentProfile, rng: &mut R) -> SkillName {
    let weights: Vec<f64> = SkillName::ALL
        .iter()
        .map(|s| f64::from(creator.skill(*s).level))
        .collect();
    weighted_index(&weights, rng)
        .and_then(|i| SkillName::ALL.get(i).copied())
        .unwrap_or(SkillName::Fitness)
}

fn pick_target<R: Rng + ?Sized>(
    world: &World,
    creator: AgentId,
    pass: Pass,
    rng: &mut R,
) -> Option<AgentId> {
    let config = &world.config.initiatives.challenge;
    let eligible = |id: &AgentId| {
        *id != creator
            && world.agents.contains_key(id)
            && !has_pending(world, *id)
            && cooled_down(world, creator, *id, pass.tick, config.pair_cooldown_ticks)
    };

    let rivals: Vec<AgentId> = world
        .relationships
        .rivals_of(creator, &world.config.agents.social)
        .into_iter()
        .filter(eligible)
        .collect();
    if !rivals.is_empty() && rng.random_bool(config.rival_bias) {
        return rivals.get(rng.random_range(0..rivals.len())).copied();
    }

    let place = world.agent(creator)?.location.place()?;
    let peers: Vec<AgentId> = world.agents_at(place).into_iter().filter(eligible).collect();
    if peers.is_empty() {
        return None;
    }
    peers.get(rng.random_range(0..peers.len())).copied()
}

/// Maybe issue a new challenge from `creator`.
pub fn originate<R: Rng + ?Sized>(
    world: &mut World,
    creator: AgentId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.challenge;
    if !rng.random_bool(config.chance) {
        return Ok(());
    }
    let Some(profile) = world.agent(creator) else {
        return Err(AgentError::AgentNotFound(creator));
    };
    if pending_count(world) >= config.max_active
        || has_pending(world, creator)
        || profile.balance < config.min_balance
    {
        return Ok(());
    }
    let Some(target) = pick_target(world, creator, pass, rng) else {
        return Ok(());
    };

    let skill = pick_skill(profile, rng);
    let wager = wager_for(profile.balance, &config, rng);
    let creator_name = profile.name.clone();
    let target_name = world.agent(target).map(|a| a.name.clone()).unwrap_or_default();

    let challenge = Challenge {
        id: ChallengeId::new(),
        creator,
        target,
        skill,
        wager,
        status: ChallengeStatus::Pending,
        created_tick: pass.tick,
        outcome: None,
    };
    sink.emit_event(SimEvent::ChallengeIssued {
        challenge_id: challenge.id,
        creator,
        target,
        skill,
        wager,
    });
    sink.headline(format!(
        "{creator_name} challenges {target_name} to a {} duel for {wager} simcoins!",
        skill.as_str()
    ));
    tracing::info!(challenge_id = %challenge.id, %creator, %target, wager, "challenge issued");

    world
        .initiatives
        .challenge_cooldowns
        .insert((creator, target), pass.tick);
    world.initiatives.challenges.push(challenge);
    Ok(())
}

/// Settle every pending challenge created before this pass.
pub fn resolve_due<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let due: Vec<ChallengeId> = world
        .initiatives
        .challenges
        .iter()
        .filter(|c| c.status == ChallengeStatus::Pending && c.created_tick < pass.tick)
        .map(|c| c.id)
        .collect();

    let mut first_error = None;
    for challenge_id in due {
        if let Err(err) = settle(world, challenge_id, rng, pass, sink) {
            tracing::warn!(%challenge_id, error = %err, "challenge expired after failure");
            set_status(world, challenge_id, ChallengeStatus::Expired, None);
            first_error.get_or_insert(err);
        }
    }
    prune(world);
    first_error.map_or(Ok(()), Err)
}

fn set_status(
    world: &mut World,
    challenge_id: ChallengeId,
    status: ChallengeStatus,
    outcome: Option<ChallengeOutcome>,
) {
    if let Some(c) = world
        .initiatives
        .challenges
        .iter_mut()
        .find(|c| c.id == challenge_id)
    {
        c.status = status;
        c.outcome = outcome;
    }
}

fn settle<R: Rng + ?Sized>(
    world: &mut World,
    challenge_id: ChallengeId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let Some(challenge) = world
        .initiatives
        .challenges
        .iter()
        .find(|c| c.id == challenge_id)
        .cloned()
    else {
        return Ok(());
    };
    require_agent(world, challenge.creator)?;
    require_agent(world, challenge.target)?;
    let config = world.config.initiatives.challenge;

    let accept_chance = world.agent(challenge.target).map_or(0.0, |t| {
        t.personality.agreeableness.mul_add(config.accept_agreeableness, config.accept_base)
    });
    if !rng.random_bool(accept_chance.clamp(0.0, 1.0)) {
        set_status(world, challenge_id, ChallengeStatus::Expired, None);
        sink.emit_event(SimEvent::ChallengeExpired { challenge_id });
        sink.headline(format!(
            "{} turned down a {} challenge.",
            name_of(world, challenge.target),
            challenge.skill.as_str()
        ));
        tracing::debug!(%challenge_id, "challenge declined");
        return Ok(());
    }

    let outcome = duel(world, &challenge, &config, rng, pass, sink)?;
    sink.emit_event(SimEvent::ChallengeResolved {
        challenge_id,
        winner: outcome.winner,
        loser: outcome.loser,
        payout: outcome.payout,
    });
    sink.headline(format!(
        "{} beat {} at {} and took {} simcoins!",
        name_of(world, outcome.winner),
        name_of(world, outcome.loser),
        challenge.skill.as_str(),
        outcome.payout
    ));
    tracing::info!(
        %challenge_id,
        winner = %outcome.winner,
        loser = %outcome.loser,
        payout = outcome.payout,
        "challenge resolved"
    );
    set_status(world, challenge_id, ChallengeStatus::Resolved, Some(outcome));
    Ok(())
}

fn score<R: Rng + ?Sized>(
    agent: &AgentProfile,
    skill: SkillName,
    extraversion_bonus: f64,
    rng: &mut R,
) -> f64 {
    let luck: f64 = rng.random_range(0.5..1.5);
    f64::from(agent.skill(skill).level).mul_add(luck, agent.personality.extraversion * extraversion_bonus)
}

/// Fight it out. Ties go to the target.
fn duel<R: Rng + ?Sized>(
    world: &mut World,
    challenge: &Challenge,
    config: &ChallengeConfig,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<ChallengeOutcome, AgentError> {
    let agents_config = world.config.agents.clone();
    let (creator, target) = world
        .pair_mut(challenge.creator, challenge.target)
        .ok_or(AgentError::AgentNotFound(challenge.target))?;

    let creator_score = score(creator, challenge.skill, config.extraversion_bonus, rng);
    let target_score = score(target, challenge.skill, config.extraversion_bonus, rng);
    let creator_won = creator_score > target_score;
    let (winner, loser, winner_score, loser_score) = if creator_won {
        (creator, target, creator_score, target_score)
    } else {
        (target, creator, target_score, creator_score)
    };

    let payout = economy::transfer_floored(loser, winner, challenge.wager);
    effects::add_clout(winner, config.winner_clout);
    effects::remove_clout(loser, config.loser_clout);
    effects::nudge_needs(winner, &[(Need::Fun, config.winner_fun)], &agents_config, sink);
    effects::nudge_needs(loser, &[(Need::Fun, -config.loser_fun)], &agents_config, sink);
    effects::grant_xp(winner, challenge.skill, config.winner_xp, &agents_config, sink)?;
    effects::grant_xp(loser, challenge.skill, config.loser_xp, &agents_config, sink)?;

    let skill = challenge.skill.as_str();
    let won_line = format!("Beat {} in a {skill} duel", loser.name);
    let lost_line = format!("Lost a {skill} duel to {}", winner.name);
    let (winner_id, loser_id) = (winner.id, loser.id);
    memory::remember(
        winner,
        memory::entry(MemoryKind::Challenge, Some(loser_id), won_line, 0.7, pass.tick),
        &agents_config.memory,
    );
    memory::remember(
        loser,
        memory::entry(MemoryKind::Challenge, Some(winner_id), lost_line, -0.5, pass.tick),
        &agents_config.memory,
    );

    let friendship_cost = if creator_won {
        config.friendship_cost_creator_won
    } else {
        config.friendship_cost_target_won
    };
    world.relationships.update(
        challenge.creator,
        challenge.target,
        -friendship_cost,
        config.rivalry_gain,
        pass.now,
    );

    Ok(ChallengeOutcome {
        winner: winner_id,
        loser: loser_id,
        winner_score,
        loser_score,
        payout,
    })
}

fn name_of(world: &World, agent_id: AgentId) -> String {
    world
        .agent(agent_id)
        .map_or_else(|| agent_id.to_string(), |a| a.name.clone())
}

/// Keep pending challenges plus the most recent settled ones.
fn prune(world: &mut World) {
    let keep = world.config.initiatives.challenge.history;
    let challenges = &mut world.initiatives.challenges;
    let settled = challenges
        .iter()
        .filter(|c| c.status != ChallengeStatus::Pending)
        .count();
    let mut to_drop = settled.saturating_sub(keep);
    challenges.retain(|c| {
        if to_drop > 0 && c.status != ChallengeStatus::Pending {
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

    fn pending(world: &mut World, creator: AgentId, target: AgentId, wager: u64) -> ChallengeId {
        let id = ChallengeId::new();
        world.initiatives.challenges.push(Challenge {
            id,
            creator,
            target,
            skill: SkillName::Logic,
            wager,
            status: ChallengeStatus::Pending,
            created_tick: 1,
            outcome: None,
        });
        id
    }

    #[test]
    fn payout_is_floored_at_the_losers_balance() {
        let mut world = world();
        world.config.initiatives.challenge.accept_base = 1.0;
        let a = add_agent(&mut world, "Ari", Place::Arena);
        let b = add_agent(&mut world, "Bex", Place::Arena);
        // both sides bet 100 but only hold 40
        for id in [a, b] {
            world.agents.get_mut(&id).unwrap().balance = 40;
        }
        let id = pending(&mut world, a, b, 100);
        let mut rng = SmallRng::seed_from_u64(11);
        let mut sink = RecordingSink::default();
        resolve_due(&mut world, &mut rng, pass(2), &mut sink).unwrap();

        let c = world.initiatives.challenges.iter().find(|c| c.id == id).unwrap();
        assert_eq!(c.status, ChallengeStatus::Resolved);
        let outcome = c.outcome.clone().unwrap();
        assert_eq!(outcome.payout, 40);
        assert_eq!(world.agent(outcome.loser).unwrap().balance, 0);
        assert_eq!(world.agent(outcome.winner).unwrap().balance, 80);
        assert!(world.relationships.rivalry(a, b) > 0.0);
        assert!(world.relationships.friendship(a, b) < 0.0);
    }

    #[test]
    fn declined_challenge_expires() {
        let mut world = world();
        world.config.initiatives.challenge.accept_base = 0.0;
        world.config.initiatives.challenge.accept_agreeableness = 0.0;
        let a = add_agent(&mut world, "Ari", Place::Arena);
        let b = add_agent(&mut world, "Bex", Place::Arena);
        let id = pending(&mut world, a, b, 10);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();
        resolve_due(&mut world, &mut rng, pass(2), &mut sink).unwrap();

        let c = world.initiatives.challenges.iter().find(|c| c.id == id).unwrap();
        assert_eq!(c.status, ChallengeStatus::Expired);
        assert!(sink.events.contains(&SimEvent::ChallengeExpired { challenge_id: id }));
    }

    #[test]
    fn same_tick_challenges_wait_for_the_next_pass() {
        let mut world = world();
        let a = add_agent(&mut world, "Ari", Place::Arena);
        let b = add_agent(&mut world, "Bex", Place::Arena);
        pending(&mut world, a, b, 10);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();
        resolve_due(&mut world, &mut rng, pass(1), &mut sink).unwrap();
        assert_eq!(pending_count(&world), 1);
    }

    #[test]
    fn origination_respects_every_guard() {
        let mut world = world();
        world.config.initiatives.challenge.chance = 1.0;
        let ids: Vec<AgentId> = (0..10)
            .map(|n| add_agent(&mut world, &format!("A{n}"), Place::Plaza))
            .collect();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut sink = RecordingSink::default();
        for id in &ids {
            originate(&mut world, *id, &mut rng, pass(1), &mut sink).unwrap();
        }

        assert_eq!(pending_count(&world), 3);
        for id in &ids {
            let involved = world
                .initiatives
                .challenges
                .iter()
                .filter(|c| c.creator == *id || c.target == *id)
                .count();
            assert!(involved <= 1);
        }
        for c in &world.initiatives.challenges {
            let balance = world.agent(c.creator).unwrap().balance;
            assert!(c.wager >= 10 && c.wager <= balance);
        }
    }

    #[test]
    fn pair_cooldown_blocks_repeat_challenges() {
        let mut world = world();
        let a = add_agent(&mut world, "Ari", Place::Gym);
        let b = add_agent(&mut world, "Bex", Place::Gym);
        world.initiatives.challenge_cooldowns.insert((a, b), 5);
        assert!(!cooled_down(&world, a, b, 14, 10));
        assert!(cooled_down(&world, a, b, 15, 10));
        assert!(cooled_down(&world, b, a, 6, 10));
    }

    #[test]
    fn broke_creators_never_issue() {
        let mut world = world();
        world.config.initiatives.challenge.chance = 1.0;
        let a = add_agent(&mut world, "Ari", Place::Gym);
        add_agent(&mut world, "Bex", Place::Gym);
        world.agents.get_mut(&a).unwrap().balance = 5;
        let mut rng = SmallRng::seed_from_u64(2);
        let mut sink = RecordingSink::default();
        originate(&mut world, a, &mut rng, pass(1), &mut sink).unwrap();
        assert_eq!(pending_count(&world), 0);
    }
}

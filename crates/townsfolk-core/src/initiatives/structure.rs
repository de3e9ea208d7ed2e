//! Cosmetic and economic structures built around town.
//!
//! Structures lose health every tick and crumble at zero. While standing
//! they give a small need bonus to everyone present, and vendor stalls pay
//! their owner a capped income per co-located agent.

use rand::Rng;
use townsfolk_agents::{AgentError, economy, memory};
use townsfolk_types::{
    AgentId, MemoryKind, Need, PersonalityTrait, Place, SimEvent, Structure, StructureId,
    StructureKind,
};

use super::{Pass, pick_by_trait, ticks_u32};
use crate::broadcast::EventSink;
use crate::effects;
use crate::world::World;

/// Static description of a structure kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureSpec {
    /// Build cost in simcoins.
    pub cost: u64,
    /// Per-tick bonus to agents present.
    pub effects: &'static [(Need, f64)],
    /// Whether it earns its owner passive income.
    pub earns: bool,
    /// Builders high in this trait favor the kind.
    pub builder_trait: PersonalityTrait,
}

/// Catalog record for a structure kind.
pub const fn lookup(kind: StructureKind) -> StructureSpec {
    match kind {
        StructureKind::Bench => StructureSpec {
            cost: 20,
            effects: &[(Need::Comfort, 1.0)],
            earns: false,
            builder_trait: PersonalityTrait::Agreeableness,
        },
        StructureKind::Mural => StructureSpec {
            cost: 40,
            effects: &[(Need::Fun, 1.0)],
            earns: false,
            builder_trait: PersonalityTrait::Openness,
        },
        StructureKind::Garden => StructureSpec {
            cost: 30,
            effects: &[(Need::Comfort, 1.0)],
            earns: false,
            builder_trait: PersonalityTrait::Neuroticism,
        },
        StructureKind::VendorStall => StructureSpec {
            cost: 60,
            effects: &[],
            earns: true,
            builder_trait: PersonalityTrait::Conscientiousness,
        },
    }
}

/// Maybe build something where `builder` is standing.
pub fn originate<R: Rng + ?Sized>(
    world: &mut World,
    builder: AgentId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.structure;
    if !rng.random_bool(config.chance) {
        return Ok(());
    }
    let agent = world.agent(builder).ok_or(AgentError::AgentNotFound(builder))?;
    let Some(place) = agent.location.place() else {
        return Ok(());
    };
    let structures = &world.initiatives.structures;
    let here = structures.iter().filter(|s| s.place == place).count();
    if structures.len() >= config.max_global || here >= config.max_per_place {
        return Ok(());
    }
    let Some(kind) = pick_by_trait(
        &StructureKind::ALL,
        |k| lookup(k).builder_trait,
        &agent.personality,
        rng,
    ) else {
        return Ok(());
    };
    let record = lookup(kind);
    if agent.balance < record.cost {
        return Ok(());
    }

    let agent = world
        .agents
        .get_mut(&builder)
        .ok_or(AgentError::AgentNotFound(builder))?;
    economy::debit(agent, record.cost)?;
    memory::remember(
        agent,
        memory::entry(
            MemoryKind::Structure,
            None,
            format!("Built a {} at the {}", kind.as_str(), place.as_str()),
            0.6,
            pass.tick,
        ),
        &world.config.agents.memory,
    );
    let name = agent.name.clone();

    let structure = Structure {
        id: StructureId::new(),
        owner: builder,
        kind,
        place,
        health: config.starting_health,
        built_tick: pass.tick,
        income_earned: 0,
    };
    sink.emit_event(SimEvent::StructureBuilt {
        structure_id: structure.id,
        owner: builder,
        kind,
        place,
    });
    sink.headline(format!(
        "{name} built a {} at the {}.",
        kind.as_str(),
        place.as_str()
    ));
    tracing::info!(structure_id = %structure.id, %builder, kind = kind.as_str(), "structure built");
    world.initiatives.structures.push(structure);
    Ok(())
}

/// Bonuses, vendor income, then decay and removal.
pub fn upkeep(world: &mut World, pass: Pass, sink: &mut dyn EventSink) -> Result<(), AgentError> {
    let config = world.config.initiatives.structure;
    let agents_config = world.config.agents.clone();
    let ticks = ticks_u32(pass.elapsed);
    let mut first_error = None;

    let standing: Vec<(StructureId, AgentId, StructureKind, Place)> = world
        .initiatives
        .structures
        .iter()
        .map(|s| (s.id, s.owner, s.kind, s.place))
        .collect();

    for (structure_id, owner, kind, place) in standing {
        let record = lookup(kind);
        let present = world.agents_at(place);

        if !record.effects.is_empty() {
            let scaled: Vec<(Need, f64)> = record
                .effects
                .iter()
                .map(|(need, delta)| (*need, delta * f64::from(ticks)))
                .collect();
            for agent_id in &present {
                if let Some(agent) = world.agents.get_mut(agent_id) {
                    effects::nudge_needs(agent, &scaled, &agents_config, sink);
                }
            }
        }

        if record.earns {
            let customers = present.iter().filter(|id| **id != owner).count();
            let income = u64::try_from(customers)
                .unwrap_or(u64::MAX)
                .saturating_mul(config.vendor_income_per_agent)
                .min(config.vendor_income_cap)
                .saturating_mul(pass.elapsed);
            if income > 0 {
                match world.agents.get_mut(&owner).map(|a| economy::credit(a, income)) {
                    Some(Ok(_)) => {
                        if let Some(s) = structure_mut(world, structure_id) {
                            s.income_earned = s.income_earned.saturating_add(income);
                        }
                    }
                    Some(Err(err)) => {
                        first_error.get_or_insert(err);
                    }
                    None => {}
                }
            }
        }

        if let Some(s) = structure_mut(world, structure_id) {
            s.health = s
                .health
                .saturating_sub(config.decay_per_tick.saturating_mul(ticks));
        }
    }

    let (crumbled, kept): (Vec<Structure>, Vec<Structure>) = world
        .initiatives
        .structures
        .drain(..)
        .partition(|s| s.health == 0);
    world.initiatives.structures = kept;
    for s in crumbled {
        sink.emit_event(SimEvent::StructureDestroyed {
            structure_id: s.id,
            kind: s.kind,
            place: s.place,
        });
        sink.headline(format!(
            "The {} at the {} has crumbled.",
            s.kind.as_str(),
            s.place.as_str()
        ));
        tracing::debug!(structure_id = %s.id, "structure destroyed");
    }
    first_error.map_or(Ok(()), Err)
}

fn structure_mut(world: &mut World, structure_id: StructureId) -> Option<&mut Structure> {
    world
        .initiatives
        .structures
        .iter_mut()
        .find(|s| s.id == structure_id)
}

//! Plot and item trading.
//!
//! An awake agent occasionally visits the market. With money to spare and
//! no plot yet, it buys the dearest plot it can afford while keeping a
//! reserve back. Below the hardship balance it raises cash instead: first
//! by selling its most valuable item, then by selling its plot.

use rand::Rng;
use townsfolk_agents::{AgentError, economy};
use townsfolk_types::{AgentId, ItemKind};

use super::Pass;
use crate::broadcast::EventSink;
use crate::world::World;

/// Maybe buy or sell something for `agent_id`.
pub fn originate<R: Rng + ?Sized>(
    world: &mut World,
    agent_id: AgentId,
    rng: &mut R,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let config = world.config.initiatives.market;
    if !rng.random_bool(config.chance) {
        return Ok(());
    }
    let agent = world.agent(agent_id).ok_or(AgentError::AgentNotFound(agent_id))?;
    if agent.activity.is_sleeping() {
        return Ok(());
    }
    if agent.balance < config.hardship_balance {
        return raise_cash(world, agent_id, pass, sink);
    }
    if world.properties.owned_by(agent_id).is_some() {
        return Ok(());
    }
    let budget = agent.balance.saturating_sub(config.reserve);
    let Some(plot) = world
        .properties
        .available()
        .filter(|p| p.price <= budget)
        .max_by_key(|p| p.price)
        .map(|p| p.plot)
    else {
        return Ok(());
    };
    world.buy_property(agent_id, plot, sink)?;
    tracing::debug!(%agent_id, plot, tick = pass.tick, "plot bought at market");
    Ok(())
}

fn raise_cash(
    world: &mut World,
    agent_id: AgentId,
    pass: Pass,
    sink: &mut dyn EventSink,
) -> Result<(), AgentError> {
    let agent = world.agent(agent_id).ok_or(AgentError::AgentNotFound(agent_id))?;
    let most_valuable: Option<ItemKind> = ItemKind::ALL
        .iter()
        .copied()
        .filter(|item| economy::item_count(agent, *item) > 0)
        .max_by_key(|item| item.price());
    if let Some(item) = most_valuable {
        world.sell_item(agent_id, item, 1, sink)?;
        return Ok(());
    }
    if world.properties.owned_by(agent_id).is_some() {
        let (plot, refund) = world.sell_property(agent_id, sink)?;
        let name = world.agent(agent_id).map(|a| a.name.clone()).unwrap_or_default();
        sink.headline(format!("{name} had to sell plot {plot}."));
        tracing::info!(%agent_id, plot, refund, tick = pass.tick, "plot sold under hardship");
    }
    Ok(())
}

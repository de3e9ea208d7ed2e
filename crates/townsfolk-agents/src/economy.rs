//! Simcoin ledger, item inventory, and property ownership.
//!
//! Balances are unsigned and never go negative: a debit that exceeds the
//! balance fails with [`AgentError::InsufficientBalance`] and leaves the
//! agent untouched. Transfers used by duels and rewards instead floor at the
//! payer's balance and report how much actually moved.
//!
//! Properties are a fixed set of numbered plots. Each plot has at most one
//! owner and each agent owns at most one plot.

use std::collections::BTreeMap;

use townsfolk_types::{AgentId, AgentProfile, ItemKind, Property};

use crate::config::EconomyConfig;
use crate::error::AgentError;

// ---------------------------------------------------------------------------
// Balance
// ---------------------------------------------------------------------------

/// Add simcoins to an agent's balance.
pub fn credit(agent: &mut AgentProfile, amount: u64) -> Result<u64, AgentError> {
    agent.balance = agent
        .balance
        .checked_add(amount)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: format!("credit {amount} to {}", agent.id),
        })?;
    Ok(agent.balance)
}

/// Remove simcoins from an agent's balance, failing if it would go negative.
pub fn debit(agent: &mut AgentProfile, amount: u64) -> Result<u64, AgentError> {
    if agent.balance < amount {
        return Err(AgentError::InsufficientBalance {
            needed: amount,
            available: agent.balance,
        });
    }
    agent.balance = agent.balance.saturating_sub(amount);
    Ok(agent.balance)
}

/// Apply a signed delta, flooring at zero. Returns the delta actually applied.
pub fn apply_currency_delta(agent: &mut AgentProfile, delta: i64) -> i64 {
    if delta >= 0 {
        let before = agent.balance;
        agent.balance = agent.balance.saturating_add(delta.unsigned_abs());
        i64::try_from(agent.balance.saturating_sub(before)).unwrap_or(i64::MAX)
    } else {
        let taken = delta.unsigned_abs().min(agent.balance);
        agent.balance = agent.balance.saturating_sub(taken);
        i64::try_from(taken).map_or(i64::MIN, i64::saturating_neg)
    }
}

/// Move up to `amount` from `payer` to `payee`, floored at the payer's balance.
///
/// Returns the simcoins that actually moved.
pub fn transfer_floored(payer: &mut AgentProfile, payee: &mut AgentProfile, amount: u64) -> u64 {
    let moved = amount.min(payer.balance);
    payer.balance = payer.balance.saturating_sub(moved);
    payee.balance = payee.balance.saturating_add(moved);
    moved
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// How many of `item` the agent holds.
pub fn item_count(agent: &AgentProfile, item: ItemKind) -> u32 {
    agent.inventory.get(&item).copied().unwrap_or(0)
}

/// Add items to an agent's inventory without charging for them.
pub fn add_items(agent: &mut AgentProfile, item: ItemKind, quantity: u32) -> Result<(), AgentError> {
    let entry = agent.inventory.entry(item).or_insert(0);
    *entry = entry
        .checked_add(quantity)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: format!("inventory count for {}", item.as_str()),
        })?;
    Ok(())
}

/// Remove items, dropping the key when the count reaches zero.
pub fn remove_items(
    agent: &mut AgentProfile,
    item: ItemKind,
    quantity: u32,
) -> Result<(), AgentError> {
    let current = item_count(agent, item);
    if current < quantity {
        return Err(AgentError::InsufficientItems {
            item,
            requested: quantity,
            available: current,
        });
    }
    let remaining = current.saturating_sub(quantity);
    if remaining == 0 {
        agent.inventory.remove(&item);
    } else {
        agent.inventory.insert(item, remaining);
    }
    Ok(())
}

/// Buy `quantity` of `item` at catalog price.
///
/// Returns the total cost. Nothing changes if the agent cannot afford it.
pub fn buy_item(agent: &mut AgentProfile, item: ItemKind, quantity: u32) -> Result<u64, AgentError> {
    let cost = item
        .price()
        .checked_mul(u64::from(quantity))
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: format!("price of {quantity} {}", item.as_str()),
        })?;
    debit(agent, cost)?;
    if let Err(err) = add_items(agent, item, quantity) {
        agent.balance = agent.balance.saturating_add(cost);
        return Err(err);
    }
    Ok(cost)
}

/// Sell `quantity` of `item` back at the configured resale percentage.
///
/// Returns the refund.
pub fn sell_item(
    agent: &mut AgentProfile,
    item: ItemKind,
    quantity: u32,
    config: &EconomyConfig,
) -> Result<u64, AgentError> {
    remove_items(agent, item, quantity)?;
    let refund = item
        .price()
        .saturating_mul(u64::from(quantity))
        .saturating_mul(config.item_resale_pct)
        / 100;
    credit(agent, refund)?;
    Ok(refund)
}

/// The most expensive item the agent can afford, if any.
pub fn best_affordable_item(balance: u64) -> Option<ItemKind> {
    ItemKind::ALL
        .iter()
        .copied()
        .filter(|item| item.price() <= balance)
        .max_by_key(|item| item.price())
}

// ---------------------------------------------------------------------------
// Property registry
// ---------------------------------------------------------------------------

/// Every plot in town and who owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRegistry {
    plots: BTreeMap<u32, Property>,
    owners: BTreeMap<AgentId, u32>,
}

impl PropertyRegistry {
    /// Lay out `plot_count` plots priced `base + step * index`.
    pub fn new(config: &EconomyConfig) -> Self {
        let plots = (1..=config.plot_count)
            .map(|plot| {
                let index = u64::from(plot.saturating_sub(1));
                let price = config
                    .plot_base_price
                    .saturating_add(config.plot_price_step.saturating_mul(index));
                (
                    plot,
                    Property {
                        plot,
                        price,
                        owner: None,
                    },
                )
            })
            .collect();
        Self {
            plots,
            owners: BTreeMap::new(),
        }
    }

    /// Look up a plot.
    pub fn get(&self, plot: u32) -> Option<&Property> {
        self.plots.get(&plot)
    }

    /// The plot an agent owns, if any.
    pub fn owned_by(&self, agent_id: AgentId) -> Option<&Property> {
        self.owners.get(&agent_id).and_then(|plot| self.plots.get(plot))
    }

    /// Plots nobody owns, cheapest first.
    pub fn available(&self) -> impl Iterator<Item = &Property> {
        self.plots.values().filter(|p| p.owner.is_none())
    }

    /// Every plot in plot order.
    pub fn all(&self) -> impl Iterator<Item = &Property> {
        self.plots.values()
    }

    /// Buy a plot, debiting its price.
    pub fn buy(&mut self, agent: &mut AgentProfile, plot: u32) -> Result<u64, AgentError> {
        if let Some(owned) = self.owners.get(&agent.id) {
            return Err(AgentError::AlreadyOwnsProperty {
                agent_id: agent.id,
                plot: *owned,
            });
        }
        let property = self.plots.get_mut(&plot).ok_or(AgentError::PlotNotFound(plot))?;
        if let Some(owner) = property.owner {
            return Err(AgentError::PlotTaken { plot, owner });
        }
        debit(agent, property.price)?;
        property.owner = Some(agent.id);
        self.owners.insert(agent.id, plot);
        tracing::info!(agent_id = %agent.id, plot, price = property.price, "property bought");
        Ok(property.price)
    }

    /// Sell the agent's plot back to town for the configured percentage.
    pub fn sell(&mut self, agent: &mut AgentProfile, config: &EconomyConfig) -> Result<u64, AgentError> {
        let plot = self
            .owners
            .get(&agent.id)
            .copied()
            .ok_or(AgentError::NoPropertyOwned(agent.id))?;
        let property = self.plots.get_mut(&plot).ok_or(AgentError::PlotNotFound(plot))?;
        let refund = property.price.saturating_mul(config.property_resale_pct) / 100;
        credit(agent, refund)?;
        property.owner = None;
        self.owners.remove(&agent.id);
        tracing::info!(agent_id = %agent.id, plot, refund, "property sold");
        Ok(refund)
    }
}

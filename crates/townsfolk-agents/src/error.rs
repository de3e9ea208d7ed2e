//! Error types for the townsfolk-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Most of these are "not found" or "insufficient resource" conditions: the
//! caller aborts only the sub-operation that raised them.

use townsfolk_types::{AgentId, ItemKind};

/// Errors that can occur during agent state operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AgentError {
    /// Agent with the given ID is not registered.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A debit exceeded the agent's balance.
    #[error("insufficient balance: needed {needed} simcoins but only have {available}")]
    InsufficientBalance {
        /// Simcoins the operation required.
        needed: u64,
        /// Simcoins the agent holds.
        available: u64,
    },

    /// Attempted to remove more of an item than the agent holds.
    #[error("insufficient items: wanted {requested} of {item:?} but only have {available}")]
    InsufficientItems {
        /// The item being removed.
        item: ItemKind,
        /// Quantity requested.
        requested: u32,
        /// Quantity held.
        available: u32,
    },

    /// No plot with the given number exists.
    #[error("plot not found: {0}")]
    PlotNotFound(u32),

    /// The plot already belongs to someone.
    #[error("plot {plot} is already owned by {owner}")]
    PlotTaken {
        /// Plot number.
        plot: u32,
        /// Current owner.
        owner: AgentId,
    },

    /// The agent already owns a property.
    #[error("agent {agent_id} already owns plot {plot}")]
    AlreadyOwnsProperty {
        /// The agent.
        agent_id: AgentId,
        /// The plot they own.
        plot: u32,
    },

    /// The agent does not own any property.
    #[error("agent {0} owns no property")]
    NoPropertyOwned(AgentId),

    /// An arithmetic overflow occurred in a ledger computation.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

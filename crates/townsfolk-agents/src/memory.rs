//! Bounded per-agent memory.
//!
//! Memories are appended by any subsystem and stored oldest first on the
//! agent profile. When the buffer is full the oldest entry is evicted.
//! Memories color thought text and tilt which goals an agent sets for
//! itself.

use townsfolk_types::{AgentId, AgentProfile, MemoryEntry, MemoryKind};

use crate::config::MemoryConfig;

/// Build a memory entry, clamping sentiment into `[-1, 1]`.
pub fn entry(
    kind: MemoryKind,
    related_agent: Option<AgentId>,
    description: impl Into<String>,
    sentiment: f64,
    tick: u64,
) -> MemoryEntry {
    let sentiment = if sentiment.is_nan() {
        0.0
    } else {
        sentiment.clamp(-1.0, 1.0)
    };
    MemoryEntry {
        kind,
        related_agent,
        description: description.into(),
        sentiment,
        tick,
    }
}

/// Append a memory, evicting the oldest entries beyond capacity.
pub fn remember(agent: &mut AgentProfile, memory: MemoryEntry, config: &MemoryConfig) {
    agent.memories.push(memory);
    let capacity = config.capacity.max(1);
    if agent.memories.len() > capacity {
        let overflow = agent.memories.len().saturating_sub(capacity);
        agent.memories.drain(..overflow);
    }
}

/// The most recent memory, if any.
pub fn latest(agent: &AgentProfile) -> Option<&MemoryEntry> {
    agent.memories.last()
}

/// The most recent memory of a given kind.
pub fn latest_of(agent: &AgentProfile, kind: MemoryKind) -> Option<&MemoryEntry> {
    agent.memories.iter().rev().find(|m| m.kind == kind)
}

/// Mean sentiment across the buffer, 0 when empty.
pub fn mean_sentiment(agent: &AgentProfile) -> f64 {
    if agent.memories.is_empty() {
        return 0.0;
    }
    let total: f64 = agent.memories.iter().map(|m| m.sentiment).sum();
    #[allow(clippy::cast_precision_loss)]
    let count = agent.memories.len() as f64;
    total / count
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use townsfolk_types::Personality;

    use super::*;
    use crate::agent::new_profile;
    use crate::config::AgentsConfig;

    fn blank() -> AgentProfile {
        new_profile(
            AgentId::new(),
            String::from("Juno"),
            Personality::balanced(),
            Utc::now(),
            &AgentsConfig::default(),
        )
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let config = MemoryConfig::default();
        let mut agent = blank();
        for tick in 0..20 {
            remember(
                &mut agent,
                entry(MemoryKind::Conversation, None, format!("chat {tick}"), 0.2, tick),
                &config,
            );
        }
        assert_eq!(agent.memories.len(), 15);
        assert_eq!(agent.memories.first().unwrap().tick, 5);
        assert_eq!(latest(&agent).unwrap().tick, 19);
    }

    #[test]
    fn sentiment_is_clamped() {
        let high = entry(MemoryKind::Reward, None, "jackpot", 4.0, 1);
        let low = entry(MemoryKind::Incident, None, "disaster", -9.0, 1);
        assert!((high.sentiment - 1.0).abs() < f64::EPSILON);
        assert!((low.sentiment + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn latest_of_kind_and_mean() {
        let config = MemoryConfig::default();
        let mut agent = blank();
        remember(&mut agent, entry(MemoryKind::Challenge, None, "lost a duel", -0.6, 1), &config);
        remember(&mut agent, entry(MemoryKind::Conversation, None, "nice chat", 0.4, 2), &config);
        assert_eq!(latest_of(&agent, MemoryKind::Challenge).unwrap().tick, 1);
        assert!((mean_sentiment(&agent) + 0.1).abs() < 1e-9);
        assert!(latest_of(&agent, MemoryKind::Crew).is_none());
    }
}

//! Symmetric relationship ledger between pairs of agents.
//!
//! Each unordered pair is stored once under the canonical key
//! `(min(a, b), max(a, b))`, so `update(a, b, ..)` and `get(b, a)` always
//! see the same row. Friendship is signed in `[-100, 100]`; rivalry is
//! unsigned in `[0, 100]`. Both are clamped on every update.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use townsfolk_types::{AgentId, Relationship};

use crate::config::SocialConfig;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum friendship (open hostility).
pub const FRIENDSHIP_MIN: f64 = -100.0;

/// Maximum friendship.
pub const FRIENDSHIP_MAX: f64 = 100.0;

/// Minimum rivalry.
pub const RIVALRY_MIN: f64 = 0.0;

/// Maximum rivalry.
pub const RIVALRY_MAX: f64 = 100.0;

/// Order a pair so the smaller id comes first.
pub fn canonical_pair(a: AgentId, b: AgentId) -> (AgentId, AgentId) {
    if a <= b { (a, b) } else { (b, a) }
}

const fn clamp_or_zero(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(min, max)
}

// ---------------------------------------------------------------------------
// RelationshipGraph
// ---------------------------------------------------------------------------

/// All relationship rows in town, keyed by canonical pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipGraph {
    rows: BTreeMap<(AgentId, AgentId), Relationship>,
}

impl RelationshipGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Record an interaction between `a` and `b`.
    ///
    /// Creates the row on first contact. Deltas are added and clamped, the
    /// interaction counter increments and the timestamp is refreshed.
    /// Self-interactions are ignored and return `None`.
    pub fn update(
        &mut self,
        a: AgentId,
        b: AgentId,
        friendship_delta: f64,
        rivalry_delta: f64,
        now: DateTime<Utc>,
    ) -> Option<&Relationship> {
        if a == b {
            return None;
        }
        let key = canonical_pair(a, b);
        let row = self.rows.entry(key).or_insert_with(|| Relationship {
            agent_a: key.0,
            agent_b: key.1,
            friendship: 0.0,
            rivalry: 0.0,
            interactions: 0,
            last_interaction: now,
        });
        row.friendship = clamp_or_zero(
            row.friendship + friendship_delta,
            FRIENDSHIP_MIN,
            FRIENDSHIP_MAX,
        );
        row.rivalry = clamp_or_zero(row.rivalry + rivalry_delta, RIVALRY_MIN, RIVALRY_MAX);
        row.interactions = row.interactions.saturating_add(1);
        row.last_interaction = now;
        Some(row)
    }

    /// The row for a pair, in either order.
    pub fn get(&self, a: AgentId, b: AgentId) -> Option<&Relationship> {
        self.rows.get(&canonical_pair(a, b))
    }

    /// Friendship between two agents, 0 if they never met.
    pub fn friendship(&self, a: AgentId, b: AgentId) -> f64 {
        self.get(a, b).map_or(0.0, |r| r.friendship)
    }

    /// Rivalry between two agents, 0 if they never met.
    pub fn rivalry(&self, a: AgentId, b: AgentId) -> f64 {
        self.get(a, b).map_or(0.0, |r| r.rivalry)
    }

    /// Agents whose friendship with `agent` reaches the friend threshold.
    pub fn friends_of(&self, agent: AgentId, config: &SocialConfig) -> Vec<AgentId> {
        self.partners_where(agent, |r| r.friendship >= config.friend_threshold)
    }

    /// Agents whose rivalry with `agent` reaches the rival threshold.
    pub fn rivals_of(&self, agent: AgentId, config: &SocialConfig) -> Vec<AgentId> {
        self.partners_where(agent, |r| r.rivalry >= config.rival_threshold)
    }

    fn partners_where(
        &self,
        agent: AgentId,
        predicate: impl Fn(&Relationship) -> bool,
    ) -> Vec<AgentId> {
        self.rows
            .values()
            .filter(|r| r.agent_a == agent || r.agent_b == agent)
            .filter(|r| predicate(r))
            .map(|r| if r.agent_a == agent { r.agent_b } else { r.agent_a })
            .collect()
    }

    /// Every row, in canonical key order.
    pub fn rows(&self) -> impl Iterator<Item = &Relationship> {
        self.rows.values()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no relationship has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pair() -> (AgentId, AgentId) {
        let a = AgentId::new();
        let b = AgentId::new();
        canonical_pair(a, b)
    }

    #[test]
    fn update_is_symmetric() {
        let (a, b) = pair();
        let mut graph = RelationshipGraph::new();
        graph.update(b, a, 12.0, 4.0, Utc::now());
        let forward = graph.get(a, b).cloned().unwrap();
        let backward = graph.get(b, a).cloned().unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.agent_a, a);
        assert!((graph.friendship(b, a) - 12.0).abs() < f64::EPSILON);
        assert!((graph.rivalry(a, b) - 4.0).abs() < f64::EPSILON);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn values_clamp_and_count_interactions() {
        let (a, b) = pair();
        let mut graph = RelationshipGraph::new();
        for _ in 0..30 {
            graph.update(a, b, -10.0, 10.0, Utc::now());
        }
        let row = graph.get(a, b).unwrap();
        assert!((row.friendship - FRIENDSHIP_MIN).abs() < f64::EPSILON);
        assert!((row.rivalry - RIVALRY_MAX).abs() < f64::EPSILON);
        assert_eq!(row.interactions, 30);

        graph.update(a, b, 0.0, -500.0, Utc::now());
        assert!(graph.rivalry(a, b).abs() < f64::EPSILON);
    }

    #[test]
    fn self_interaction_ignored() {
        let a = AgentId::new();
        let mut graph = RelationshipGraph::new();
        assert!(graph.update(a, a, 5.0, 0.0, Utc::now()).is_none());
        assert!(graph.is_empty());
    }

    #[test]
    fn friend_and_rival_queries_use_thresholds() {
        let config = SocialConfig::default();
        let me = AgentId::new();
        let pal = AgentId::new();
        let foe = AgentId::new();
        let stranger = AgentId::new();
        let mut graph = RelationshipGraph::new();
        graph.update(me, pal, 35.0, 0.0, Utc::now());
        graph.update(foe, me, -5.0, 40.0, Utc::now());
        graph.update(me, stranger, 10.0, 5.0, Utc::now());

        assert_eq!(graph.friends_of(me, &config), vec![pal]);
        assert_eq!(graph.rivals_of(me, &config), vec![foe]);
        assert_eq!(graph.friends_of(pal, &config), vec![me]);
    }
}

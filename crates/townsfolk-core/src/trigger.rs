//! Inbound reward triggers from the scoring collaborator.
//!
//! A trigger names one agent and any mix of need deltas, skill XP and a
//! simcoin delta. Payloads are decoded from JSON and validated before they
//! touch the world; a malformed payload is rejected with no state change.
//! A valid one is applied to a scratch copy of the profile and committed
//! only when every step succeeded, so a trigger lands whole or not at all.

use std::collections::BTreeMap;

use serde::Deserialize;
use townsfolk_agents::{AgentError, economy, memory};
use townsfolk_types::{AgentId, MemoryKind, Need, SimEvent, SkillName};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::broadcast::{EventSink, RecordingSink};
use crate::effects;
use crate::world::World;

/// Largest single need change a trigger may carry.
pub const MAX_NEED_DELTA: f64 = 100.0;

/// Largest XP grant per skill per trigger.
pub const MAX_SKILL_XP: u32 = 10_000;

/// Errors from decoding or applying a trigger.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// The payload is not valid JSON for a trigger.
    #[error("malformed trigger payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but failed validation.
    #[error("invalid trigger: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Applying the trigger failed.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// One reward for one agent.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_deltas"))]
pub struct RewardTrigger {
    /// Agent being rewarded.
    pub agent_id: AgentId,

    /// Additive need changes, clamped on application.
    #[serde(default)]
    pub need_deltas: BTreeMap<Need, f64>,

    /// Raw XP per skill, mood-scaled on application.
    #[serde(default, rename = "skillXPDeltas", alias = "skillXpDeltas")]
    pub skill_xp_deltas: BTreeMap<SkillName, u32>,

    /// Simcoin change; a debit larger than the balance floors at zero.
    #[serde(default)]
    #[validate(range(min = -1_000_000, max = 1_000_000))]
    pub currency_delta: Option<i64>,
}

fn validate_deltas(trigger: &RewardTrigger) -> Result<(), ValidationError> {
    if trigger.need_deltas.is_empty()
        && trigger.skill_xp_deltas.is_empty()
        && trigger.currency_delta.is_none()
    {
        return Err(ValidationError::new("empty_trigger"));
    }
    if trigger
        .need_deltas
        .values()
        .any(|d| !d.is_finite() || d.abs() > MAX_NEED_DELTA)
    {
        return Err(ValidationError::new("need_delta_out_of_range"));
    }
    if trigger.skill_xp_deltas.values().any(|xp| *xp > MAX_SKILL_XP) {
        return Err(ValidationError::new("skill_xp_out_of_range"));
    }
    Ok(())
}

/// Decode and validate a JSON trigger payload.
pub fn decode(json: &str) -> Result<RewardTrigger, TriggerError> {
    let trigger: RewardTrigger = serde_json::from_str(json)?;
    trigger.validate()?;
    Ok(trigger)
}

/// What a committed trigger changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardOutcome {
    /// Simcoin change actually applied.
    pub currency_delta: i64,
    /// Skills that gained at least one level.
    pub leveled: Vec<SkillName>,
}

impl World {
    /// Validate and apply a reward trigger atomically.
    ///
    /// Emits [`SimEvent::RewardApplied`], plus mood and level-up events for
    /// whatever the reward changed.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::Invalid`] for a payload that fails
    /// validation and [`TriggerError::Agent`] for an unknown agent or a
    /// ledger overflow. The world is unchanged in every error case.
    pub fn apply_trigger(
        &mut self,
        trigger: &RewardTrigger,
        sink: &mut dyn EventSink,
    ) -> Result<RewardOutcome, TriggerError> {
        trigger.validate()?;
        let agent_id = trigger.agent_id;
        let mut scratch = self
            .agent(agent_id)
            .cloned()
            .ok_or(AgentError::AgentNotFound(agent_id))?;
        let mut pending = RecordingSink::default();

        let needs: Vec<(Need, f64)> = trigger.need_deltas.iter().map(|(n, d)| (*n, *d)).collect();
        if !needs.is_empty() {
            effects::nudge_needs(&mut scratch, &needs, &self.config.agents, &mut pending);
        }

        let mut leveled = Vec::new();
        for (skill, xp) in &trigger.skill_xp_deltas {
            let gain = effects::grant_xp(&mut scratch, *skill, *xp, &self.config.agents, &mut pending)?;
            if gain.leveled_up() {
                leveled.push(*skill);
            }
        }

        let currency_delta = trigger
            .currency_delta
            .map_or(0, |delta| economy::apply_currency_delta(&mut scratch, delta));

        memory::remember(
            &mut scratch,
            memory::entry(
                MemoryKind::Reward,
                None,
                "Got a reward from outside town",
                0.8,
                self.tick(),
            ),
            &self.config.agents.memory,
        );

        self.agents.insert(agent_id, scratch);
        pending.forward_to(sink);
        sink.emit_event(SimEvent::RewardApplied {
            agent_id,
            currency_delta,
            needs: needs.iter().map(|(n, _)| *n).collect(),
            skills: trigger.skill_xp_deltas.keys().copied().collect(),
        });
        tracing::info!(%agent_id, currency_delta, leveled = leveled.len(), "reward applied");
        Ok(RewardOutcome {
            currency_delta,
            leveled,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use townsfolk_types::Personality;

    use super::*;
    use crate::config::SimulationConfig;

    fn world_with(id: AgentId) -> World {
        let mut world = World::new(SimulationConfig::default(), Utc::now()).unwrap();
        world.register_agent(id, "Rae".into(), Personality::balanced(), Utc::now());
        world
    }

    #[test]
    fn decode_reads_the_collaborator_shape() {
        let id = AgentId::new();
        let json = format!(
            r#"{{"agentId":"{id}","needDeltas":{{"fun":10.0}},"skillXPDeltas":{{"logic":50}},"currencyDelta":-5}}"#
        );
        let trigger = decode(&json).unwrap();
        assert_eq!(trigger.agent_id, id);
        assert!(trigger.need_deltas.get(&Need::Fun).is_some_and(|d| (d - 10.0).abs() < f64::EPSILON));
        assert_eq!(trigger.skill_xp_deltas.get(&SkillName::Logic).copied(), Some(50));
        assert_eq!(trigger.currency_delta, Some(-5));
    }

    #[test]
    fn decode_rejects_bad_payloads() {
        let id = AgentId::new();
        assert!(matches!(decode("{not json"), Err(TriggerError::Json(_))));
        let empty = format!(r#"{{"agentId":"{id}"}}"#);
        assert!(matches!(decode(&empty), Err(TriggerError::Invalid(_))));
        let huge = format!(r#"{{"agentId":"{id}","needDeltas":{{"fun":500.0}}}}"#);
        assert!(matches!(decode(&huge), Err(TriggerError::Invalid(_))));
        let rich = format!(r#"{{"agentId":"{id}","currencyDelta":5000000}}"#);
        assert!(matches!(decode(&rich), Err(TriggerError::Invalid(_))));
    }

    #[test]
    fn apply_commits_everything_and_reports() {
        let id = AgentId::new();
        let mut world = world_with(id);
        let trigger = RewardTrigger {
            agent_id: id,
            need_deltas: BTreeMap::from([(Need::Fun, 50.0)]),
            skill_xp_deltas: BTreeMap::from([(SkillName::Logic, 150)]),
            currency_delta: Some(-500),
        };
        let mut sink = RecordingSink::default();
        let outcome = world.apply_trigger(&trigger, &mut sink).unwrap();

        let agent = world.agent(id).unwrap();
        assert!((agent.needs.fun - 100.0).abs() < f64::EPSILON);
        assert_eq!(agent.balance, 0);
        assert_eq!(outcome.currency_delta, -100);
        assert_eq!(agent.skill(SkillName::Logic).level, 2);
        assert_eq!(outcome.leveled, vec![SkillName::Logic]);
        assert!(sink.events.iter().any(|e| matches!(
            e,
            SimEvent::SkillLevelUp { skill: SkillName::Logic, level: 2, .. }
        )));
        assert!(matches!(
            sink.events.last(),
            Some(SimEvent::RewardApplied { currency_delta: -100, .. })
        ));
    }

    #[test]
    fn unknown_agent_changes_nothing() {
        let mut world = world_with(AgentId::new());
        let before = world.agents.clone();
        let trigger = RewardTrigger {
            agent_id: AgentId::new(),
            need_deltas: BTreeMap::new(),
            skill_xp_deltas: BTreeMap::new(),
            currency_delta: Some(10),
        };
        let mut sink = RecordingSink::default();
        let result = world.apply_trigger(&trigger, &mut sink);
        assert!(matches!(
            result,
            Err(TriggerError::Agent(AgentError::AgentNotFound(_)))
        ));
        assert_eq!(world.agents, before);
        assert!(sink.events.is_empty());
    }
}

//! Shared mutation helpers that report what they changed.
//!
//! Every subsystem that touches needs or skills goes through these so mood
//! changes and level-ups are always announced on the sink.

use townsfolk_agents::{AgentError, AgentsConfig, MoodShift, XpGain, needs, skills};
use townsfolk_types::{AgentProfile, Need, SimEvent, SkillName};

use crate::broadcast::EventSink;

/// Emit a mood-changed event when the shift changed category.
pub fn report_mood(agent: &AgentProfile, shift: MoodShift, sink: &mut dyn EventSink) {
    if shift.changed() {
        sink.emit_event(SimEvent::MoodChanged {
            agent_id: agent.id,
            mood: shift.after,
        });
    }
}

/// Apply bounded need changes and announce a mood change.
pub fn nudge_needs(
    agent: &mut AgentProfile,
    effects: &[(Need, f64)],
    config: &AgentsConfig,
    sink: &mut dyn EventSink,
) -> MoodShift {
    let shift = needs::apply_need_effects(agent, effects, &config.needs);
    report_mood(agent, shift, sink);
    shift
}

/// Award mood-scaled XP and announce any level-up.
///
/// The scaled XP also counts toward the agent's lifetime points.
///
/// # Errors
///
/// Returns [`AgentError::ArithmeticOverflow`] if the XP counter overflows.
pub fn grant_xp(
    agent: &mut AgentProfile,
    skill: SkillName,
    amount: u32,
    config: &AgentsConfig,
    sink: &mut dyn EventSink,
) -> Result<XpGain, AgentError> {
    let gain = skills::award_xp(agent, skill, amount, &config.skills)?;
    agent.points = agent.points.saturating_add(u64::from(gain.scaled));
    if gain.leveled_up() {
        sink.emit_event(SimEvent::SkillLevelUp {
            agent_id: agent.id,
            skill,
            level: gain.to_level,
        });
    }
    Ok(gain)
}

/// Raise clout, capped at 100.
pub fn add_clout(agent: &mut AgentProfile, amount: u32) {
    agent.clout = agent.clout.saturating_add(amount).min(100);
}

/// Lower clout, floored at 0.
pub const fn remove_clout(agent: &mut AgentProfile, amount: u32) {
    agent.clout = agent.clout.saturating_sub(amount);
}

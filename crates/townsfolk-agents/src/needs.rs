//! Need decay and mood derivation.
//!
//! Each elapsed tick, every need decays by
//! `base_rate * trait_modifier * elapsed_ticks` and is clamped to
//! `[0, 100]`. The trait modifier multiplies `0.5 + trait_value` over every
//! configured `(trait, need)` pair; needs without a pair use 1.0.
//!
//! Mood is a pure function of the six needs: the first row of the mood table
//! whose `min_mean` is at or below the mean of the needs. It is recomputed
//! after every mutation so it is never stale.
//!
//! Because decay only ever lowers a need and the floor clamp is monotone,
//! applying N elapsed ticks at once yields the same result as N single-tick
//! applications.

use townsfolk_types::{AgentProfile, Mood, Need, Needs, Personality};

use crate::config::{MoodThreshold, NeedsConfig};

/// Lower bound of every need.
pub const NEED_MIN: f64 = 0.0;

/// Upper bound of every need.
pub const NEED_MAX: f64 = 100.0;

/// Result of applying a bundle of need effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodShift {
    /// Mood before the mutation.
    pub before: Mood,
    /// Mood after the mutation.
    pub after: Mood,
}

impl MoodShift {
    /// Whether the mood category changed.
    pub fn changed(self) -> bool {
        self.before != self.after
    }
}

/// Clamp a need value into `[0, 100]`, mapping NaN to 0.
pub const fn clamp_need(value: f64) -> f64 {
    if value.is_nan() {
        return NEED_MIN;
    }
    value.clamp(NEED_MIN, NEED_MAX)
}

/// Multiplier applied to a need's decay rate for the given personality.
pub fn trait_modifier(need: Need, personality: &Personality, config: &NeedsConfig) -> f64 {
    config
        .trait_modifiers
        .iter()
        .filter(|m| m.need == need)
        .map(|m| 0.5 + personality.get(m.personality_trait).clamp(0.0, 1.0))
        .product()
}

/// Apply `elapsed_ticks` of decay to a set of needs.
///
/// Negative configured rates are treated as zero so decay never raises a need.
pub fn apply_decay(
    needs: &mut Needs,
    personality: &Personality,
    config: &NeedsConfig,
    elapsed_ticks: u64,
) {
    if elapsed_ticks == 0 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let ticks = elapsed_ticks as f64;
    for need in Need::ALL {
        let base = config.decay_rates.get(&need).copied().unwrap_or(0.0).max(0.0);
        let drop = base * trait_modifier(need, personality, config) * ticks;
        let slot = needs.get_mut(need);
        *slot = clamp_need(*slot - drop);
    }
}

/// Derive the mood for a set of needs.
///
/// `thresholds` must be sorted by descending `min_mean`; anything below the
/// last row is [`Mood::Miserable`].
pub fn derive_mood(needs: &Needs, thresholds: &[MoodThreshold]) -> Mood {
    let mean = needs.mean();
    thresholds
        .iter()
        .find(|t| mean >= t.min_mean)
        .map_or(Mood::Miserable, |t| t.mood)
}

/// Decay an agent's needs for `elapsed_ticks` and re-derive its mood.
pub fn decay_agent(agent: &mut AgentProfile, config: &NeedsConfig, elapsed_ticks: u64) -> MoodShift {
    let before = agent.mood;
    apply_decay(&mut agent.needs, &agent.personality, config, elapsed_ticks);
    agent.mood = derive_mood(&agent.needs, &config.mood_thresholds);
    MoodShift {
        before,
        after: agent.mood,
    }
}

/// Apply bounded additive need changes and re-derive mood synchronously.
pub fn apply_need_effects(
    agent: &mut AgentProfile,
    effects: &[(Need, f64)],
    config: &NeedsConfig,
) -> MoodShift {
    let before = agent.mood;
    for (need, delta) in effects {
        let slot = agent.needs.get_mut(*need);
        *slot = clamp_need(*slot + delta);
    }
    agent.mood = derive_mood(&agent.needs, &config.mood_thresholds);
    MoodShift {
        before,
        after: agent.mood,
    }
}

/// The single lowest need strictly below `threshold`, if any.
///
/// Ties go to the need listed first in [`Need::ALL`] (energy, hunger,
/// hygiene, social, fun, comfort).
pub fn critical_need(needs: &Needs, threshold: f64) -> Option<Need> {
    let mut lowest: Option<(Need, f64)> = None;
    for need in Need::ALL {
        let value = needs.get(need);
        if value >= threshold {
            continue;
        }
        match lowest {
            Some((_, best)) if value >= best => {}
            _ => lowest = Some((need, value)),
        }
    }
    lowest.map(|(need, _)| need)
}

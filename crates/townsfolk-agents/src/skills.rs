//! Skill progression: mood-scaled XP gains against a fixed level curve.
//!
//! Every `(agent, skill)` pair carries a level in `1..=10` and the XP
//! accumulated toward the next level. Gains are first scaled by the agent's
//! mood multiplier, then added; while the accumulated XP reaches the current
//! level's threshold, the threshold is consumed and the level increments.
//! A single large gain can therefore cross several levels.
//!
//! # Level cap
//!
//! At [`MAX_SKILL_LEVEL`] the XP counter is pinned to 0 and surplus XP is
//! discarded. Lifetime `total_xp` still records the full scaled gain.

use townsfolk_types::{AgentProfile, Mood, SkillName, SkillProgress};

use crate::config::SkillConfig;
use crate::error::AgentError;

/// Highest reachable skill level.
pub const MAX_SKILL_LEVEL: u32 = 10;

/// Result of an XP award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpGain {
    /// XP actually added after the mood multiplier.
    pub scaled: u32,
    /// Level before the award.
    pub from_level: u32,
    /// Level after the award.
    pub to_level: u32,
}

impl XpGain {
    /// Whether at least one level was gained.
    pub const fn leveled_up(self) -> bool {
        self.to_level > self.from_level
    }
}

/// XP needed to leave `level`, or `None` at the cap.
pub fn threshold(level: u32, config: &SkillConfig) -> Option<u32> {
    if level >= MAX_SKILL_LEVEL {
        return None;
    }
    let index = usize::try_from(level.saturating_sub(1)).ok()?;
    config.curve.get(index).copied()
}

/// Scale a raw XP amount by the mood multiplier, rounding to nearest.
pub fn scale_xp(amount: u32, mood: Mood, config: &SkillConfig) -> u32 {
    let multiplier = config.mood_multipliers.get(&mood).copied().unwrap_or(1.0).max(0.0);
    let scaled = (f64::from(amount) * multiplier).round();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        // Non-negative and in range after the guard above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = scaled as u32;
        value
    }
}

/// Add already-scaled XP to a progress record, leveling as needed.
pub fn add_scaled_xp(
    progress: &mut SkillProgress,
    amount: u32,
    config: &SkillConfig,
) -> Result<(), AgentError> {
    progress.total_xp = progress.total_xp.saturating_add(u64::from(amount));
    if progress.level >= MAX_SKILL_LEVEL {
        progress.level = MAX_SKILL_LEVEL;
        progress.xp = 0;
        return Ok(());
    }

    progress.xp = progress
        .xp
        .checked_add(amount)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: String::from("skill xp"),
        })?;

    // Loop handles multi-level jumps from a single large gain.
    while let Some(needed) = threshold(progress.level, config) {
        if progress.xp < needed {
            break;
        }
        progress.xp = progress.xp.saturating_sub(needed);
        progress.level = progress.level.saturating_add(1);
    }
    if progress.level >= MAX_SKILL_LEVEL {
        progress.level = MAX_SKILL_LEVEL;
        progress.xp = 0;
    }
    Ok(())
}

/// Award XP in `skill` to an agent, scaled by the agent's current mood.
pub fn award_xp(
    agent: &mut AgentProfile,
    skill: SkillName,
    amount: u32,
    config: &SkillConfig,
) -> Result<XpGain, AgentError> {
    let scaled = scale_xp(amount, agent.mood, config);
    let progress = agent.skills.entry(skill).or_default();
    let from_level = progress.level;
    add_scaled_xp(progress, scaled, config)?;
    let to_level = progress.level;
    if to_level > from_level {
        tracing::debug!(
            agent_id = %agent.id,
            skill = skill.as_str(),
            from_level,
            to_level,
            "skill level up"
        );
    }
    Ok(XpGain {
        scaled,
        from_level,
        to_level,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn at(level: u32, xp: u32) -> SkillProgress {
        SkillProgress {
            level,
            xp,
            total_xp: 0,
        }
    }

    #[test]
    fn small_gain_stays_at_level() {
        let config = SkillConfig::default();
        let mut progress = at(3, 90);
        add_scaled_xp(&mut progress, 20, &config).unwrap();
        assert_eq!((progress.level, progress.xp), (3, 110));
    }

    #[test]
    fn large_gain_crosses_threshold() {
        let config = SkillConfig::default();
        let mut progress = at(3, 90);
        add_scaled_xp(&mut progress, 900, &config).unwrap();
        // 990 - 500 = 490 at level 4, below the 800 needed for level 5.
        assert_eq!((progress.level, progress.xp), (4, 490));
    }

    #[test]
    fn multi_level_jump() {
        let config = SkillConfig::default();
        let mut progress = at(1, 0);
        add_scaled_xp(&mut progress, 100 + 250 + 500 + 10, &config).unwrap();
        assert_eq!((progress.level, progress.xp), (4, 10));
    }

    #[test]
    fn cap_pins_xp() {
        let config = SkillConfig::default();
        let mut progress = at(9, 3990);
        add_scaled_xp(&mut progress, 5000, &config).unwrap();
        assert_eq!((progress.level, progress.xp), (10, 0));

        add_scaled_xp(&mut progress, 77, &config).unwrap();
        assert_eq!((progress.level, progress.xp), (10, 0));
        assert_eq!(progress.total_xp, 5077);
    }

    #[test]
    fn mood_scales_gain() {
        let config = SkillConfig::default();
        assert_eq!(scale_xp(100, Mood::Ecstatic, &config), 130);
        assert_eq!(scale_xp(100, Mood::Content, &config), 100);
        assert_eq!(scale_xp(100, Mood::Miserable, &config), 50);
    }

    #[test]
    fn invariants_hold_under_random_gains() {
        let config = SkillConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut progress = SkillProgress::default();
        let mut last_total = 0;
        for _ in 0..400 {
            add_scaled_xp(&mut progress, rng.random_range(0..600), &config).unwrap();
            assert!(progress.level >= 1 && progress.level <= MAX_SKILL_LEVEL);
            match threshold(progress.level, &config) {
                Some(needed) => assert!(progress.xp < needed),
                None => assert_eq!(progress.xp, 0),
            }
            assert!(progress.total_xp >= last_total);
            last_total = progress.total_xp;
        }
    }
}

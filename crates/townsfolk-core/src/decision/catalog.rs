//! The action catalog: one explicit record per [`ActionKind`].
//!
//! Dispatch is an exhaustive `match`, so adding an action without a record
//! is a compile error.

use townsfolk_types::{ActionKind, GoalCategory, Need, PersonalityTrait, Place, SkillName};

/// What an action does to the agent's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinEffect {
    /// Free.
    None,
    /// Costs this much when affordable; free otherwise.
    Fee(u64),
    /// Pays this much.
    Wage(u64),
    /// Buys the priciest catalog item the agent can afford.
    BuyItem,
}

/// Static description of one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionSpec {
    /// Where the action happens.
    pub place: Place,
    /// Ticks the agent stays busy after starting.
    pub ticks: u32,
    /// Need changes applied when the action starts.
    pub effects: &'static [(Need, f64)],
    /// Skill trained and raw XP granted.
    pub xp: Option<(SkillName, u32)>,
    /// Wallet effect.
    pub coins: CoinEffect,
}

/// Catalog record for an action.
pub const fn lookup(action: ActionKind) -> ActionSpec {
    match action {
        ActionKind::Sleep => ActionSpec {
            place: Place::Home,
            ticks: 3,
            effects: &[(Need::Energy, 35.0), (Need::Comfort, 5.0)],
            xp: None,
            coins: CoinEffect::None,
        },
        ActionKind::Eat => ActionSpec {
            place: Place::Cafe,
            ticks: 1,
            effects: &[(Need::Hunger, 40.0), (Need::Social, 5.0)],
            xp: Some((SkillName::Cooking, 5)),
            coins: CoinEffect::Fee(5),
        },
        ActionKind::Cook => ActionSpec {
            place: Place::Home,
            ticks: 2,
            effects: &[(Need::Hunger, 30.0)],
            xp: Some((SkillName::Cooking, 15)),
            coins: CoinEffect::None,
        },
        ActionKind::Shower => ActionSpec {
            place: Place::Home,
            ticks: 1,
            effects: &[(Need::Hygiene, 45.0), (Need::Comfort, 5.0)],
            xp: None,
            coins: CoinEffect::None,
        },
        ActionKind::Lounge => ActionSpec {
            place: Place::Park,
            ticks: 2,
            effects: &[(Need::Comfort, 25.0), (Need::Fun, 5.0)],
            xp: None,
            coins: CoinEffect::None,
        },
        ActionKind::Socialize => ActionSpec {
            place: Place::Plaza,
            ticks: 2,
            effects: &[(Need::Social, 30.0), (Need::Fun, 5.0)],
            xp: Some((SkillName::Charisma, 10)),
            coins: CoinEffect::None,
        },
        ActionKind::Compete => ActionSpec {
            place: Place::Arena,
            ticks: 2,
            effects: &[(Need::Fun, 30.0), (Need::Energy, -10.0), (Need::Hygiene, -10.0)],
            xp: Some((SkillName::Fitness, 10)),
            coins: CoinEffect::None,
        },
        ActionKind::Workout => ActionSpec {
            place: Place::Gym,
            ticks: 2,
            effects: &[(Need::Energy, -15.0), (Need::Hygiene, -15.0), (Need::Fun, 10.0)],
            xp: Some((SkillName::Fitness, 15)),
            coins: CoinEffect::None,
        },
        ActionKind::Study => ActionSpec {
            place: Place::Library,
            ticks: 2,
            effects: &[(Need::Fun, -5.0), (Need::Energy, -5.0)],
            xp: Some((SkillName::Logic, 15)),
            coins: CoinEffect::None,
        },
        ActionKind::Paint => ActionSpec {
            place: Place::Park,
            ticks: 2,
            effects: &[(Need::Fun, 20.0), (Need::Comfort, 5.0)],
            xp: Some((SkillName::Creativity, 15)),
            coins: CoinEffect::None,
        },
        ActionKind::Shop => ActionSpec {
            place: Place::Market,
            ticks: 1,
            effects: &[(Need::Fun, 15.0), (Need::Comfort, 10.0)],
            xp: None,
            coins: CoinEffect::BuyItem,
        },
        ActionKind::Work => ActionSpec {
            place: Place::Office,
            ticks: 3,
            effects: &[(Need::Energy, -10.0), (Need::Fun, -10.0)],
            xp: Some((SkillName::Logic, 5)),
            coins: CoinEffect::Wage(40),
        },
    }
}

/// The action that restores a need.
pub const fn corrective(need: Need) -> ActionKind {
    match need {
        Need::Energy => ActionKind::Sleep,
        Need::Hunger => ActionKind::Eat,
        Need::Hygiene => ActionKind::Shower,
        Need::Social => ActionKind::Socialize,
        Need::Fun => ActionKind::Compete,
        Need::Comfort => ActionKind::Lounge,
    }
}

/// Weight boosts a trait adds to actions, scaled by the trait value.
pub const fn trait_boosts(personality_trait: PersonalityTrait) -> &'static [(ActionKind, f64)] {
    match personality_trait {
        PersonalityTrait::Openness => &[
            (ActionKind::Paint, 3.0),
            (ActionKind::Study, 2.0),
            (ActionKind::Shop, 1.0),
        ],
        PersonalityTrait::Conscientiousness => &[
            (ActionKind::Work, 3.0),
            (ActionKind::Study, 2.0),
            (ActionKind::Cook, 1.0),
        ],
        PersonalityTrait::Extraversion => &[
            (ActionKind::Socialize, 3.0),
            (ActionKind::Compete, 2.0),
            (ActionKind::Eat, 1.0),
        ],
        PersonalityTrait::Agreeableness => &[
            (ActionKind::Socialize, 2.0),
            (ActionKind::Cook, 1.0),
            (ActionKind::Lounge, 1.0),
        ],
        PersonalityTrait::Neuroticism => &[
            (ActionKind::Lounge, 2.0),
            (ActionKind::Sleep, 2.0),
            (ActionKind::Shower, 1.0),
        ],
    }
}

/// The action that advances a goal category.
pub const fn goal_action(category: GoalCategory) -> ActionKind {
    match category {
        GoalCategory::GetFit => ActionKind::Workout,
        GoalCategory::SaveUp => ActionKind::Work,
        GoalCategory::MakeFriends => ActionKind::Socialize,
        GoalCategory::LearnSomething => ActionKind::Study,
        GoalCategory::MakeArt => ActionKind::Paint,
        GoalCategory::FindCalm => ActionKind::Lounge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_corrective_action_raises_its_need() {
        for need in Need::ALL {
            let action = corrective(need);
            let raises = lookup(action)
                .effects
                .iter()
                .any(|(n, delta)| *n == need && *delta > 0.0);
            assert!(raises, "{action:?} does not restore {need:?}");
        }
    }

    #[test]
    fn every_action_takes_time() {
        for action in ActionKind::ALL {
            assert!(lookup(action).ticks >= 1);
        }
    }
}

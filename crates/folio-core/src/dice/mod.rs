//! Dice service: d6 sums and the three canonical tests.
//!
//! Every random draw goes through a [`RandomSource`], so deterministic
//! sequences can be substituted in tests via [`ScriptedDice`].

pub mod roll;
pub mod source;

pub use roll::RollResult;
pub use source::{RandomSource, ScriptedDice, SeededDice};

use serde::{Deserialize, Serialize};

use crate::sheet::Character;

/// Roll `count` six-sided dice.
pub fn roll(dice: &mut dyn RandomSource, count: u32) -> RollResult {
    RollResult {
        values: (0..count).map(|_| dice.d6()).collect(),
    }
}

/// Sum of `count` independent d6 draws.
pub fn roll_sum(dice: &mut dyn RandomSource, count: u32) -> u32 {
    roll(dice, count).total()
}

/// Outcome of a roll-under test against one of the character's stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The dice rolled, or `None` if the test failed without rolling.
    pub roll: Option<RollResult>,
    /// The stat value the roll had to meet or beat from below.
    pub target: i32,
    /// Whether the test passed.
    pub passed: bool,
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.roll {
            Some(roll) => write!(f, "rolled {} vs {}", roll.total(), self.target),
            None => write!(f, "no roll (target {})", self.target),
        }
    }
}

fn roll_under(dice: &mut dyn RandomSource, count: u32, target: i32) -> CheckResult {
    let roll = roll(dice, count);
    let passed = i64::from(roll.total()) <= i64::from(target);
    CheckResult {
        roll: Some(roll),
        target,
        passed,
    }
}

/// Test your Skill: `2d6 <= SKILL`. Does not mutate the character.
pub fn test_skill(dice: &mut dyn RandomSource, character: &Character) -> CheckResult {
    roll_under(dice, 2, character.skill.current)
}

/// Test your Luck: `2d6 <= LUCK`.
///
/// Every test costs one LUCK point, whatever the result. With no luck left
/// the test fails outright and no dice are rolled.
pub fn test_luck(dice: &mut dyn RandomSource, character: &mut Character) -> CheckResult {
    let target = character.luck.current;
    if target <= 0 {
        return CheckResult {
            roll: None,
            target,
            passed: false,
        };
    }
    let result = roll_under(dice, 2, target);
    character.luck.adjust(-1);
    tracing::debug!(
        passed = result.passed,
        luck = character.luck.current,
        "luck tested"
    );
    result
}

/// Test your Stamina: `4d6 <= STAMINA`. Does not mutate the character.
pub fn test_stamina(dice: &mut dyn RandomSource, character: &Character) -> CheckResult {
    roll_under(dice, 4, character.stamina.current)
}

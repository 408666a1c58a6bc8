//! Declarative stat, gold, and inventory changes.
//!
//! An [`EffectDelta`] is authored on a page and applied to a character by
//! [`apply_effects`], which returns a readable summary such as
//! `"-2 STAMINA, +1 LUCK, gained Rope"`.

pub mod formula;

pub use formula::{Amount, EffectTemplate, Formula};

use serde::{Deserialize, Serialize};

use crate::dice::RandomSource;
use crate::sheet::{Character, Stat};

/// Summary returned when a delta changes nothing.
pub const NO_CHANGE: &str = "no change";

/// A set of changes to apply to a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectDelta {
    /// STAMINA delta.
    pub stamina: Option<i32>,
    /// SKILL delta.
    pub skill: Option<i32>,
    /// LUCK delta.
    pub luck: Option<i32>,
    /// Gold delta (floored at zero).
    pub gold: Option<i32>,
    /// Lose every gold piece. Takes precedence over `gold`.
    pub lose_all_gold: bool,
    /// Items gained.
    pub add_items: Vec<String>,
    /// Items lost.
    pub remove_items: Vec<String>,
    /// Number of random items lost.
    pub lose_random_items: Option<u32>,
}

impl EffectDelta {
    /// Whether the delta would not touch the character at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply `delta` to `character` and describe what happened.
///
/// Stat fragments show the requested delta even when clamping truncates the
/// actual change, mirroring the authored rule text.
pub fn apply_effects(
    character: &mut Character,
    delta: &EffectDelta,
    dice: &mut dyn RandomSource,
) -> String {
    let mut parts = Vec::new();

    apply_stat(&mut character.stamina, delta.stamina, "STAMINA", &mut parts);
    apply_stat(&mut character.skill, delta.skill, "SKILL", &mut parts);
    apply_stat(&mut character.luck, delta.luck, "LUCK", &mut parts);

    if delta.lose_all_gold {
        character.gold = 0;
        parts.push("lost all Gold".to_string());
    } else if let Some(gold) = delta.gold.filter(|g| *g != 0) {
        character.adjust_gold(gold);
        parts.push(format!("{gold:+} Gold"));
    }

    for item in &delta.add_items {
        character.add_item(item);
        parts.push(format!("gained {item}"));
    }

    for item in &delta.remove_items {
        character.remove_item(item);
        parts.push(format!("lost {item}"));
    }

    if let Some(count) = delta.lose_random_items {
        for item in lose_random_items(character, count, dice) {
            parts.push(format!("lost {item}"));
        }
    }

    tracing::debug!(character = %character.name, changes = parts.len(), "effects applied");

    if parts.is_empty() {
        NO_CHANGE.to_string()
    } else {
        parts.join(", ")
    }
}

fn apply_stat(stat: &mut Stat, delta: Option<i32>, label: &str, parts: &mut Vec<String>) {
    if let Some(delta) = delta.filter(|d| *d != 0) {
        stat.adjust(delta);
        parts.push(format!("{delta:+} {label}"));
    }
}

/// Remove up to `count` distinct items chosen uniformly at random.
pub fn lose_random_items(
    character: &mut Character,
    count: u32,
    dice: &mut dyn RandomSource,
) -> Vec<String> {
    let mut lost = Vec::new();
    for _ in 0..count {
        let held = character.inventory.items();
        if held.is_empty() {
            break;
        }
        let name = held[dice.pick(held.len())].clone();
        if let Some(removed) = character.inventory.remove(&name) {
            lost.push(removed);
        }
    }
    lost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    fn hero() -> Character {
        let mut c = Character::with_stats("Hero", "u-1", 10, 16, 10);
        c.gold = 10;
        c
    }

    fn apply(c: &mut Character, delta: &EffectDelta) -> String {
        apply_effects(c, delta, &mut ScriptedDice::default())
    }

    #[test]
    fn lethal_delta_clamps_but_reports_request() {
        let mut c = hero();
        let delta = EffectDelta {
            stamina: Some(-100),
            ..EffectDelta::default()
        };
        assert_eq!(apply(&mut c, &delta), "-100 STAMINA");
        assert_eq!(c.stamina.current, 0);
        assert!(c.is_dead());
    }

    #[test]
    fn gains_capped_at_max() {
        let mut c = hero();
        c.luck.adjust(-3);
        let delta = EffectDelta {
            luck: Some(5),
            skill: Some(2),
            ..EffectDelta::default()
        };
        assert_eq!(apply(&mut c, &delta), "+2 SKILL, +5 LUCK");
        assert_eq!(c.luck.current, 10);
        assert_eq!(c.skill.current, 10);
    }

    #[test]
    fn zero_delta_emits_nothing() {
        let mut c = hero();
        let delta = EffectDelta {
            stamina: Some(0),
            gold: Some(0),
            ..EffectDelta::default()
        };
        assert_eq!(apply(&mut c, &delta), NO_CHANGE);
        assert!(EffectDelta::default().is_empty());
    }

    #[test]
    fn gold_floors_at_zero() {
        let mut c = hero();
        let delta = EffectDelta {
            gold: Some(-25),
            ..EffectDelta::default()
        };
        assert_eq!(apply(&mut c, &delta), "-25 Gold");
        assert_eq!(c.gold, 0);
    }

    #[test]
    fn lose_all_gold() {
        let mut c = hero();
        let delta = EffectDelta {
            lose_all_gold: true,
            gold: Some(5),
            ..EffectDelta::default()
        };
        assert_eq!(apply(&mut c, &delta), "lost all Gold");
        assert_eq!(c.gold, 0);
    }

    #[test]
    fn item_fragments_in_order() {
        let mut c = hero();
        let delta = EffectDelta {
            stamina: Some(-2),
            add_items: vec!["Rope".into(), "Silver Key".into()],
            remove_items: vec!["lantern".into()],
            ..EffectDelta::default()
        };
        assert_eq!(
            apply(&mut c, &delta),
            "-2 STAMINA, gained Rope, gained Silver Key, lost lantern"
        );
        assert!(c.has_item("rope"));
        assert!(!c.has_item("Lantern"));
    }

    #[test]
    fn random_loss_removes_distinct_items() {
        let mut c = hero();
        let mut dice = ScriptedDice::default().with_picks(vec![1, 0]);
        let delta = EffectDelta {
            lose_random_items: Some(2),
            ..EffectDelta::default()
        };
        let summary = apply_effects(&mut c, &delta, &mut dice);
        assert_eq!(summary, "lost Leather Armour, lost Sword");
        assert_eq!(c.inventory.items(), ["Lantern".to_string()]);
    }

    #[test]
    fn random_loss_stops_when_empty() {
        let mut c = hero();
        let lost = lose_random_items(&mut c, 10, &mut ScriptedDice::default());
        assert_eq!(lost.len(), 3);
        assert!(c.inventory.is_empty());
    }

    #[test]
    fn deserializes_partial_delta() {
        let delta: EffectDelta =
            serde_json::from_str(r#"{"stamina": -2, "add_items": ["Rope"]}"#).unwrap();
        assert_eq!(delta.stamina, Some(-2));
        assert_eq!(delta.add_items, vec!["Rope".to_string()]);
        assert!(!delta.lose_all_gold);
    }
}

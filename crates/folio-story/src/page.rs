//! Authored page nodes.
//!
//! Each page carries a `type` tag and a type-specific payload. The tag
//! selects a [`PageKind`] variant; a missing tag means `choice`, and a tag
//! the engine does not know becomes [`PageKind::Unknown`] so it can be
//! reported instead of silently ignored.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

use folio_core::{CombatRules, EffectDelta, EffectTemplate, PageId};

use crate::error::{StoryError, StoryResult};

/// `random_test` target that ends the game instead of naming a page.
pub const GAME_OVER_SENTINEL: &str = "GAME_OVER";

/// Every type tag the engine implements.
pub const NODE_TYPES: &[&str] = &[
    "choice",
    "auto",
    "effect",
    "random_effect",
    "luck_test",
    "luck_test_double",
    "skill_test",
    "random_test",
    "condition_item",
    "condition_item_any",
    "condition_multi",
    "condition_gold",
    "condition_combat",
    "random_encounter",
    "combat",
    "multi_combat",
    "transaction",
    "shop",
    "shop_multi",
    "pawn_shop",
    "dice_game",
    "special_heal",
    "game_over",
    "victory",
];

/// A JSON object read as a list of entries in authored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    /// Entries in authored order.
    pub fn entries(&self) -> &[(String, V)] {
        &self.0
    }

    /// Look up an entry by exact key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// Named branch targets such as `lucky`/`unlucky` or `win`/`lose`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Outcomes(HashMap<String, PageId>);

impl Outcomes {
    /// The target for `key`, or a `MissingOutcome` error naming `page`.
    pub fn get(&self, page: &PageId, key: &str) -> StoryResult<&PageId> {
        self.0.get(key).ok_or_else(|| StoryError::MissingOutcome {
            page: page.clone(),
            key: key.to_string(),
        })
    }

    /// All targets.
    pub fn targets(&self) -> impl Iterator<Item = &PageId> {
        self.0.values()
    }
}

/// `{"item": "Rope"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemCheck {
    /// Item name, compared case-insensitively.
    pub item: String,
}

/// `{"amount": 10}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoldCheck {
    /// Gold required.
    pub amount: u32,
}

/// `{"last_enemy_fought": "Troll"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CombatCheck {
    /// Fragment of the enemy name to look for.
    #[serde(default)]
    pub last_enemy_fought: String,
}

/// One requirement of a `condition_multi` page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// The item must be held.
    Item {
        /// Item name.
        value: String,
    },
    /// At least this much gold must be held.
    Gold {
        /// Gold required.
        value: u32,
    },
}

/// A paid option on a `transaction` page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Offer {
    /// Gold cost.
    #[serde(default)]
    pub cost: u32,
    /// Applied after paying.
    #[serde(default)]
    pub effect: Option<EffectDelta>,
    /// Where the option leads.
    pub next: PageId,
}

/// Which mini-game a `dice_game` page plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceGameKind {
    /// Rounds of 2d6 against an opponent for a stake.
    #[default]
    HighRoll,
    /// Alternating d6; whoever rolls a 1 loses the wager.
    HotPotato,
}

/// Rules of a `dice_game` page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiceGameRules {
    /// Which game.
    pub game_type: DiceGameKind,
    /// `high_roll` stake per round.
    pub stake: Option<u32>,
    /// `high_roll` round limit.
    pub max_plays: Option<u32>,
    /// `hot_potato` wager.
    pub wager: Option<u32>,
}

impl DiceGameRules {
    /// Stake per `high_roll` round (default 2).
    pub fn stake(&self) -> u32 {
        self.stake.unwrap_or(2)
    }

    /// Maximum `high_roll` rounds (default 4).
    pub fn max_plays(&self) -> u32 {
        self.max_plays.unwrap_or(4)
    }

    /// `hot_potato` wager (default 5).
    pub fn wager(&self) -> u32 {
        self.wager.unwrap_or(5)
    }
}

fn default_heal_per_arrow() -> i32 {
    2
}

/// Type-specific behaviour of a page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageKind {
    /// The player picks one of several labelled branches.
    Choice {
        /// Option label to target, in authored order.
        #[serde(default)]
        choices: OrderedMap<PageId>,
    },
    /// Continue to a fixed page.
    Auto {
        /// Next page.
        next: PageId,
    },
    /// Apply fixed effects.
    Effect {
        /// What changes.
        #[serde(default)]
        effects: EffectDelta,
        /// Next page.
        next: PageId,
    },
    /// Roll a die and apply effects computed from it.
    RandomEffect {
        /// Amounts, possibly formulas over the roll.
        effect_template: EffectTemplate,
        /// Next page.
        next: PageId,
    },
    /// Test your Luck.
    LuckTest {
        /// `lucky` / `unlucky`.
        outcomes: Outcomes,
    },
    /// Test your Luck twice.
    LuckTestDouble {
        /// `lucky_lucky`, `lucky_unlucky`, `unlucky_lucky`, `unlucky_unlucky`.
        outcomes: Outcomes,
    },
    /// Test your Skill.
    SkillTest {
        /// `success` / `failure`.
        outcomes: Outcomes,
    },
    /// Roll a die and branch on the result.
    RandomTest {
        /// Roll (`"3"`) or range (`"2-6"`) to target, in authored order.
        outcomes: OrderedMap<PageId>,
    },
    /// Branch on holding an item.
    ConditionItem {
        /// The item.
        check: ItemCheck,
        /// `success` / `failure`.
        outcomes: Outcomes,
    },
    /// Branch on holding any of several items.
    ConditionItemAny {
        /// The items.
        checks: Vec<ItemCheck>,
        /// `success` / `failure`.
        outcomes: Outcomes,
    },
    /// Branch on meeting every requirement.
    ConditionMulti {
        /// The requirements.
        checks: Vec<Requirement>,
        /// `success` / `failure`.
        outcomes: Outcomes,
    },
    /// Branch on having enough gold.
    ConditionGold {
        /// Gold threshold.
        check: GoldCheck,
        /// `success` / `failure`.
        outcomes: Outcomes,
    },
    /// Branch on the last enemy fought.
    ConditionCombat {
        /// Name fragment.
        check: CombatCheck,
        /// `success` / `failure`.
        outcomes: Outcomes,
    },
    /// Roll for a random enemy and fight it.
    RandomEncounter {
        /// Roll to enemy id.
        encounters: HashMap<String, String>,
        /// Combat rule modifiers.
        #[serde(default)]
        rules: CombatRules,
        /// Combat outcomes.
        outcomes: Outcomes,
    },
    /// Fight enemies one after another.
    Combat {
        /// Enemy ids, in fighting order.
        enemies: Vec<String>,
        /// Combat rule modifiers.
        #[serde(default)]
        rules: CombatRules,
        /// Combat outcomes.
        outcomes: Outcomes,
    },
    /// Fight enemies all at once.
    MultiCombat {
        /// Enemy ids.
        enemies: Vec<String>,
        /// Combat rule modifiers.
        #[serde(default)]
        rules: CombatRules,
        /// `win` / `lose`.
        outcomes: Outcomes,
    },
    /// Pay for one of several options.
    Transaction {
        /// Option label to offer, in authored order.
        choices: OrderedMap<Offer>,
    },
    /// Buy items until leaving.
    Shop {
        /// Item to price.
        items: OrderedMap<u32>,
        /// Page after leaving.
        next: PageId,
    },
    /// Buy items until leaving.
    ShopMulti {
        /// Item to price.
        items: OrderedMap<u32>,
        /// Page after leaving.
        next: PageId,
    },
    /// Sell held items until leaving.
    PawnShop {
        /// Item to price offered.
        items: OrderedMap<u32>,
        /// Page after leaving.
        next: PageId,
    },
    /// Gamble with dice.
    DiceGame {
        /// Which game and its stakes.
        #[serde(default)]
        rules: DiceGameRules,
        /// Page after the game.
        next: PageId,
    },
    /// Heal per arrow absorbed earlier, then pay for it.
    SpecialHeal {
        /// STAMINA per arrow.
        #[serde(default = "default_heal_per_arrow")]
        heal_per_arrow: i32,
        /// Applied after healing.
        #[serde(default)]
        effects: Option<EffectDelta>,
        /// Next page.
        next: PageId,
    },
    /// The adventure ends in failure.
    GameOver,
    /// The adventure is won.
    Victory,
    /// A type tag the engine does not implement.
    #[serde(skip)]
    Unknown {
        /// The authored tag.
        type_name: String,
    },
}

impl PageKind {
    /// The type tag.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Choice { .. } => "choice",
            Self::Auto { .. } => "auto",
            Self::Effect { .. } => "effect",
            Self::RandomEffect { .. } => "random_effect",
            Self::LuckTest { .. } => "luck_test",
            Self::LuckTestDouble { .. } => "luck_test_double",
            Self::SkillTest { .. } => "skill_test",
            Self::RandomTest { .. } => "random_test",
            Self::ConditionItem { .. } => "condition_item",
            Self::ConditionItemAny { .. } => "condition_item_any",
            Self::ConditionMulti { .. } => "condition_multi",
            Self::ConditionGold { .. } => "condition_gold",
            Self::ConditionCombat { .. } => "condition_combat",
            Self::RandomEncounter { .. } => "random_encounter",
            Self::Combat { .. } => "combat",
            Self::MultiCombat { .. } => "multi_combat",
            Self::Transaction { .. } => "transaction",
            Self::Shop { .. } => "shop",
            Self::ShopMulti { .. } => "shop_multi",
            Self::PawnShop { .. } => "pawn_shop",
            Self::DiceGame { .. } => "dice_game",
            Self::SpecialHeal { .. } => "special_heal",
            Self::GameOver => "game_over",
            Self::Victory => "victory",
            Self::Unknown { type_name } => type_name,
        }
    }

    /// Whether reaching this page ends the adventure.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }

    /// Every page this page can lead to, including escape routes.
    pub fn targets(&self) -> Vec<&PageId> {
        let mut targets: Vec<&PageId> = Vec::new();
        match self {
            Self::Choice { choices } => targets.extend(choices.entries().iter().map(|(_, p)| p)),
            Self::Auto { next }
            | Self::Effect { next, .. }
            | Self::RandomEffect { next, .. }
            | Self::Shop { next, .. }
            | Self::ShopMulti { next, .. }
            | Self::PawnShop { next, .. }
            | Self::DiceGame { next, .. }
            | Self::SpecialHeal { next, .. } => targets.push(next),
            Self::LuckTest { outcomes }
            | Self::LuckTestDouble { outcomes }
            | Self::SkillTest { outcomes }
            | Self::ConditionItem { outcomes, .. }
            | Self::ConditionItemAny { outcomes, .. }
            | Self::ConditionMulti { outcomes, .. }
            | Self::ConditionGold { outcomes, .. }
            | Self::ConditionCombat { outcomes, .. } => targets.extend(outcomes.targets()),
            Self::RandomEncounter {
                rules, outcomes, ..
            }
            | Self::Combat {
                rules, outcomes, ..
            }
            | Self::MultiCombat {
                rules, outcomes, ..
            } => {
                targets.extend(outcomes.targets());
                if let Some(escape) = &rules.escape_after_rounds {
                    targets.push(&escape.page);
                }
            }
            Self::RandomTest { outcomes } => {
                targets.extend(outcomes.entries().iter().map(|(_, p)| p));
            }
            Self::Transaction { choices } => {
                targets.extend(choices.entries().iter().map(|(_, offer)| &offer.next));
            }
            Self::GameOver | Self::Victory | Self::Unknown { .. } => {}
        }
        targets
    }
}

/// One authored page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    /// Narrative text.
    pub text: String,
    /// Behaviour.
    pub kind: PageKind,
}

impl<'de> Deserialize<'de> for PageNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = Value::deserialize(deserializer)?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| de::Error::custom("page must be a JSON object"))?;

        let text = object
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let type_name = object
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("choice")
            .to_string();

        if !NODE_TYPES.contains(&type_name.as_str()) {
            return Ok(Self {
                text,
                kind: PageKind::Unknown { type_name },
            });
        }

        object.insert("type".to_string(), Value::String(type_name));
        let kind = PageKind::deserialize(value).map_err(de::Error::custom)?;
        Ok(Self { text, kind })
    }
}

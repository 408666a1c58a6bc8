//! Combat resolution: attack strength exchanges against enemy templates.
//!
//! Two resolvers share the same exchange rules:
//!
//! - [`SequentialCombat`] fights enemies one at a time in listed order.
//! - [`SimultaneousCombat`] faces every enemy at once; only the chosen
//!   target can be wounded, the rest can only land flank hits.
//!
//! Neither blocks for input. Each call to `advance` runs rounds until the
//! fight ends or the player has to decide something (whether to test luck,
//! which enemy to target). The decision comes back in the next call.

pub mod sequential;
pub mod simultaneous;

pub use sequential::SequentialCombat;
pub use simultaneous::SimultaneousCombat;

use serde::{Deserialize, Serialize};

use crate::dice::{RandomSource, roll, test_luck};
use crate::id::PageId;
use crate::sheet::Character;

/// Damage dealt by a winning attack before modifiers.
pub const BASE_DAMAGE: i32 = 2;

/// A read-only enemy definition from the enemy catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Catalog key. Filled from the map key when omitted in JSON.
    #[serde(default)]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base SKILL.
    pub skill: i32,
    /// Base STAMINA.
    pub stamina: i32,
}

/// A per-encounter copy of an enemy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    /// Template id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// SKILL for this fight.
    pub skill: i32,
    /// Remaining STAMINA, floored at zero.
    pub stamina: i32,
}

impl Combatant {
    /// Copy a template into a fresh combatant.
    pub fn from_template(template: &EnemyTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            skill: template.skill,
            stamina: template.stamina.max(0),
        }
    }

    /// Whether this enemy is out of the fight.
    pub fn is_defeated(&self) -> bool {
        self.stamina <= 0
    }

    fn wound(&mut self, damage: i32) {
        self.stamina = (self.stamina - damage.max(0)).max(0);
    }

    fn label(&self) -> String {
        format!("{} (SKILL {}, STAMINA {})", self.name, self.skill, self.stamina)
    }
}

/// Escape route that opens once the round counter passes a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeRule {
    /// Rounds that must be fought before escaping.
    pub rounds: u32,
    /// Page the escape leads to.
    pub page: PageId,
}

/// Optional per-encounter rule modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Winning within this many rounds is a fast win.
    pub max_rounds: Option<u32>,
    /// Escape after a number of rounds.
    pub escape_after_rounds: Option<EscapeRule>,
    /// Added to the player's attack strength.
    pub player_attack_modifier: i32,
    /// Added to the damage the player deals.
    pub player_extra_damage_on_hit: i32,
    /// Added to the damage enemies deal.
    pub enemy_extra_damage: i32,
}

/// How a fight ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Every enemy defeated.
    Win,
    /// Every enemy defeated within `max_rounds`.
    WinFast,
    /// Every enemy defeated, but slower than `max_rounds`.
    WinSlow,
    /// The player died.
    Lose,
    /// The escape rule fired.
    Escaped(PageId),
}

impl CombatOutcome {
    /// The outcome-map key this result routes through, or `None` for an
    /// escape, which carries its own page.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Win => Some("win"),
            Self::WinFast => Some("win_fast"),
            Self::WinSlow => Some("win_slow"),
            Self::Lose => Some("lose"),
            Self::Escaped(_) => None,
        }
    }

    fn for_victory(rules: &CombatRules, rounds: u32) -> Self {
        match rules.max_rounds {
            Some(max) if rounds <= max => Self::WinFast,
            Some(_) => Self::WinSlow,
            None => Self::Win,
        }
    }
}

/// A decision the player must make before combat can continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatPrompt {
    /// The player hit. Test luck to double the damage?
    LuckToWound {
        /// Name of the enemy hit.
        enemy: String,
    },
    /// The player was hit. Test luck to reduce the damage?
    LuckToDefend {
        /// Name of the attacker.
        enemy: String,
    },
    /// Pick one of the listed living enemies as this round's target.
    ChooseTarget {
        /// Labels of the living enemies, in order.
        options: Vec<String>,
    },
}

impl std::fmt::Display for CombatPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LuckToWound { enemy } => {
                write!(f, "You hit the {enemy}. Test your Luck for double damage?")
            }
            Self::LuckToDefend { enemy } => {
                write!(f, "The {enemy} hit you. Test your Luck to reduce the damage?")
            }
            Self::ChooseTarget { .. } => write!(f, "Choose your target"),
        }
    }
}

/// The player's answer to a [`CombatPrompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatAnswer {
    /// Yes or no to a luck prompt.
    Confirm(bool),
    /// Index into the `ChooseTarget` options.
    Target(usize),
}

/// Where a fight stands after a call to `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatState {
    /// Waiting on the player.
    Awaiting(CombatPrompt),
    /// The fight is over.
    Finished(CombatOutcome),
}

/// Result of one `advance` call: what happened and where things stand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatProgress {
    /// Narration of the rounds resolved during this call.
    pub log: Vec<String>,
    /// Current state.
    pub state: CombatState,
}

/// A hit waiting on the player's luck decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingHit {
    /// The player hit enemy `index` for `damage`.
    Wound { index: usize, damage: i32 },
    /// Enemy `index` hit the player for `damage`.
    Defend { index: usize, damage: i32 },
}

impl PendingHit {
    fn prompt(self, enemies: &[Combatant]) -> CombatPrompt {
        match self {
            Self::Wound { index, .. } => CombatPrompt::LuckToWound {
                enemy: enemies[index].name.clone(),
            },
            Self::Defend { index, .. } => CombatPrompt::LuckToDefend {
                enemy: enemies[index].name.clone(),
            },
        }
    }

    /// Land the hit, testing luck first when the player asked to.
    fn resolve(
        self,
        use_luck: bool,
        character: &mut Character,
        enemies: &mut [Combatant],
        dice: &mut dyn RandomSource,
        log: &mut Vec<String>,
    ) {
        match self {
            Self::Wound { index, mut damage } => {
                if use_luck {
                    let check = test_luck(dice, character);
                    if check.passed {
                        damage *= 2;
                        log.push(format!("Lucky ({check})! Double damage."));
                    } else {
                        damage = 1;
                        log.push(format!("Unlucky ({check}). Only 1 damage."));
                    }
                }
                let enemy = &mut enemies[index];
                enemy.wound(damage);
                log.push(format!("{} STAMINA: {}", enemy.name, enemy.stamina));
            }
            Self::Defend { index, mut damage } => {
                if use_luck {
                    let check = test_luck(dice, character);
                    if check.passed {
                        damage = 1;
                        log.push(format!("Lucky ({check})! You take only 1 damage."));
                    } else {
                        damage += 1;
                        log.push(format!("Unlucky ({check}). You take an extra point."));
                    }
                }
                character.take_damage(damage);
                log.push(format!(
                    "The {} hits you. Your STAMINA: {}",
                    enemies[index].name, character.stamina
                ));
            }
        }
    }
}

/// Roll `2d6 + skill + modifier`, returning the dice total and the AS.
fn attack_strength(dice: &mut dyn RandomSource, skill: i32, modifier: i32) -> (u32, i32) {
    let dice_total = roll(dice, 2).total();
    (dice_total, dice_total as i32 + skill + modifier)
}

/// Resolve a hit immediately if the player cannot test luck, otherwise
/// hand it back as pending.
fn offer_luck(
    hit: PendingHit,
    character: &mut Character,
    enemies: &mut [Combatant],
    dice: &mut dyn RandomSource,
    log: &mut Vec<String>,
) -> Option<PendingHit> {
    if character.luck.current > 0 {
        Some(hit)
    } else {
        hit.resolve(false, character, enemies, dice, log);
        None
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn enemy(name: &str, skill: i32, stamina: i32) -> EnemyTemplate {
        EnemyTemplate {
            id: name.to_lowercase(),
            name: name.to_string(),
            skill,
            stamina,
        }
    }
}

//! The adventure sheet: stats, resources, inventory, and location.
//!
//! A character is rolled once at creation time and then mutated through
//! the primitives here. Stats are [`Stat`]s, so SKILL, STAMINA and LUCK
//! always stay within `[0, max]`; gold and provisions are unsigned.

pub mod inventory;
pub mod track;

pub use inventory::Inventory;
pub use track::Stat;

use serde::{Deserialize, Serialize};

use crate::dice::{RandomSource, roll_sum};
use crate::id::PageId;

/// Provisions every new adventurer starts with.
pub const STARTING_PROVISIONS: u32 = 10;

/// STAMINA restored by eating one provision.
pub const PROVISION_HEAL: i32 = 4;

/// Equipment every new adventurer starts with.
pub const STARTING_ITEMS: [&str; 3] = ["Sword", "Leather Armour", "Lantern"];

/// Name used when the player does not supply one.
pub const DEFAULT_NAME: &str = "Adventurer";

/// A player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Display name.
    pub name: String,
    /// Stable id of the owning player or session.
    pub user_id: String,
    /// SKILL.
    pub skill: Stat,
    /// STAMINA. Zero means dead.
    pub stamina: Stat,
    /// LUCK.
    pub luck: Stat,
    /// Gold pieces.
    pub gold: u32,
    /// Meals left.
    pub provisions: u32,
    /// Items carried.
    pub inventory: Inventory,
    /// The page the character is on.
    pub current_page: PageId,
}

/// Result of trying to eat a provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EatOutcome {
    /// A provision was eaten, restoring this much STAMINA.
    Ate {
        /// STAMINA actually restored.
        healed: i32,
    },
    /// No provisions left.
    NoProvisions,
    /// STAMINA is already at its maximum.
    AlreadyFull,
}

impl std::fmt::Display for EatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ate { healed } => write!(f, "You eat a meal and regain {healed} STAMINA."),
            Self::NoProvisions => write!(f, "You have no provisions left."),
            Self::AlreadyFull => write!(f, "Your STAMINA is already full."),
        }
    }
}

impl Character {
    /// Roll a new character: `1d6+6` SKILL, `2d6+12` STAMINA, `1d6+6` LUCK,
    /// `1d6+8` gold, standard equipment and provisions.
    pub fn roll(
        name: &str,
        user_id: impl Into<String>,
        start_page: PageId,
        dice: &mut dyn RandomSource,
    ) -> Self {
        let skill = roll_sum(dice, 1) as i32 + 6;
        let stamina = roll_sum(dice, 2) as i32 + 12;
        let luck = roll_sum(dice, 1) as i32 + 6;
        let gold = roll_sum(dice, 1) + 8;

        let mut character = Self::with_stats(name, user_id, skill, stamina, luck);
        character.gold = gold;
        character.current_page = start_page;
        character
    }

    /// Build a character with fixed stats, standard equipment, and no gold,
    /// starting on page `1`.
    pub fn with_stats(
        name: &str,
        user_id: impl Into<String>,
        skill: i32,
        stamina: i32,
        luck: i32,
    ) -> Self {
        let name = name.trim();
        let name = if name.is_empty() { DEFAULT_NAME } else { name };
        Self {
            name: name.to_string(),
            user_id: user_id.into(),
            skill: Stat::new(skill),
            stamina: Stat::new(stamina),
            luck: Stat::new(luck),
            gold: 0,
            provisions: STARTING_PROVISIONS,
            inventory: STARTING_ITEMS.into_iter().collect(),
            current_page: PageId::from(1),
        }
    }

    /// Lose STAMINA, never dropping below zero. Returns the new STAMINA.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.stamina.adjust(-amount.max(0))
    }

    /// Regain STAMINA, never exceeding the maximum. Returns the new STAMINA.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.stamina.adjust(amount.max(0))
    }

    /// Whether STAMINA has reached zero.
    pub fn is_dead(&self) -> bool {
        self.stamina.is_empty()
    }

    /// Whether an item is carried (case-insensitive).
    pub fn has_item(&self, name: &str) -> bool {
        self.inventory.contains(name)
    }

    /// Pick up an item. Returns false if it was already carried.
    pub fn add_item(&mut self, name: &str) -> bool {
        self.inventory.add(name)
    }

    /// Drop an item. Returns false if it was not carried.
    pub fn remove_item(&mut self, name: &str) -> bool {
        self.inventory.remove(name).is_some()
    }

    /// Add (or with a negative delta, remove) gold, flooring at zero.
    pub fn adjust_gold(&mut self, delta: i32) -> u32 {
        self.gold = self.gold.saturating_add_signed(delta);
        self.gold
    }

    /// Pay `amount` gold if the character can afford it.
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(rest) => {
                self.gold = rest;
                true
            }
            None => false,
        }
    }

    /// Eat one provision to regain [`PROVISION_HEAL`] STAMINA.
    pub fn eat_provision(&mut self) -> EatOutcome {
        if self.provisions == 0 {
            return EatOutcome::NoProvisions;
        }
        if self.stamina.is_full() {
            return EatOutcome::AlreadyFull;
        }
        let before = self.stamina.current;
        self.provisions -= 1;
        let after = self.heal(PROVISION_HEAL);
        EatOutcome::Ate {
            healed: after - before,
        }
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}'s Adventure Sheet", self.name)?;
        writeln!(f, "  SKILL:      {}", self.skill)?;
        writeln!(f, "  STAMINA:    {}", self.stamina)?;
        writeln!(f, "  LUCK:       {}", self.luck)?;
        writeln!(f, "  Gold:       {}", self.gold)?;
        writeln!(f, "  Provisions: {}", self.provisions)?;
        writeln!(f, "  Inventory:  {}", self.inventory)?;
        write!(f, "  Page:       {}", self.current_page)
    }
}

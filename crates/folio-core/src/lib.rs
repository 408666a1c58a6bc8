//! Gamebook rules engine for Folio.
//!
//! Provides d6 dice and the classic roll-under tests, the adventure sheet
//! with clamped SKILL / STAMINA / LUCK, declarative effects with a safe
//! formula evaluator, and a resumable combat resolver for sequential and
//! simultaneous fights.

pub mod combat;
pub mod dice;
pub mod effect;
pub mod error;
pub mod id;
pub mod sheet;

pub use combat::{
    CombatAnswer, CombatOutcome, CombatProgress, CombatPrompt, CombatRules, CombatState,
    Combatant, EnemyTemplate, EscapeRule, SequentialCombat, SimultaneousCombat,
};
pub use dice::{CheckResult, RandomSource, RollResult, ScriptedDice, SeededDice};
pub use effect::{Amount, EffectDelta, EffectTemplate, Formula, apply_effects};
pub use error::{CoreError, CoreResult};
pub use id::PageId;
pub use sheet::{Character, EatOutcome, Inventory, Stat};

//! Every enemy at once; one target per round.

use std::cmp::Ordering;

use super::{
    BASE_DAMAGE, CombatAnswer, CombatOutcome, CombatProgress, CombatPrompt, CombatRules,
    CombatState, Combatant, EnemyTemplate, PendingHit, attack_strength, offer_luck,
};
use crate::dice::RandomSource;
use crate::error::{CoreError, CoreResult};
use crate::sheet::Character;

/// Attack strengths rolled at the start of a round and the exchanges still
/// to resolve.
#[derive(Debug, Clone)]
struct Round {
    target: usize,
    player_as: i32,
    /// `(enemy index, enemy AS)` for every enemy alive when the round began.
    rolls: Vec<(usize, i32)>,
    cursor: usize,
}

/// A `multi_combat` encounter.
#[derive(Debug, Clone)]
pub struct SimultaneousCombat {
    enemies: Vec<Combatant>,
    rules: CombatRules,
    rounds: u32,
    round: Option<Round>,
    choosing: Option<Vec<usize>>,
    pending: Option<PendingHit>,
    engaged: Option<usize>,
}

impl SimultaneousCombat {
    /// Start an encounter against copies of `enemies`.
    pub fn new(enemies: &[EnemyTemplate], rules: CombatRules) -> CoreResult<Self> {
        if enemies.is_empty() {
            return Err(CoreError::NoEnemies);
        }
        Ok(Self {
            enemies: enemies.iter().map(Combatant::from_template).collect(),
            rules,
            rounds: 0,
            round: None,
            choosing: None,
            pending: None,
            engaged: None,
        })
    }

    /// Rounds fought so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// The encounter's enemies and their remaining STAMINA.
    pub fn enemies(&self) -> &[Combatant] {
        &self.enemies
    }

    /// Name of the most recent target.
    pub fn last_engaged(&self) -> Option<&str> {
        self.engaged.map(|i| self.enemies[i].name.as_str())
    }

    /// Run rounds until the fight ends or needs a decision.
    ///
    /// After a `ChooseTarget` prompt the answer must be
    /// `CombatAnswer::Target` with an index into the offered options; after
    /// a luck prompt it must be `CombatAnswer::Confirm`. A mismatched or out
    /// of range answer leaves the fight untouched and returns an error.
    pub fn advance(
        &mut self,
        character: &mut Character,
        dice: &mut dyn RandomSource,
        answer: Option<CombatAnswer>,
    ) -> CoreResult<CombatProgress> {
        let mut log = Vec::new();

        if let Some(living) = &self.choosing {
            let target = match answer {
                Some(CombatAnswer::Target(i)) => living.get(i).copied(),
                _ => None,
            };
            let Some(target) = target else {
                return Err(CoreError::CombatError(format!(
                    "expected a target between 1 and {}",
                    living.len()
                )));
            };
            self.choosing = None;
            self.start_round(target, character, dice, &mut log);
        } else if let Some(hit) = self.pending {
            let Some(CombatAnswer::Confirm(use_luck)) = answer else {
                return Err(CoreError::CombatError(
                    "expected a yes/no answer to the luck prompt".to_string(),
                ));
            };
            self.pending = None;
            hit.resolve(use_luck, character, &mut self.enemies, dice, &mut log);
            if let Some(round) = &mut self.round {
                round.cursor += 1;
            }
        }

        loop {
            if character.is_dead() {
                return Ok(self.finish(log, CombatOutcome::Lose));
            }

            if self.round.is_none() {
                let living: Vec<usize> = (0..self.enemies.len())
                    .filter(|&i| !self.enemies[i].is_defeated())
                    .collect();
                match living.as_slice() {
                    [] => return Ok(self.finish(log, CombatOutcome::Win)),
                    [only] => self.start_round(*only, character, dice, &mut log),
                    _ => {
                        let options = living.iter().map(|&i| self.enemies[i].label()).collect();
                        self.choosing = Some(living);
                        return Ok(CombatProgress {
                            log,
                            state: CombatState::Awaiting(CombatPrompt::ChooseTarget { options }),
                        });
                    }
                }
            }

            if let Some(hit) = self.resolve_exchanges(character, dice, &mut log) {
                let prompt = hit.prompt(&self.enemies);
                self.pending = Some(hit);
                return Ok(CombatProgress {
                    log,
                    state: CombatState::Awaiting(prompt),
                });
            }
        }
    }

    fn start_round(
        &mut self,
        target: usize,
        character: &Character,
        dice: &mut dyn RandomSource,
        log: &mut Vec<String>,
    ) {
        self.rounds += 1;
        self.engaged = Some(target);
        log.push(format!(
            "Round {}: targeting the {}",
            self.rounds, self.enemies[target].name
        ));

        let (p_roll, player_as) = attack_strength(
            dice,
            character.skill.current,
            self.rules.player_attack_modifier,
        );
        log.push(format!("You roll {p_roll}: attack strength {player_as}"));

        let mut rolls = Vec::new();
        for (index, enemy) in self.enemies.iter().enumerate() {
            if enemy.is_defeated() {
                continue;
            }
            let (e_roll, e_as) = attack_strength(dice, enemy.skill, 0);
            log.push(format!(
                "The {} rolls {e_roll}: attack strength {e_as}",
                enemy.name
            ));
            rolls.push((index, e_as));
        }

        self.round = Some(Round {
            target,
            player_as,
            rolls,
            cursor: 0,
        });
    }

    /// Work through the current round's exchanges. Returns a hit that needs
    /// a luck decision, or `None` once the round is over (or the player is
    /// dead).
    fn resolve_exchanges(
        &mut self,
        character: &mut Character,
        dice: &mut dyn RandomSource,
        log: &mut Vec<String>,
    ) -> Option<PendingHit> {
        let mut round = self.round.take()?;

        while let Some(&(index, enemy_as)) = round.rolls.get(round.cursor) {
            if character.is_dead() {
                return None;
            }
            let name = self.enemies[index].name.clone();
            let ordering = round.player_as.cmp(&enemy_as);

            if index == round.target {
                let hit = match ordering {
                    Ordering::Greater => {
                        log.push(format!("You hit the {name}!"));
                        Some(PendingHit::Wound {
                            index,
                            damage: BASE_DAMAGE + self.rules.player_extra_damage_on_hit,
                        })
                    }
                    Ordering::Less => Some(PendingHit::Defend {
                        index,
                        damage: BASE_DAMAGE + self.rules.enemy_extra_damage,
                    }),
                    Ordering::Equal => {
                        log.push(format!("You clash with the {name}."));
                        None
                    }
                };
                if let Some(hit) = hit {
                    if let Some(pending) =
                        offer_luck(hit, character, &mut self.enemies, dice, log)
                    {
                        self.round = Some(round);
                        return Some(pending);
                    }
                }
            } else if ordering == Ordering::Less {
                character.take_damage(BASE_DAMAGE + self.rules.enemy_extra_damage);
                log.push(format!(
                    "The {name} strikes your flank. Your STAMINA: {}",
                    character.stamina
                ));
            } else {
                log.push(format!("You parry the {name}."));
            }
            round.cursor += 1;
        }
        None
    }

    fn finish(&self, log: Vec<String>, outcome: CombatOutcome) -> CombatProgress {
        tracing::debug!(rounds = self.rounds, ?outcome, "simultaneous combat finished");
        CombatProgress {
            log,
            state: CombatState::Finished(outcome),
        }
    }
}

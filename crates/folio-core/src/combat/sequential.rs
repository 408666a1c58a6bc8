//! One enemy at a time, in listed order.

use std::cmp::Ordering;

use super::{
    BASE_DAMAGE, CombatAnswer, CombatOutcome, CombatProgress, CombatRules, CombatState,
    Combatant, EnemyTemplate, PendingHit, attack_strength, offer_luck,
};
use crate::dice::RandomSource;
use crate::error::{CoreError, CoreResult};
use crate::sheet::Character;

/// A `combat` encounter.
///
/// Rounds are counted across the whole encounter, so `max_rounds` and
/// `escape_after_rounds` see the total, not the count against the current
/// enemy.
#[derive(Debug, Clone)]
pub struct SequentialCombat {
    enemies: Vec<Combatant>,
    rules: CombatRules,
    current: usize,
    rounds: u32,
    announced: Option<usize>,
    pending: Option<PendingHit>,
}

impl SequentialCombat {
    /// Start an encounter against copies of `enemies`.
    pub fn new(enemies: &[EnemyTemplate], rules: CombatRules) -> CoreResult<Self> {
        if enemies.is_empty() {
            return Err(CoreError::NoEnemies);
        }
        Ok(Self {
            enemies: enemies.iter().map(Combatant::from_template).collect(),
            rules,
            current: 0,
            rounds: 0,
            announced: None,
            pending: None,
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

    /// Name of the last enemy the player engaged.
    pub fn last_engaged(&self) -> Option<&str> {
        self.announced.map(|i| self.enemies[i].name.as_str())
    }

    /// Run rounds until the fight ends or needs a decision.
    ///
    /// `answer` must be `Some(CombatAnswer::Confirm(_))` when the previous
    /// call ended on a luck prompt, and is ignored otherwise. A mismatched
    /// answer leaves the fight untouched and returns an error.
    pub fn advance(
        &mut self,
        character: &mut Character,
        dice: &mut dyn RandomSource,
        answer: Option<CombatAnswer>,
    ) -> CoreResult<CombatProgress> {
        let mut log = Vec::new();

        if let Some(hit) = self.pending {
            let Some(CombatAnswer::Confirm(use_luck)) = answer else {
                return Err(CoreError::CombatError(
                    "expected a yes/no answer to the luck prompt".to_string(),
                ));
            };
            self.pending = None;
            hit.resolve(use_luck, character, &mut self.enemies, dice, &mut log);
        }

        loop {
            if character.is_dead() {
                return Ok(self.finish(log, CombatOutcome::Lose));
            }

            while self
                .enemies
                .get(self.current)
                .is_some_and(Combatant::is_defeated)
            {
                log.push(format!("You defeated the {}!", self.enemies[self.current].name));
                self.current += 1;
            }
            if self.current >= self.enemies.len() {
                let outcome = CombatOutcome::for_victory(&self.rules, self.rounds);
                return Ok(self.finish(log, outcome));
            }

            if self.announced != Some(self.current) {
                self.announced = Some(self.current);
                log.push(format!("Enemy: {}", self.enemies[self.current].label()));
            }

            self.rounds += 1;
            if let Some(escape) = &self.rules.escape_after_rounds {
                if self.rounds > escape.rounds {
                    log.push("You manage to escape!".to_string());
                    let outcome = CombatOutcome::Escaped(escape.page.clone());
                    return Ok(self.finish(log, outcome));
                }
            }

            if let Some(hit) = self.fight_round(character, dice, &mut log) {
                let prompt = hit.prompt(&self.enemies);
                self.pending = Some(hit);
                return Ok(CombatProgress {
                    log,
                    state: CombatState::Awaiting(prompt),
                });
            }
        }
    }

    fn fight_round(
        &mut self,
        character: &mut Character,
        dice: &mut dyn RandomSource,
        log: &mut Vec<String>,
    ) -> Option<PendingHit> {
        let index = self.current;
        let (p_roll, p_as) = attack_strength(
            dice,
            character.skill.current,
            self.rules.player_attack_modifier,
        );
        let (e_roll, e_as) = attack_strength(dice, self.enemies[index].skill, 0);
        log.push(format!(
            "Round {}: you {p_as} ({p_roll}) vs {} {e_as} ({e_roll})",
            self.rounds, self.enemies[index].name
        ));

        let hit = match p_as.cmp(&e_as) {
            Ordering::Greater => {
                log.push("You hit!".to_string());
                PendingHit::Wound {
                    index,
                    damage: BASE_DAMAGE + self.rules.player_extra_damage_on_hit,
                }
            }
            Ordering::Less => PendingHit::Defend {
                index,
                damage: BASE_DAMAGE + self.rules.enemy_extra_damage,
            },
            Ordering::Equal => {
                log.push("Clash! No damage.".to_string());
                return None;
            }
        };
        offer_luck(hit, character, &mut self.enemies, dice, log)
    }

    fn finish(&self, log: Vec<String>, outcome: CombatOutcome) -> CombatProgress {
        tracing::debug!(rounds = self.rounds, ?outcome, "sequential combat finished");
        CombatProgress {
            log,
            state: CombatState::Finished(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::CombatPrompt;
    use crate::combat::testing::enemy;
    use crate::dice::ScriptedDice;
    use crate::id::PageId;

    fn hero() -> Character {
        Character::with_stats("Hero", "u-1", 10, 16, 10)
    }

    /// Drive a fight to the end, answering every luck prompt with `luck`.
    fn fight_out(
        combat: &mut SequentialCombat,
        character: &mut Character,
        dice: &mut dyn RandomSource,
        luck: bool,
    ) -> CombatOutcome {
        let mut answer = None;
        for _ in 0..200 {
            let progress = combat.advance(character, dice, answer).unwrap();
            match progress.state {
                CombatState::Finished(outcome) => return outcome,
                CombatState::Awaiting(_) => answer = Some(CombatAnswer::Confirm(luck)),
            }
        }
        panic!("combat did not finish");
    }

    // player 2+3+10 = 15, enemy 1+2+7 = 10, every round
    fn player_wins_every_round() -> ScriptedDice {
        ScriptedDice::new(vec![2, 3, 1, 2])
    }

    #[test]
    fn two_rounds_against_four_stamina() {
        let mut c = hero();
        let mut dice = player_wins_every_round();
        let mut combat =
            SequentialCombat::new(&[enemy("Guard", 7, 4)], CombatRules::default()).unwrap();

        let outcome = fight_out(&mut combat, &mut c, &mut dice, false);

        assert_eq!(outcome, CombatOutcome::Win);
        assert_eq!(combat.rounds(), 2);
        assert_eq!(c.stamina.current, 16);
        assert_eq!(c.luck.current, 10);
        assert_eq!(combat.last_engaged(), Some("Guard"));
    }

    #[test]
    fn hit_offers_luck_prompt() {
        let mut c = hero();
        let mut dice = player_wins_every_round();
        let mut combat =
            SequentialCombat::new(&[enemy("Guard", 7, 4)], CombatRules::default()).unwrap();
        let progress = combat.advance(&mut c, &mut dice, None).unwrap();
        assert_eq!(
            progress.state,
            CombatState::Awaiting(CombatPrompt::LuckToWound {
                enemy: "Guard".into()
            })
        );
        assert!(progress.log.iter().any(|l| l.contains("Round 1: you 15 (5) vs Guard 10 (3)")));
        assert!(combat.advance(&mut c, &mut dice, Some(CombatAnswer::Target(0))).is_err());
    }

    #[test]
    fn max_rounds_fast_and_slow() {
        let rules = CombatRules {
            max_rounds: Some(2),
            ..CombatRules::default()
        };

        let mut c = hero();
        let mut combat = SequentialCombat::new(&[enemy("Rat", 7, 4)], rules.clone()).unwrap();
        let outcome = fight_out(&mut combat, &mut c, &mut player_wins_every_round(), false);
        assert_eq!(combat.rounds(), 2);
        assert_eq!(outcome, CombatOutcome::WinFast);

        let mut c = hero();
        let mut combat = SequentialCombat::new(&[enemy("Rat", 7, 6)], rules).unwrap();
        let outcome = fight_out(&mut combat, &mut c, &mut player_wins_every_round(), false);
        assert_eq!(combat.rounds(), 3);
        assert_eq!(outcome, CombatOutcome::WinSlow);
    }

    #[test]
    fn lucky_wound_doubles_damage() {
        // round: 5 + 10 vs 3 + 7, then luck roll 1+1 <= 10
        let mut dice = ScriptedDice::new(vec![2, 3, 1, 2, 1, 1]);
        let mut c = hero();
        let mut combat =
            SequentialCombat::new(&[enemy("Guard", 7, 4)], CombatRules::default()).unwrap();
        combat.advance(&mut c, &mut dice, None).unwrap();
        let progress = combat
            .advance(&mut c, &mut dice, Some(CombatAnswer::Confirm(true)))
            .unwrap();
        assert_eq!(progress.state, CombatState::Finished(CombatOutcome::Win));
        assert_eq!(combat.rounds(), 1);
        assert_eq!(c.luck.current, 9);
    }

    #[test]
    fn unlucky_defence_adds_damage() {
        // player 1+1+10 = 12 vs enemy 6+6+7 = 19, luck roll 6+6 > 10
        let mut dice = ScriptedDice::new(vec![1, 1, 6, 6, 6, 6]);
        let mut c = hero();
        let mut combat =
            SequentialCombat::new(&[enemy("Ogre", 7, 10)], CombatRules::default()).unwrap();
        let progress = combat.advance(&mut c, &mut dice, None).unwrap();
        assert!(matches!(
            progress.state,
            CombatState::Awaiting(CombatPrompt::LuckToDefend { .. })
        ));
        combat
            .advance(&mut c, &mut dice, Some(CombatAnswer::Confirm(true)))
            .unwrap();
        assert_eq!(c.stamina.current, 13);
        assert_eq!(c.luck.current, 9);
    }

    #[test]
    fn no_luck_means_no_prompt() {
        let mut c = hero();
        c.luck.adjust(-100);
        let mut combat =
            SequentialCombat::new(&[enemy("Guard", 7, 4)], CombatRules::default()).unwrap();
        let progress = combat
            .advance(&mut c, &mut player_wins_every_round(), None)
            .unwrap();
        assert_eq!(progress.state, CombatState::Finished(CombatOutcome::Win));
    }

    #[test]
    fn enemies_fought_in_order_and_rounds_accumulate() {
        let mut c = hero();
        let mut combat = SequentialCombat::new(
            &[enemy("First", 7, 2), enemy("Second", 7, 2)],
            CombatRules::default(),
        )
        .unwrap();
        let outcome = fight_out(&mut combat, &mut c, &mut player_wins_every_round(), false);
        assert_eq!(outcome, CombatOutcome::Win);
        assert_eq!(combat.rounds(), 2);
        assert_eq!(combat.last_engaged(), Some("Second"));
        assert!(combat.enemies().iter().all(Combatant::is_defeated));
    }

    #[test]
    fn death_aborts_with_lose() {
        // player always 12, enemy always 19
        let mut dice = ScriptedDice::new(vec![1, 1, 6, 6]);
        let mut c = Character::with_stats("Hero", "u-1", 10, 3, 0);
        let mut combat = SequentialCombat::new(
            &[enemy("Ogre", 7, 10), enemy("Never", 7, 10)],
            CombatRules::default(),
        )
        .unwrap();
        let outcome = fight_out(&mut combat, &mut c, &mut dice, false);
        assert_eq!(outcome, CombatOutcome::Lose);
        assert!(c.is_dead());
        assert_eq!(combat.last_engaged(), Some("Ogre"));
    }

    #[test]
    fn escape_after_threshold() {
        let rules: CombatRules =
            serde_json::from_str(r#"{"escape_after_rounds": {"rounds": 1, "page": "77"}}"#)
                .unwrap();
        // all clashes: both sides 2+2 with equal skill
        let mut dice = ScriptedDice::new(vec![2]);
        let mut c = hero();
        let mut combat = SequentialCombat::new(&[enemy("Troll", 10, 20)], rules).unwrap();
        let outcome = fight_out(&mut combat, &mut c, &mut dice, false);
        assert_eq!(outcome, CombatOutcome::Escaped(PageId::from(77)));
        assert_eq!(combat.rounds(), 2);
    }

    #[test]
    fn attack_modifier_and_extra_damage() {
        let rules = CombatRules {
            player_attack_modifier: -2,
            player_extra_damage_on_hit: 2,
            ..CombatRules::default()
        };
        let mut c = hero();
        let mut combat = SequentialCombat::new(&[enemy("Guard", 7, 4)], rules).unwrap();
        let progress = combat
            .advance(&mut c, &mut player_wins_every_round(), None)
            .unwrap();
        assert!(progress.log.iter().any(|l| l.contains("you 13 (5) vs Guard 10")));
        let progress = combat
            .advance(&mut c, &mut ScriptedDice::default(), Some(CombatAnswer::Confirm(false)))
            .unwrap();
        assert_eq!(progress.state, CombatState::Finished(CombatOutcome::Win));
        assert_eq!(combat.rounds(), 1);
    }

    #[test]
    fn empty_enemy_list_rejected() {
        assert!(matches!(
            SequentialCombat::new(&[], CombatRules::default()),
            Err(CoreError::NoEnemies)
        ));
    }
}

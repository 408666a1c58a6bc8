//! The page state machine.
//!
//! [`PageDispatcher::step`] executes one page against a [`PlayState`]. Pages
//! that need a decision return an [`InputSpec`] instead of blocking; the
//! front end collects an [`Answer`] and calls `step` again for the same
//! page. Whatever the page needs to remember between those calls (a fight
//! in progress, the number of dice rounds played) lives in the play state,
//! not in the page.

use folio_core::combat::{CombatProgress, CombatPrompt, CombatState};
use folio_core::dice::{roll_sum, test_luck, test_skill};
use folio_core::{
    Character, CombatAnswer, CombatOutcome, CoreError, CoreResult, EnemyTemplate, PageId,
    RandomSource, SequentialCombat, SimultaneousCombat, apply_effects,
};

use crate::error::{StoryError, StoryResult};
use crate::graph::EnemyCatalog;
use crate::page::{
    DiceGameKind, DiceGameRules, GAME_OVER_SENTINEL, OrderedMap, Outcomes, PageKind, PageNode,
    Requirement,
};

/// The last enemy fought, kept for the session only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatMemory {
    last_enemy: Option<String>,
}

impl CombatMemory {
    /// Remember `name` as the last enemy fought.
    pub fn record(&mut self, name: impl Into<String>) {
        self.last_enemy = Some(name.into());
    }

    /// The last enemy fought, if any.
    pub fn last_enemy(&self) -> Option<&str> {
        self.last_enemy.as_deref()
    }

    /// Whether the last enemy's name contains `fragment`, ignoring case.
    pub fn fought(&self, fragment: &str) -> bool {
        let last = self.last_enemy.as_deref().unwrap_or_default().to_lowercase();
        last.contains(&fragment.to_lowercase())
    }
}

/// A decision the front end must collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Pick one option by index.
    Select {
        /// Question to show.
        prompt: String,
        /// Option labels; answer with the 0-based index.
        options: Vec<String>,
    },
    /// Yes or no.
    Confirm {
        /// Question to show.
        prompt: String,
    },
    /// A non-negative number.
    Count {
        /// Question to show.
        prompt: String,
    },
}

/// Commands available at every prompt, handled by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Show the adventure sheet.
    Stats,
    /// Eat a provision.
    Eat,
    /// Stop playing; progress stays as last saved.
    Quit,
}

/// The player's reply to an [`InputSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// 0-based option index.
    Select(usize),
    /// Yes or no.
    Confirm(bool),
    /// A number.
    Count(u32),
    /// A global command.
    Command(SessionCommand),
}

/// How an adventure ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Reached a `game_over` page or a game-over roll.
    GameOver,
    /// Reached a `victory` page.
    Victory,
}

/// Result of dispatching a page once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Page to move to, when the page is done.
    pub next: Option<PageId>,
    /// Set when the adventure is over.
    pub terminal: Option<Terminal>,
    /// Set when the page needs an answer before it can finish.
    pub awaiting: Option<InputSpec>,
    /// Text for the player.
    pub display: String,
}

/// A fight suspended on a prompt.
#[derive(Debug, Clone)]
enum Fight {
    Sequential(Box<SequentialCombat>),
    Simultaneous(Box<SimultaneousCombat>),
}

impl Fight {
    fn advance(
        &mut self,
        character: &mut Character,
        dice: &mut dyn RandomSource,
        answer: Option<CombatAnswer>,
    ) -> CoreResult<CombatProgress> {
        match self {
            Self::Sequential(c) => c.advance(character, dice, answer),
            Self::Simultaneous(c) => c.advance(character, dice, answer),
        }
    }

    fn last_engaged(&self) -> Option<&str> {
        match self {
            Self::Sequential(c) => c.last_engaged(),
            Self::Simultaneous(c) => c.last_engaged(),
        }
    }
}

#[derive(Debug, Clone)]
enum Interaction {
    Choice,
    Transaction,
    Shop,
    PawnShop,
    HighRoll { plays: u32 },
    SpecialHeal,
    Fight(Fight),
}

#[derive(Debug, Clone)]
struct Pending {
    page: PageId,
    spec: InputSpec,
    interaction: Interaction,
}

/// Everything dispatch mutates: the character, the session's combat
/// memory, and the decision currently awaited.
#[derive(Debug, Clone)]
pub struct PlayState {
    /// The player character.
    pub character: Character,
    /// Last enemy fought.
    pub memory: CombatMemory,
    pending: Option<Pending>,
}

impl PlayState {
    /// Fresh state for a character.
    pub fn new(character: Character) -> Self {
        Self {
            character,
            memory: CombatMemory::default(),
            pending: None,
        }
    }

    /// The decision currently awaited, if any.
    pub fn pending_input(&self) -> Option<&InputSpec> {
        self.pending.as_ref().map(|p| &p.spec)
    }

    /// Drop any half-finished interaction.
    pub fn abandon(&mut self) {
        self.pending = None;
    }
}

#[derive(Debug, Default)]
struct Output {
    lines: Vec<String>,
}

impl Output {
    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn step(self) -> Step {
        Step {
            next: None,
            terminal: None,
            awaiting: None,
            display: self.lines.join("\n"),
        }
    }

    fn goto(self, next: &PageId) -> Step {
        Step {
            next: Some(next.clone()),
            ..self.step()
        }
    }

    fn end(self, terminal: Terminal) -> Step {
        Step {
            terminal: Some(terminal),
            ..self.step()
        }
    }

    fn wait(
        self,
        play: &mut PlayState,
        page: &PageId,
        spec: InputSpec,
        interaction: Interaction,
    ) -> Step {
        play.pending = Some(Pending {
            page: page.clone(),
            spec: spec.clone(),
            interaction,
        });
        Step {
            awaiting: Some(spec),
            ..self.step()
        }
    }

    fn invalid(
        mut self,
        play: &mut PlayState,
        page: &PageId,
        spec: InputSpec,
        interaction: Interaction,
    ) -> Step {
        self.line("Invalid choice.");
        self.wait(play, page, spec, interaction)
    }
}

/// Executes pages.
#[derive(Debug, Clone, Copy)]
pub struct PageDispatcher<'a> {
    enemies: &'a EnemyCatalog,
}

impl<'a> PageDispatcher<'a> {
    /// A dispatcher that resolves combat against `enemies`.
    pub fn new(enemies: &'a EnemyCatalog) -> Self {
        Self { enemies }
    }

    /// Execute `page` (whose id is `page_id`) once.
    ///
    /// On first entry `answer` is ignored. When the previous step for this
    /// page returned `awaiting`, `answer` resolves it; `None` or an answer
    /// that does not fit re-requests the same input without changing
    /// anything. Errors are fatal to the session.
    pub fn step(
        &self,
        play: &mut PlayState,
        dice: &mut dyn RandomSource,
        page_id: &PageId,
        page: &PageNode,
        answer: Option<Answer>,
    ) -> StoryResult<Step> {
        let pending = play.pending.take().filter(|p| &p.page == page_id);
        let mut out = Output::default();

        match pending {
            None => {
                tracing::debug!(page = %page_id, kind = page.kind.type_name(), "entering page");
                if !page.text.is_empty() && !is_silent(&page.kind) {
                    out.line(page.text.clone());
                }
                self.enter(play, dice, page_id, &page.kind, out)
            }
            Some(pending) => match answer {
                Some(answer) => self.resume(play, dice, page_id, &page.kind, pending, answer),
                None => Ok(out.wait(play, page_id, pending.spec, pending.interaction)),
            },
        }
    }

    fn enter(
        &self,
        play: &mut PlayState,
        dice: &mut dyn RandomSource,
        page_id: &PageId,
        kind: &PageKind,
        mut out: Output,
    ) -> StoryResult<Step> {
        match kind {
            PageKind::Choice { choices } => {
                let options = choices.entries().iter().map(|(l, _)| l.clone()).collect();
                let spec = InputSpec::Select {
                    prompt: "Make your choice".to_string(),
                    options,
                };
                Ok(out.wait(play, page_id, spec, Interaction::Choice))
            }

            PageKind::Auto { next } => Ok(out.goto(next)),

            PageKind::Effect { effects, next } => {
                let summary = apply_effects(&mut play.character, effects, dice);
                out.line(format!("Update: {summary}"));
                Ok(out.goto(next))
            }

            PageKind::RandomEffect {
                effect_template,
                next,
            } => {
                let roll = roll_sum(dice, 1);
                out.line(format!("You rolled a {roll}."));
                let delta = effect_template.resolve(roll)?;
                let summary = apply_effects(&mut play.character, &delta, dice);
                out.line(format!("Result: {summary}"));
                Ok(out.goto(next))
            }

            PageKind::LuckTest { outcomes } => {
                let lucky = luck_test(play, dice, &mut out);
                Ok(out.goto(outcomes.get(page_id, luck_key(lucky))?))
            }

            PageKind::LuckTestDouble { outcomes } => {
                let first = luck_key(luck_test(play, dice, &mut out));
                let second = luck_key(luck_test(play, dice, &mut out));
                let key = format!("{first}_{second}");
                Ok(out.goto(outcomes.get(page_id, &key)?))
            }

            PageKind::SkillTest { outcomes } => {
                let check = test_skill(dice, &play.character);
                let (verdict, key) = if check.passed {
                    ("SUCCESS!", "success")
                } else {
                    ("FAILURE!", "failure")
                };
                out.line(format!("Testing your Skill: {check}. {verdict}"));
                Ok(out.goto(outcomes.get(page_id, key)?))
            }

            PageKind::RandomTest { outcomes } => {
                let roll = roll_sum(dice, 1);
                out.line(format!("You rolled a {roll}."));
                let target =
                    random_test_target(outcomes, roll).ok_or_else(|| StoryError::MissingOutcome {
                        page: page_id.clone(),
                        key: roll.to_string(),
                    })?;
                if target.as_str() == GAME_OVER_SENTINEL {
                    out.line("Bad luck.");
                    return Ok(out.end(Terminal::GameOver));
                }
                Ok(out.goto(target))
            }

            PageKind::ConditionItem { check, outcomes } => {
                branch(page_id, outcomes, play.character.has_item(&check.item), out)
            }

            PageKind::ConditionItemAny { checks, outcomes } => {
                let held = checks.iter().any(|c| play.character.has_item(&c.item));
                branch(page_id, outcomes, held, out)
            }

            PageKind::ConditionMulti { checks, outcomes } => {
                let character = &play.character;
                let passed = checks.iter().all(|check| match check {
                    Requirement::Item { value } => character.has_item(value),
                    Requirement::Gold { value } => character.gold >= *value,
                });
                branch(page_id, outcomes, passed, out)
            }

            PageKind::ConditionGold { check, outcomes } => {
                branch(page_id, outcomes, play.character.gold >= check.amount, out)
            }

            PageKind::ConditionCombat { check, outcomes } => {
                let fought = play.memory.fought(&check.last_enemy_fought);
                branch(page_id, outcomes, fought, out)
            }

            PageKind::RandomEncounter {
                encounters,
                rules,
                outcomes,
            } => {
                let roll = roll_sum(dice, 1).to_string();
                let enemy_id = encounters
                    .get(&roll)
                    .ok_or_else(|| StoryError::MissingOutcome {
                        page: page_id.clone(),
                        key: roll.clone(),
                    })?;
                let template = self.enemies.get(enemy_id)?;
                out.line(format!("You rolled a {roll}. A {} appears!", template.name));
                let combat = SequentialCombat::new(std::slice::from_ref(template), rules.clone())?;
                let fight = Fight::Sequential(Box::new(combat));
                run_fight(play, dice, FightRoute::new(page_id, outcomes), fight, None, out)
            }

            PageKind::Combat {
                enemies,
                rules,
                outcomes,
            } => {
                let templates = self.templates(enemies)?;
                out.line("COMBAT BEGINS");
                let combat = SequentialCombat::new(&templates, rules.clone())?;
                let fight = Fight::Sequential(Box::new(combat));
                run_fight(play, dice, FightRoute::new(page_id, outcomes), fight, None, out)
            }

            PageKind::MultiCombat {
                enemies,
                rules,
                outcomes,
            } => {
                let templates = self.templates(enemies)?;
                out.line("SIMULTANEOUS COMBAT: you must defend against every enemy, but can only wound one per round.");
                let combat = SimultaneousCombat::new(&templates, rules.clone())?;
                let fight = Fight::Simultaneous(Box::new(combat));
                run_fight(play, dice, FightRoute::new(page_id, outcomes), fight, None, out)
            }

            PageKind::Transaction { choices } => {
                let options = choices
                    .entries()
                    .iter()
                    .map(|(label, offer)| match offer.cost {
                        0 => label.clone(),
                        cost => format!("{label} ({cost} Gold)"),
                    })
                    .collect();
                let spec = InputSpec::Select {
                    prompt: "Select an option".to_string(),
                    options,
                };
                Ok(out.wait(play, page_id, spec, Interaction::Transaction))
            }

            PageKind::Shop { items, .. } | PageKind::ShopMulti { items, .. } => {
                Ok(shop_prompt(play, page_id, items, out))
            }

            PageKind::PawnShop { items, next } => Ok(pawn_prompt(play, page_id, items, next, out)),

            PageKind::DiceGame { rules, next } => match rules.game_type {
                DiceGameKind::HighRoll => Ok(high_roll_prompt(play, page_id, rules, next, 0, out)),
                DiceGameKind::HotPotato => {
                    hot_potato(play, dice, rules.wager(), &mut out);
                    Ok(out.goto(next))
                }
            },

            PageKind::SpecialHeal { .. } => {
                let spec = InputSpec::Count {
                    prompt: "How many arrows hit you? (0 if none)".to_string(),
                };
                Ok(out.wait(play, page_id, spec, Interaction::SpecialHeal))
            }

            PageKind::GameOver => Ok(out.end(Terminal::GameOver)),

            PageKind::Victory => Ok(out.end(Terminal::Victory)),

            PageKind::Unknown { type_name } => {
                tracing::warn!(page = %page_id, type_name = %type_name, "unknown page type");
                Err(StoryError::UnknownNodeType {
                    page: page_id.clone(),
                    type_name: type_name.clone(),
                })
            }
        }
    }

    fn resume(
        &self,
        play: &mut PlayState,
        dice: &mut dyn RandomSource,
        page_id: &PageId,
        kind: &PageKind,
        pending: Pending,
        answer: Answer,
    ) -> StoryResult<Step> {
        let Pending {
            spec, interaction, ..
        } = pending;
        let mut out = Output::default();

        match (interaction, kind) {
            (Interaction::Choice, PageKind::Choice { choices }) => {
                match select(answer).and_then(|i| choices.entries().get(i)) {
                    Some((_, next)) => Ok(out.goto(next)),
                    None => Ok(out.invalid(play, page_id, spec, Interaction::Choice)),
                }
            }

            (Interaction::Transaction, PageKind::Transaction { choices }) => {
                let Some((_, offer)) = select(answer).and_then(|i| choices.entries().get(i))
                else {
                    return Ok(out.invalid(play, page_id, spec, Interaction::Transaction));
                };
                if offer.cost > 0 {
                    if !play.character.spend_gold(offer.cost) {
                        out.line(format!(
                            "Not enough gold! You have {}, need {}.",
                            play.character.gold, offer.cost
                        ));
                        return Ok(out.wait(play, page_id, spec, Interaction::Transaction));
                    }
                    out.line(format!("You pay {} Gold.", offer.cost));
                }
                if let Some(effect) = &offer.effect {
                    let summary = apply_effects(&mut play.character, effect, dice);
                    out.line(format!("Effect: {summary}"));
                }
                Ok(out.goto(&offer.next))
            }

            (
                Interaction::Shop,
                PageKind::Shop { items, next } | PageKind::ShopMulti { items, next },
            ) => {
                let Some(index) = select(answer).filter(|&i| i <= items.len()) else {
                    return Ok(out.invalid(play, page_id, spec, Interaction::Shop));
                };
                let Some((name, cost)) = items.entries().get(index) else {
                    out.line("You leave the shop.");
                    return Ok(out.goto(next));
                };
                if play.character.spend_gold(*cost) {
                    play.character.add_item(name);
                    out.line(format!("Bought {name}!"));
                } else {
                    out.line("Not enough gold!");
                }
                Ok(shop_prompt(play, page_id, items, out))
            }

            (Interaction::PawnShop, PageKind::PawnShop { items, next }) => {
                let offers = sellable(items, &play.character);
                let Some(index) = select(answer).filter(|&i| i <= offers.len()) else {
                    return Ok(out.invalid(play, page_id, spec, Interaction::PawnShop));
                };
                let Some(&(name, price)) = offers.get(index) else {
                    out.line("You leave.");
                    return Ok(out.goto(next));
                };
                play.character.remove_item(name);
                play.character.gold = play.character.gold.saturating_add(price);
                out.line(format!("Sold {name} for {price} Gold."));
                Ok(pawn_prompt(play, page_id, items, next, out))
            }

            (Interaction::HighRoll { plays }, PageKind::DiceGame { rules, next }) => {
                match answer {
                    Answer::Confirm(true) => {
                        high_roll(play, dice, rules.stake(), &mut out);
                        Ok(high_roll_prompt(play, page_id, rules, next, plays + 1, out))
                    }
                    Answer::Confirm(false) => Ok(out.goto(next)),
                    _ => Ok(out.invalid(play, page_id, spec, Interaction::HighRoll { plays })),
                }
            }

            (
                Interaction::SpecialHeal,
                PageKind::SpecialHeal {
                    heal_per_arrow,
                    effects,
                    next,
                },
            ) => {
                let Answer::Count(arrows) = answer else {
                    return Ok(out.invalid(play, page_id, spec, Interaction::SpecialHeal));
                };
                if arrows > 0 {
                    let per = (*heal_per_arrow).max(0);
                    let total = i32::try_from(arrows).unwrap_or(i32::MAX).saturating_mul(per);
                    play.character.heal(total);
                    out.line(format!("Regained {total} STAMINA."));
                }
                if let Some(effects) = effects {
                    let summary = apply_effects(&mut play.character, effects, dice);
                    out.line(format!("Exchange: {summary}"));
                }
                Ok(out.goto(next))
            }

            (
                Interaction::Fight(fight),
                PageKind::Combat { outcomes, .. }
                | PageKind::MultiCombat { outcomes, .. }
                | PageKind::RandomEncounter { outcomes, .. },
            ) => {
                let combat_answer = match answer {
                    Answer::Confirm(yes) => CombatAnswer::Confirm(yes),
                    Answer::Select(i) => CombatAnswer::Target(i),
                    _ => return Ok(out.invalid(play, page_id, spec, Interaction::Fight(fight))),
                };
                let route = FightRoute {
                    retry: Some(spec),
                    ..FightRoute::new(page_id, outcomes)
                };
                run_fight(play, dice, route, fight, Some(combat_answer), out)
            }

            // The story is immutable, so this only happens if a caller
            // handed us a different page under the same id. Start over.
            _ => self.enter(play, dice, page_id, kind, out),
        }
    }

    fn templates(&self, ids: &[String]) -> StoryResult<Vec<EnemyTemplate>> {
        ids.iter()
            .map(|id| self.enemies.get(id).cloned())
            .collect()
    }
}

/// Condition pages show nothing; they only route.
fn is_silent(kind: &PageKind) -> bool {
    matches!(
        kind,
        PageKind::ConditionItem { .. }
            | PageKind::ConditionItemAny { .. }
            | PageKind::ConditionMulti { .. }
            | PageKind::ConditionGold { .. }
            | PageKind::ConditionCombat { .. }
    )
}

fn select(answer: Answer) -> Option<usize> {
    match answer {
        Answer::Select(i) => Some(i),
        _ => None,
    }
}

fn branch(page: &PageId, outcomes: &Outcomes, passed: bool, out: Output) -> StoryResult<Step> {
    let key = if passed { "success" } else { "failure" };
    Ok(out.goto(outcomes.get(page, key)?))
}

fn luck_key(lucky: bool) -> &'static str {
    if lucky { "lucky" } else { "unlucky" }
}

fn luck_test(play: &mut PlayState, dice: &mut dyn RandomSource, out: &mut Output) -> bool {
    let check = test_luck(dice, &mut play.character);
    let verdict = if check.passed { "LUCKY!" } else { "UNLUCKY!" };
    out.line(format!(
        "Testing your Luck: {check}. {verdict} (LUCK now {})",
        play.character.luck
    ));
    check.passed
}

/// Exact roll, then the first `"a-b"` range containing it, then the first
/// listed outcome.
fn random_test_target(outcomes: &OrderedMap<PageId>, roll: u32) -> Option<&PageId> {
    outcomes
        .get(&roll.to_string())
        .or_else(|| {
            outcomes
                .entries()
                .iter()
                .find(|(key, _)| parse_range(key).is_some_and(|(lo, hi)| (lo..=hi).contains(&roll)))
                .map(|(_, page)| page)
        })
        .or_else(|| outcomes.entries().first().map(|(_, page)| page))
}

fn parse_range(key: &str) -> Option<(u32, u32)> {
    let (lo, hi) = key.split_once('-')?;
    Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?))
}

/// Where a fight routes when it ends.
struct FightRoute<'p> {
    page: &'p PageId,
    outcomes: &'p Outcomes,
    /// Input to re-request when the resolver rejects an answer.
    retry: Option<InputSpec>,
}

impl<'p> FightRoute<'p> {
    fn new(page: &'p PageId, outcomes: &'p Outcomes) -> Self {
        Self {
            page,
            outcomes,
            retry: None,
        }
    }
}

fn run_fight(
    play: &mut PlayState,
    dice: &mut dyn RandomSource,
    route: FightRoute<'_>,
    mut fight: Fight,
    answer: Option<CombatAnswer>,
    mut out: Output,
) -> StoryResult<Step> {
    let FightRoute {
        page: page_id,
        outcomes,
        retry,
    } = route;
    let progress = match fight.advance(&mut play.character, dice, answer) {
        Ok(progress) => progress,
        Err(CoreError::CombatError(reason)) => {
            out.line(reason);
            return match retry {
                Some(spec) => Ok(out.wait(play, page_id, spec, Interaction::Fight(fight))),
                None => Err(CoreError::CombatError("combat stalled".to_string()).into()),
            };
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(name) = fight.last_engaged() {
        play.memory.record(name);
    }
    for line in progress.log {
        out.line(line);
    }

    match progress.state {
        CombatState::Awaiting(prompt) => {
            let spec = match &prompt {
                CombatPrompt::ChooseTarget { options } => InputSpec::Select {
                    prompt: prompt.to_string(),
                    options: options.clone(),
                },
                _ => InputSpec::Confirm {
                    prompt: prompt.to_string(),
                },
            };
            Ok(out.wait(play, page_id, spec, Interaction::Fight(fight)))
        }
        CombatState::Finished(CombatOutcome::Escaped(page)) => Ok(out.goto(&page)),
        CombatState::Finished(outcome) => {
            let key = outcome.key().unwrap_or("win");
            match outcome {
                CombatOutcome::Lose => out.line("You have been defeated."),
                CombatOutcome::WinFast => out.line("You defeated them quickly!"),
                CombatOutcome::WinSlow => out.line("You won, but the fight took too long..."),
                _ => out.line("You are victorious!"),
            }
            Ok(out.goto(outcomes.get(page_id, key)?))
        }
    }
}

fn shop_prompt(
    play: &mut PlayState,
    page_id: &PageId,
    items: &OrderedMap<u32>,
    out: Output,
) -> Step {
    let mut options: Vec<String> = items
        .entries()
        .iter()
        .map(|(name, cost)| format!("{name} - {cost} Gold"))
        .collect();
    options.push("Leave shop".to_string());
    let spec = InputSpec::Select {
        prompt: format!("Your gold: {}. Buy which item?", play.character.gold),
        options,
    };
    out.wait(play, page_id, spec, Interaction::Shop)
}

/// Items the pawn shop buys that the character holds, in the shop's order.
fn sellable<'i>(items: &'i OrderedMap<u32>, character: &Character) -> Vec<(&'i str, u32)> {
    items
        .entries()
        .iter()
        .filter(|(name, _)| character.has_item(name))
        .map(|(name, price)| (name.as_str(), *price))
        .collect()
}

fn pawn_prompt(
    play: &mut PlayState,
    page_id: &PageId,
    items: &OrderedMap<u32>,
    next: &PageId,
    mut out: Output,
) -> Step {
    let offers = sellable(items, &play.character);
    if offers.is_empty() {
        out.line("You have nothing else to sell here.");
        return out.goto(next);
    }
    let mut options: Vec<String> = offers
        .iter()
        .map(|(name, price)| format!("Sell {name} for {price} Gold"))
        .collect();
    options.push("Leave".to_string());
    let spec = InputSpec::Select {
        prompt: format!("Your gold: {}. Sell what?", play.character.gold),
        options,
    };
    out.wait(play, page_id, spec, Interaction::PawnShop)
}

fn high_roll_prompt(
    play: &mut PlayState,
    page_id: &PageId,
    rules: &DiceGameRules,
    next: &PageId,
    plays: u32,
    out: Output,
) -> Step {
    let stake = rules.stake();
    if plays >= rules.max_plays() || play.character.gold < stake {
        return out.goto(next);
    }
    let spec = InputSpec::Confirm {
        prompt: format!(
            "Gold: {}. Stake: {stake}. Play a round?",
            play.character.gold
        ),
    };
    out.wait(play, page_id, spec, Interaction::HighRoll { plays })
}

fn high_roll(play: &mut PlayState, dice: &mut dyn RandomSource, stake: u32, out: &mut Output) {
    let mine = roll_sum(dice, 2);
    let theirs = roll_sum(dice, 2);
    out.line(format!("You rolled {mine}, your opponent rolled {theirs}."));
    let gold = &mut play.character.gold;
    match mine.cmp(&theirs) {
        std::cmp::Ordering::Greater => {
            let winnings = stake.saturating_mul(4);
            *gold = gold.saturating_add(winnings);
            out.line(format!("You win {winnings} Gold!"));
        }
        std::cmp::Ordering::Less => {
            *gold = gold.saturating_sub(stake);
            out.line(format!("You lose {stake} Gold."));
        }
        std::cmp::Ordering::Equal => out.line("A draw."),
    }
}

fn hot_potato(play: &mut PlayState, dice: &mut dyn RandomSource, wager: u32, out: &mut Output) {
    let gold = &mut play.character.gold;
    loop {
        let mine = dice.d6();
        out.line(format!("You roll {mine}."));
        if mine == 1 {
            *gold = gold.saturating_sub(wager);
            out.line(format!("You rolled a 1! You lose {wager} Gold."));
            return;
        }
        let theirs = dice.d6();
        out.line(format!("Your opponent rolls {theirs}."));
        if theirs == 1 {
            *gold = gold.saturating_add(wager);
            out.line(format!("Your opponent rolled a 1! You win {wager} Gold."));
            return;
        }
    }
}

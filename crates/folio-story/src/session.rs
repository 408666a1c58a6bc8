//! Play sessions.
//!
//! A [`GameSession`] owns one player's character while they play. Each call
//! to [`GameSession::advance`] runs the current page through the
//! dispatcher and then settles the result: save and move on, wait for an
//! answer, or end the adventure. Death and terminal pages delete the saved
//! character; everything else leaves the last completed page on disk.

use std::sync::Arc;

use folio_core::{Character, PageId, RandomSource, SeededDice};

use crate::config::SessionConfig;
use crate::dispatch::{Answer, InputSpec, PageDispatcher, PlayState, SessionCommand, Terminal};
use crate::error::{StoryError, StoryResult};
use crate::graph::{EnemyCatalog, StoryGraph};
use crate::store::CharacterStore;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// STAMINA reached zero.
    Death,
    /// A game-over page or roll.
    GameOver,
    /// A victory page.
    Victory,
    /// The player quit.
    Quit,
    /// Input ran out mid-adventure.
    Paused,
}

impl EndReason {
    /// Whether the adventure is over for good and the character is gone.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Death | Self::GameOver | Self::Victory)
    }
}

impl From<Terminal> for EndReason {
    fn from(terminal: Terminal) -> Self {
        match terminal {
            Terminal::GameOver => Self::GameOver,
            Terminal::Victory => Self::Victory,
        }
    }
}

/// What one call to [`GameSession::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Moved from one page to another and saved.
    Advanced {
        /// The page just resolved.
        from: PageId,
        /// The page the character now stands on.
        to: PageId,
        /// What happened on `from`.
        display: String,
    },
    /// The current page needs an answer.
    Awaiting {
        /// The page waiting on the player.
        page: PageId,
        /// Page text and anything resolved before the question.
        display: String,
        /// The answer the page expects.
        input: InputSpec,
    },
    /// A command ran; nothing moved.
    Noted {
        /// Command output.
        display: String,
    },
    /// The session is over.
    Ended {
        /// Closing text.
        display: String,
        /// Why play stopped.
        reason: EndReason,
    },
}

impl Progress {
    /// Text for the player.
    pub fn display(&self) -> &str {
        match self {
            Self::Advanced { display, .. }
            | Self::Awaiting { display, .. }
            | Self::Noted { display }
            | Self::Ended { display, .. } => display,
        }
    }
}

/// Roll a new character for `user_id` on the configured start page and
/// save it. Fails if the player already has one.
pub fn create_character<S: CharacterStore>(
    store: &S,
    user_id: &str,
    name: &str,
    config: &SessionConfig,
) -> StoryResult<Character> {
    if store.load(user_id)?.is_some() {
        return Err(StoryError::CharacterExists(user_id.to_string()));
    }
    let mut dice = SeededDice::new(config.seed);
    let character = Character::roll(name, user_id, config.start_page.clone(), &mut dice);
    store.save(&character)?;
    tracing::info!(user = %user_id, name = %character.name, "character created");
    Ok(character)
}

/// One player's run through a story.
pub struct GameSession<S: CharacterStore> {
    story: Arc<StoryGraph>,
    enemies: Arc<EnemyCatalog>,
    store: S,
    dice: Box<dyn RandomSource>,
    play: PlayState,
    ended: bool,
}

impl<S: CharacterStore> GameSession<S> {
    /// Resume `user_id`'s saved character.
    pub fn load(
        story: Arc<StoryGraph>,
        enemies: Arc<EnemyCatalog>,
        store: S,
        user_id: &str,
        config: &SessionConfig,
    ) -> StoryResult<Self> {
        let character = store
            .load(user_id)?
            .ok_or_else(|| StoryError::NoCharacter(user_id.to_string()))?;
        tracing::info!(user = %user_id, page = %character.current_page, "session started");
        Ok(Self {
            story,
            enemies,
            store,
            dice: Box::new(SeededDice::new(config.seed)),
            play: PlayState::new(character),
            ended: false,
        })
    }

    /// Replace the dice.
    pub fn with_dice(mut self, dice: impl RandomSource + 'static) -> Self {
        self.dice = Box::new(dice);
        self
    }

    /// The character being played.
    pub fn character(&self) -> &Character {
        &self.play.character
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the session has stopped accepting answers.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// The input the current page is waiting for, if any.
    pub fn awaiting(&self) -> Option<&InputSpec> {
        self.play.pending_input()
    }

    /// Run the current page.
    ///
    /// Pass `None` when entering a page, and the player's answer when the
    /// previous call returned [`Progress::Awaiting`]. Commands are accepted
    /// at any time. An error ends the session without saving.
    pub fn advance(&mut self, answer: Option<Answer>) -> StoryResult<Progress> {
        if self.ended {
            return Err(StoryError::SessionEnded);
        }
        if let Some(Answer::Command(command)) = answer {
            return self.command(command);
        }

        let result = self.run_page(answer);
        if let Err(e) = &result {
            self.ended = true;
            self.play.abandon();
            tracing::warn!(
                user = %self.play.character.user_id,
                page = %self.play.character.current_page,
                error = %e,
                "session aborted"
            );
        }
        result
    }

    /// Stop because input ran out. Progress stays as last saved.
    pub fn pause(&mut self) -> Progress {
        self.ended = true;
        self.play.abandon();
        Progress::Ended {
            display: format!(
                "Adventure paused at page {}.",
                self.play.character.current_page
            ),
            reason: EndReason::Paused,
        }
    }

    fn run_page(&mut self, answer: Option<Answer>) -> StoryResult<Progress> {
        let from = self.play.character.current_page.clone();
        let page = self.story.get(&from)?;
        let step = PageDispatcher::new(&self.enemies).step(
            &mut self.play,
            self.dice.as_mut(),
            &from,
            page,
            answer,
        )?;

        if let Some(input) = step.awaiting {
            return Ok(Progress::Awaiting {
                page: from,
                display: step.display,
                input,
            });
        }

        if let Some(terminal) = step.terminal {
            return self.finish(step.display, terminal.into());
        }

        if self.play.character.is_dead() {
            let display = join(step.display, "Your STAMINA has reached 0.");
            return self.finish(display, EndReason::Death);
        }

        let Some(to) = step.next else {
            return Ok(Progress::Noted {
                display: step.display,
            });
        };
        if !self.story.contains(&to) {
            return Err(StoryError::PageNotFound(to));
        }

        self.play.character.current_page = to.clone();
        self.store.save(&self.play.character)?;
        tracing::debug!(from = %from, to = %to, "page advanced");
        Ok(Progress::Advanced {
            from,
            to,
            display: step.display,
        })
    }

    fn finish(&mut self, display: String, reason: EndReason) -> StoryResult<Progress> {
        self.ended = true;
        self.play.abandon();
        self.store.delete(&self.play.character.user_id)?;
        tracing::info!(user = %self.play.character.user_id, ?reason, "adventure over");
        Ok(Progress::Ended { display, reason })
    }

    fn command(&mut self, command: SessionCommand) -> StoryResult<Progress> {
        let display = match command {
            SessionCommand::Stats => self.play.character.to_string(),
            SessionCommand::Eat => self.play.character.eat_provision().to_string(),
            SessionCommand::Quit => {
                self.ended = true;
                self.play.abandon();
                return Ok(Progress::Ended {
                    display: format!(
                        "Farewell. Your adventure is saved at page {}.",
                        self.play.character.current_page
                    ),
                    reason: EndReason::Quit,
                });
            }
        };

        Ok(match self.play.pending_input() {
            Some(input) => Progress::Awaiting {
                page: self.play.character.current_page.clone(),
                display,
                input: input.clone(),
            },
            None => Progress::Noted { display },
        })
    }
}

fn join(display: String, line: &str) -> String {
    if display.is_empty() {
        line.to_string()
    } else {
        format!("{display}\n{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use folio_core::ScriptedDice;

    const STORY: &str = r#"{
        "1": {"text": "The city gates.", "type": "auto", "next": 2},
        "2": {"text": "A fork.", "choices": {"Market": 3, "Alley": 4, "Nowhere": 99}},
        "3": {"type": "victory", "text": "You find the wizard."},
        "4": {"type": "effect", "text": "A trap!", "effects": {"stamina": -100}, "next": 2}
    }"#;

    fn session(store: MemoryStore) -> GameSession<MemoryStore> {
        let story = Arc::new(StoryGraph::from_json_str(STORY).unwrap());
        let enemies = Arc::new(EnemyCatalog::default());
        GameSession::load(story, enemies, store, "p1", &SessionConfig::default())
            .unwrap()
            .with_dice(ScriptedDice::new(vec![3]))
    }

    fn store_with_hero() -> MemoryStore {
        let store = MemoryStore::new();
        create_character(&store, "p1", "Hero", &SessionConfig::default().with_seed(5)).unwrap();
        store
    }

    #[test]
    fn create_rejects_duplicates() {
        let store = store_with_hero();
        let hero = store.load("p1").unwrap().unwrap();
        assert_eq!(hero.current_page, PageId::from(1));
        assert!((7..=12).contains(&hero.skill.max));
        assert!(matches!(
            create_character(&store, "p1", "Again", &SessionConfig::default()),
            Err(StoryError::CharacterExists(_))
        ));
    }

    #[test]
    fn load_requires_character() {
        let story = Arc::new(StoryGraph::from_json_str(STORY).unwrap());
        let result = GameSession::load(
            story,
            Arc::new(EnemyCatalog::default()),
            MemoryStore::new(),
            "ghost",
            &SessionConfig::default(),
        );
        assert!(matches!(result, Err(StoryError::NoCharacter(id)) if id == "ghost"));
    }

    #[test]
    fn advancing_saves_each_page() {
        let mut s = session(store_with_hero());

        let progress = s.advance(None).unwrap();
        assert_eq!(
            progress,
            Progress::Advanced {
                from: PageId::from(1),
                to: PageId::from(2),
                display: "The city gates.".into(),
            }
        );
        let saved = s.store().load("p1").unwrap().unwrap();
        assert_eq!(saved.current_page, PageId::from(2));

        let progress = s.advance(None).unwrap();
        assert!(matches!(progress, Progress::Awaiting { .. }));
        assert!(s.awaiting().is_some());
    }

    #[test]
    fn commands_keep_the_prompt() {
        let mut s = session(store_with_hero());
        s.advance(None).unwrap();
        let Progress::Awaiting { input, .. } = s.advance(None).unwrap() else {
            panic!("expected a prompt");
        };

        let stats = s.advance(Some(Answer::Command(SessionCommand::Stats))).unwrap();
        match stats {
            Progress::Awaiting {
                display, input: i, ..
            } => {
                assert!(display.contains("Adventure Sheet"));
                assert_eq!(i, input);
            }
            other => panic!("unexpected {other:?}"),
        }

        let eat = s.advance(Some(Answer::Command(SessionCommand::Eat))).unwrap();
        assert!(eat.display().contains("already full"));
    }

    #[test]
    fn victory_deletes_character() {
        let mut s = session(store_with_hero());
        s.advance(None).unwrap();
        s.advance(None).unwrap();
        s.advance(Some(Answer::Select(0))).unwrap();
        let end = s.advance(None).unwrap();
        assert_eq!(
            end,
            Progress::Ended {
                display: "You find the wizard.".into(),
                reason: EndReason::Victory,
            }
        );
        assert!(s.is_ended());
        assert!(s.store().is_empty());
        assert!(matches!(s.advance(None), Err(StoryError::SessionEnded)));
    }

    #[test]
    fn death_deletes_character() {
        let mut s = session(store_with_hero());
        s.advance(None).unwrap();
        s.advance(None).unwrap();
        s.advance(Some(Answer::Select(1))).unwrap();
        let end = s.advance(None).unwrap();
        assert!(matches!(
            end,
            Progress::Ended {
                reason: EndReason::Death,
                ..
            }
        ));
        assert!(end.display().ends_with("Your STAMINA has reached 0."));
        assert!(s.store().load("p1").unwrap().is_none());
    }

    #[test]
    fn missing_page_ends_without_saving() {
        let mut s = session(store_with_hero());
        s.advance(None).unwrap();
        s.advance(None).unwrap();
        let err = s.advance(Some(Answer::Select(2))).unwrap_err();
        assert!(matches!(err, StoryError::PageNotFound(id) if id.as_str() == "99"));
        assert!(s.is_ended());
        let saved = s.store().load("p1").unwrap().unwrap();
        assert_eq!(saved.current_page, PageId::from(2));
    }

    #[test]
    fn quit_and_pause_keep_last_save() {
        let mut s = session(store_with_hero());
        s.advance(None).unwrap();
        let quit = s.advance(Some(Answer::Command(SessionCommand::Quit))).unwrap();
        assert!(matches!(
            quit,
            Progress::Ended {
                reason: EndReason::Quit,
                ..
            }
        ));
        assert!(s.store().load("p1").unwrap().is_some());

        let mut s = session(store_with_hero());
        let paused = s.pause();
        assert_eq!(paused.display(), "Adventure paused at page 1.");
        assert!(s.is_ended());
    }

    #[test]
    fn end_reasons() {
        assert!(EndReason::from(Terminal::Victory).is_final());
        assert!(EndReason::Death.is_final());
        assert!(!EndReason::Quit.is_final());
        assert!(!EndReason::Paused.is_final());
    }
}

pub mod check;
pub mod create;
pub mod delete;
pub mod play;
pub mod stats;

use std::path::PathBuf;

use clap::Args;

use folio_core::Character;
use folio_story::{CharacterStore, EnemyCatalog, JsonFileStore, SessionConfig, StoryGraph};

/// Where the story, enemies, and saves live, and who is playing.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Story pages JSON file
    #[arg(long, global = true, default_value = "data/pages.json")]
    pub story: PathBuf,

    /// Enemy catalog JSON file
    #[arg(long, global = true, default_value = "data/enemies.json")]
    pub enemies: PathBuf,

    /// Character save file
    #[arg(long, global = true, default_value = "data/characters.json")]
    pub saves: PathBuf,

    /// Player id the character is saved under
    #[arg(long, global = true, default_value = "local_player")]
    pub player: String,

    /// RNG seed for reproducible dice
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

impl DataArgs {
    fn config(&self) -> SessionConfig {
        let config = SessionConfig::default();
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.saves)
    }

    fn load_story(&self) -> Result<(StoryGraph, EnemyCatalog), String> {
        let story = StoryGraph::from_path(&self.story).map_err(|e| e.to_string())?;
        let enemies = EnemyCatalog::from_path(&self.enemies).map_err(|e| e.to_string())?;
        Ok((story, enemies))
    }

    fn load_character(&self) -> Result<Character, String> {
        self.store()
            .load(&self.player)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| {
                format!(
                    "no character for '{}'. Create one with `folio create`.",
                    self.player
                )
            })
    }
}

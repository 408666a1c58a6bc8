//! Character persistence.
//!
//! The engine only needs [`CharacterStore`]. [`JsonFileStore`] keeps every
//! player's character in one JSON object on disk; [`MemoryStore`] is for
//! tests and embedding.
//!
//! `JsonFileStore` reads the whole file, changes one entry and writes the
//! whole file back, without locking. Two processes saving at the same time
//! can lose one another's update.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_core::Character;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from a character store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The save file could not be read or written.
    #[error("save file {path}: {source}")]
    Io {
        /// Save file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The save file is not valid JSON.
    #[error("save file {path} is corrupt: {source}")]
    Json {
        /// Save file path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The in-memory store's lock was poisoned by a panic.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Load, save, and delete characters by player id.
pub trait CharacterStore {
    /// Load the character owned by `user_id`, if any.
    fn load(&self, user_id: &str) -> StoreResult<Option<Character>>;

    /// Save a character under its `user_id`, replacing any previous one.
    fn save(&self, character: &Character) -> StoreResult<()>;

    /// Delete the character owned by `user_id`. Returns whether one existed.
    fn delete(&self, user_id: &str) -> StoreResult<bool>;
}

/// A character as written to the save file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveRecord {
    #[serde(flatten)]
    character: Character,
    saved_at: DateTime<Utc>,
}

/// Characters in a single JSON file keyed by player id.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// A store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The save file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the character owned by `user_id` was last saved.
    pub fn saved_at(&self, user_id: &str) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.load_all()?.get(user_id).map(|r| r.saved_at))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load_all(&self) -> StoreResult<BTreeMap<String, SaveRecord>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save_all(&self, records: &BTreeMap<String, SaveRecord>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

impl CharacterStore for JsonFileStore {
    fn load(&self, user_id: &str) -> StoreResult<Option<Character>> {
        Ok(self.load_all()?.remove(user_id).map(|r| r.character))
    }

    fn save(&self, character: &Character) -> StoreResult<()> {
        let mut records = self.load_all()?;
        records.insert(
            character.user_id.clone(),
            SaveRecord {
                character: character.clone(),
                saved_at: Utc::now(),
            },
        );
        self.save_all(&records)?;
        tracing::debug!(
            user = %character.user_id,
            page = %character.current_page,
            "character saved"
        );
        Ok(())
    }

    fn delete(&self, user_id: &str) -> StoreResult<bool> {
        let mut records = self.load_all()?;
        if records.remove(user_id).is_none() {
            return Ok(false);
        }
        self.save_all(&records)?;
        tracing::info!(user = %user_id, "character deleted");
        Ok(true)
    }
}

/// Characters held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    characters: Mutex<HashMap<String, Character>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored characters.
    pub fn len(&self) -> usize {
        self.characters.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CharacterStore for MemoryStore {
    fn load(&self, user_id: &str) -> StoreResult<Option<Character>> {
        let characters = self.characters.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(characters.get(user_id).cloned())
    }

    fn save(&self, character: &Character) -> StoreResult<()> {
        let mut characters = self.characters.lock().map_err(|_| StoreError::Poisoned)?;
        characters.insert(character.user_id.clone(), character.clone());
        Ok(())
    }

    fn delete(&self, user_id: &str) -> StoreResult<bool> {
        let mut characters = self.characters.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(characters.remove(user_id).is_some())
    }
}

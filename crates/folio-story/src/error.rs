//! Error types for story loading, dispatch, and sessions.

use std::path::PathBuf;

use thiserror::Error;

use folio_core::{CoreError, PageId};

use crate::store::StoreError;

/// Result type for story operations.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors that end a play session or prevent one from starting.
#[derive(Debug, Error)]
pub enum StoryError {
    /// A page id is not in the story graph.
    #[error("page {0} not found")]
    PageNotFound(PageId),

    /// A page's outcome map has no entry for the result that occurred.
    #[error("page {page} has no outcome '{key}'")]
    MissingOutcome {
        /// The page being dispatched.
        page: PageId,
        /// The outcome key that was looked up.
        key: String,
    },

    /// An enemy id is not in the enemy catalog.
    #[error("enemy '{0}' not found")]
    EnemyNotFound(String),

    /// A page declares a type the engine does not implement.
    #[error("page {page} has unknown type '{type_name}'")]
    UnknownNodeType {
        /// The offending page.
        page: PageId,
        /// The authored type tag.
        type_name: String,
    },

    /// No saved character for this player.
    #[error("no character found for '{0}'")]
    NoCharacter(String),

    /// The player already has a character.
    #[error("'{0}' already has a character")]
    CharacterExists(String),

    /// The session has already ended.
    #[error("session has ended")]
    SessionEnded,

    /// A story or enemy file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A story or enemy file is not valid JSON for its format.
    #[error("invalid story data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rules engine error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Character store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

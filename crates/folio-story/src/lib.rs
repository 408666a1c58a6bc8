//! Story engine for Folio gamebooks.
//!
//! Loads an authored page graph and enemy catalog from JSON, executes pages
//! as a resumable state machine, persists characters between sessions, and
//! checks stories for broken links before they are played.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod page;
pub mod session;
pub mod store;
pub mod validate;

pub use config::SessionConfig;
pub use dispatch::{
    Answer, CombatMemory, InputSpec, PageDispatcher, PlayState, SessionCommand, Step, Terminal,
};
pub use error::{StoryError, StoryResult};
pub use graph::{EnemyCatalog, StoryGraph};
pub use page::{PageKind, PageNode};
pub use session::{EndReason, GameSession, Progress, create_character};
pub use store::{CharacterStore, JsonFileStore, MemoryStore, StoreError, StoreResult};
pub use validate::{Severity, ValidationIssue, validate_story};

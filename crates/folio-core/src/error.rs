//! Error types for the rules engine.

/// Errors that can occur while applying game rules.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A random-effect formula could not be parsed or evaluated.
    #[error("malformed formula '{formula}': {reason}")]
    MalformedFormula {
        /// The authored formula text.
        formula: String,
        /// What went wrong.
        reason: String,
    },

    /// A combat encounter was started without any enemies.
    #[error("combat has no enemies")]
    NoEnemies,

    /// A combat answer did not match the pending prompt.
    #[error("combat error: {0}")]
    CombatError(String),
}

/// Convenience result type for rules operations.
pub type CoreResult<T> = Result<T, CoreError>;

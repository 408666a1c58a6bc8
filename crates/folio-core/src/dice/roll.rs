//! Dice roll results.

use serde::{Deserialize, Serialize};

/// The individual d6 values of one roll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Values rolled, in order (each 1-6).
    pub values: Vec<u32>,
}

impl RollResult {
    /// Sum of all die values.
    pub fn total(&self) -> u32 {
        self.values.iter().sum()
    }

    /// Number of dice in the result.
    pub fn count(&self) -> usize {
        self.values.len()
    }
}

impl std::fmt::Display for RollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}] = {}", values.join(", "), self.total())
    }
}

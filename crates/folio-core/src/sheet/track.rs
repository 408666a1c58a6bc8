//! Clamped stats (SKILL, STAMINA, LUCK).
//!
//! A stat has a current value bounded by zero and its initial maximum.
//! Every mutation path goes through [`Stat::adjust`], so the bounds hold
//! no matter which rule changed the value.

use serde::{Deserialize, Serialize};

/// A numeric stat clamped between 0 and `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Current value.
    pub current: i32,
    /// Initial (maximum) value.
    pub max: i32,
}

impl Stat {
    /// Create a stat starting at its maximum.
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    /// Create a stat with an explicit current value, clamped into range.
    pub fn with_current(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    /// Adjust by a delta, clamping to `[0, max]`. Returns the new value.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        self.current = self.current.saturating_add(delta).clamp(0, self.max);
        self.current
    }

    /// Returns true if the stat is at zero.
    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }

    /// Returns true if the stat is at its maximum.
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_at_max() {
        let s = Stat::new(10);
        assert_eq!(s.current, 10);
        assert!(s.is_full());
        assert!(!s.is_empty());
    }

    #[test]
    fn adjust_clamps_to_max() {
        let mut s = Stat::new(5);
        assert_eq!(s.adjust(10), 5);
    }

    #[test]
    fn adjust_clamps_to_zero() {
        let mut s = Stat::new(5);
        assert_eq!(s.adjust(-20), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn adjust_extreme_delta() {
        let mut s = Stat::new(5);
        assert_eq!(s.adjust(i32::MIN), 0);
        assert_eq!(s.adjust(i32::MAX), 5);
    }

    #[test]
    fn with_current_clamps_initial() {
        assert_eq!(Stat::with_current(100, 10).current, 10);
        assert_eq!(Stat::with_current(-3, 10).current, 0);
    }

    #[test]
    fn display() {
        let mut s = Stat::new(12);
        s.adjust(-4);
        assert_eq!(s.to_string(), "8/12");
    }
}

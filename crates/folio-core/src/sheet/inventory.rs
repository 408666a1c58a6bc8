//! Case-insensitive item set.

use serde::{Deserialize, Serialize};

/// The items a character carries.
///
/// Identity ignores case ("rope" and "Rope" are the same item); the spelling
/// of the first copy added is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.items.iter().position(|i| i.to_lowercase() == wanted)
    }

    /// Whether an item is held, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Add an item. Returns false if it was already held.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.items.push(name.to_string());
        true
    }

    /// Remove an item. Returns the removed spelling, or `None` if absent.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|pos| self.items.remove(pos))
    }

    /// Items in the order they were acquired.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of items held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Inventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut inv = Self::new();
        for item in iter {
            inv.add(item.as_ref());
        }
        inv
    }
}

impl std::fmt::Display for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.items.is_empty() {
            write!(f, "Empty")
        } else {
            write!(f, "{}", self.items.join(", "))
        }
    }
}

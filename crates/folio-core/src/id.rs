//! Page identifiers.

use serde::{Deserialize, Deserializer, Serialize};

/// Key of a page in the story graph.
///
/// Authored content uses both `"12"` and `12`; both normalise to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Create a page id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u32> for PageId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for PageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids_match() {
        let a: PageId = serde_json::from_str("12").unwrap();
        let b: PageId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "12");
    }

    #[test]
    fn serializes_as_string() {
        let id = PageId::from(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }
}

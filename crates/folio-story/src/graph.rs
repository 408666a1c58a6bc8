//! Loading the story graph and enemy catalog.

use std::collections::HashMap;
use std::path::Path;

use folio_core::{EnemyTemplate, PageId};

use crate::error::{StoryError, StoryResult};
use crate::page::PageNode;

fn read(path: &Path) -> StoryResult<String> {
    std::fs::read_to_string(path).map_err(|source| StoryError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Every page of a story, keyed by page id.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    pages: HashMap<PageId, PageNode>,
}

impl StoryGraph {
    /// Parse a JSON object of page id to page.
    pub fn from_json_str(json: &str) -> StoryResult<Self> {
        let pages: HashMap<PageId, PageNode> = serde_json::from_str(json)?;
        tracing::debug!(pages = pages.len(), "story loaded");
        Ok(Self { pages })
    }

    /// Read and parse a story file.
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        Self::from_json_str(&read(path)?)
    }

    /// Look up a page.
    pub fn get(&self, id: &PageId) -> StoryResult<&PageNode> {
        self.pages
            .get(id)
            .ok_or_else(|| StoryError::PageNotFound(id.clone()))
    }

    /// Whether a page exists.
    pub fn contains(&self, id: &PageId) -> bool {
        self.pages.contains_key(id)
    }

    /// All pages, in no particular order.
    pub fn pages(&self) -> impl Iterator<Item = (&PageId, &PageNode)> {
        self.pages.iter()
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the story has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Enemy templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EnemyCatalog {
    enemies: HashMap<String, EnemyTemplate>,
}

impl EnemyCatalog {
    /// Parse a JSON object of enemy id to template. Templates without an
    /// `id` field take the map key.
    pub fn from_json_str(json: &str) -> StoryResult<Self> {
        let mut enemies: HashMap<String, EnemyTemplate> = serde_json::from_str(json)?;
        for (key, template) in &mut enemies {
            if template.id.is_empty() {
                template.id.clone_from(key);
            }
        }
        tracing::debug!(enemies = enemies.len(), "enemy catalog loaded");
        Ok(Self { enemies })
    }

    /// Read and parse an enemy file.
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        Self::from_json_str(&read(path)?)
    }

    /// Build a catalog from templates, keyed by their ids.
    pub fn from_templates(templates: impl IntoIterator<Item = EnemyTemplate>) -> Self {
        Self {
            enemies: templates.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// Look up a template.
    pub fn get(&self, id: &str) -> StoryResult<&EnemyTemplate> {
        self.enemies
            .get(id)
            .ok_or_else(|| StoryError::EnemyNotFound(id.to_string()))
    }

    /// Whether a template exists.
    pub fn contains(&self, id: &str) -> bool {
        self.enemies.contains_key(id)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageKind;

    #[test]
    fn story_accepts_numeric_targets() {
        let story = StoryGraph::from_json_str(
            r#"{"1": {"text": "Start", "type": "auto", "next": 2},
                "2": {"type": "victory", "text": "Done"}}"#,
        )
        .unwrap();
        assert_eq!(story.len(), 2);
        let start = story.get(&PageId::from(1)).unwrap();
        assert_eq!(
            start.kind,
            PageKind::Auto {
                next: PageId::from("2")
            }
        );
    }

    #[test]
    fn missing_page_is_an_error() {
        let story = StoryGraph::default();
        assert!(matches!(
            story.get(&PageId::from(3)),
            Err(StoryError::PageNotFound(id)) if id.as_str() == "3"
        ));
    }

    #[test]
    fn enemy_ids_default_to_keys() {
        let catalog = EnemyCatalog::from_json_str(
            r#"{"dog": {"name": "Guard Dog", "skill": 7, "stamina": 6},
                "orc": {"id": "orc", "name": "Orc", "skill": 6, "stamina": 5}}"#,
        )
        .unwrap();
        assert_eq!(catalog.get("dog").unwrap().id, "dog");
        assert_eq!(catalog.get("orc").unwrap().stamina, 5);
        assert!(matches!(
            catalog.get("wolf"),
            Err(StoryError::EnemyNotFound(id)) if id == "wolf"
        ));
    }

    #[test]
    fn invalid_json_reported() {
        assert!(matches!(
            StoryGraph::from_json_str("[1, 2]"),
            Err(StoryError::Parse(_))
        ));
    }

    #[test]
    fn from_path_reports_missing_file() {
        let err = StoryGraph::from_path(Path::new("/nonexistent/pages.json")).unwrap_err();
        assert!(matches!(err, StoryError::Read { .. }));
    }
}

//! Static checks over a story and its enemy catalog.
//!
//! Dispatch fails at runtime on a dangling page id or an unknown enemy;
//! [`validate_story`] finds those before anyone plays.

use std::fmt;

use folio_core::PageId;

use crate::graph::{EnemyCatalog, StoryGraph};
use crate::page::{GAME_OVER_SENTINEL, PageKind};

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The story cannot be played through this page.
    Error,
    /// Playable, but probably not what the author meant.
    Warning,
}

/// A problem found on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// How serious the issue is.
    pub severity: Severity,
    /// The page where the issue was found.
    pub page: PageId,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// An error on `page`.
    pub fn error(page: &PageId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            page: page.clone(),
            message: message.into(),
        }
    }

    /// A warning on `page`.
    pub fn warning(page: &PageId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            page: page.clone(),
            message: message.into(),
        }
    }

    /// Whether this issue blocks play.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: page {}: {}", self.page, self.message)
    }
}

/// Check every page. Issues are sorted errors first, then by page id.
pub fn validate_story(story: &StoryGraph, enemies: &EnemyCatalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (id, page) in story.pages() {
        let kind = &page.kind;

        if let PageKind::Unknown { type_name } = kind {
            issues.push(ValidationIssue::error(
                id,
                format!("unknown page type '{type_name}'"),
            ));
            continue;
        }

        let game_over_allowed = matches!(kind, PageKind::RandomTest { .. });
        let targets = kind.targets();
        for target in &targets {
            if game_over_allowed && target.as_str() == GAME_OVER_SENTINEL {
                continue;
            }
            if !story.contains(target) {
                issues.push(ValidationIssue::error(
                    id,
                    format!("links to missing page {target}"),
                ));
            }
        }

        for enemy in enemy_ids(kind) {
            if !enemies.contains(enemy) {
                issues.push(ValidationIssue::error(id, format!("unknown enemy '{enemy}'")));
            }
        }

        if let PageKind::RandomEffect {
            effect_template, ..
        } = kind
        {
            if let Err(e) = effect_template.check() {
                issues.push(ValidationIssue::error(id, e.to_string()));
            }
        }

        if targets.is_empty() && !kind.is_terminal() {
            issues.push(ValidationIssue::warning(id, "dead end: no way forward"));
        }
    }

    issues.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.page.cmp(&b.page)));
    tracing::debug!(issues = issues.len(), "story validated");
    issues
}

fn enemy_ids(kind: &PageKind) -> Vec<&str> {
    match kind {
        PageKind::Combat { enemies, .. } | PageKind::MultiCombat { enemies, .. } => {
            enemies.iter().map(String::as_str).collect()
        }
        PageKind::RandomEncounter { encounters, .. } => {
            encounters.values().map(String::as_str).collect()
        }
        _ => Vec::new(),
    }
}

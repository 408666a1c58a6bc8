//! Configuration for a play session.

use folio_core::PageId;

/// Page new characters start on.
pub const DEFAULT_START_PAGE: &str = "1";

/// Configuration for character creation and play.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for reproducible dice. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Page new characters start on.
    pub start_page: PageId,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_page: PageId::from(DEFAULT_START_PAGE),
        }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the starting page.
    pub fn with_start_page(mut self, page: impl Into<PageId>) -> Self {
        self.start_page = page.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.start_page, PageId::from(1));
    }

    #[test]
    fn builder_methods() {
        let cfg = SessionConfig::default().with_seed(123).with_start_page("400");
        assert_eq!(cfg.seed, Some(123));
        assert_eq!(cfg.start_page.as_str(), "400");
    }
}

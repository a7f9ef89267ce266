//! Catalog browse/search query.

use serde::{Deserialize, Serialize};

use tradepost_core::Page;

/// A catalog page request. Sold listings are always excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Case-insensitive term matched against title and description.
    /// `None` lists everything unsold.
    pub search: Option<String>,
    pub page: Page,
}

impl CatalogQuery {
    pub fn new(search: Option<String>, page: Option<u32>, limit: Option<u32>) -> Self {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            search,
            page: Page::new(page, limit),
        }
    }

    /// Whether `title`/`description` match this query's search term.
    /// Listings match an absent term unconditionally.
    pub fn matches(&self, title: &str, description: &str) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                title.to_lowercase().contains(&term)
                    || description.to_lowercase().contains(&term)
            }
        }
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_terms_are_dropped() {
        let q = CatalogQuery::new(Some("   ".to_string()), None, None);
        assert_eq!(q.search, None);
        assert!(q.matches("anything", "at all"));
    }

    #[test]
    fn match_is_case_insensitive_on_title_and_description() {
        let q = CatalogQuery::new(Some("book".to_string()), None, None);
        assert!(q.matches("Book Title 1", "boring"));
        assert!(q.matches("Lamp", "a book about lamps"));
        assert!(!q.matches("Lamp", "shines bright"));
    }

    #[test]
    fn search_term_is_trimmed() {
        let q = CatalogQuery::new(Some("  book  ".to_string()), None, None);
        assert_eq!(q.search.as_deref(), Some("book"));
    }
}

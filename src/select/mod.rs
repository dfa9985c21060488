//! Page selection
//!
//! In development mode a subset of pages can be built to keep rebuilds fast.
//! Selection is an async stage between discovery and entry assembly so an
//! interactive prompt can be plugged in without blocking the planner.

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;

/// Chooses which of the discovered pages are built
#[async_trait]
pub trait EntrySelector: Send + Sync {
    /// Selector name for logging and debugging
    fn name(&self) -> &str;

    /// Return the selected page names, a subset of `candidates`
    async fn select(&self, candidates: &[String]) -> Result<Vec<String>>;
}

/// Keeps every page
#[derive(Debug, Default)]
pub struct AllPages;

#[async_trait]
impl EntrySelector for AllPages {
    fn name(&self) -> &str {
        "all"
    }

    async fn select(&self, candidates: &[String]) -> Result<Vec<String>> {
        Ok(candidates.to_vec())
    }
}

/// Keeps a fixed set of pages by name
#[derive(Debug, Default)]
pub struct StaticSelection {
    pages: Vec<String>,
}

impl StaticSelection {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl EntrySelector for StaticSelection {
    fn name(&self) -> &str {
        "static"
    }

    async fn select(&self, candidates: &[String]) -> Result<Vec<String>> {
        for page in &self.pages {
            if !candidates.contains(page) {
                debug!("Selected page '{}' was not discovered", page);
            }
        }

        Ok(candidates
            .iter()
            .filter(|candidate| self.pages.contains(*candidate))
            .cloned()
            .collect())
    }
}

/// Keeps pages whose name contains the query, ignoring case
#[derive(Debug)]
pub struct SearchSelection {
    query: String,
}

impl SearchSelection {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase(),
        }
    }
}

#[async_trait]
impl EntrySelector for SearchSelection {
    fn name(&self) -> &str {
        "search"
    }

    async fn select(&self, candidates: &[String]) -> Result<Vec<String>> {
        Ok(candidates
            .iter()
            .filter(|candidate| candidate.to_lowercase().contains(&self.query))
            .cloned()
            .collect())
    }
}

/// Pick a selector: explicit pages first, then a search query, then pages
/// preset in the config, otherwise keep everything
pub fn selector_for(
    pages: &[String],
    search: Option<&str>,
    config: &Config,
) -> Box<dyn EntrySelector> {
    if !pages.is_empty() {
        Box::new(StaticSelection::new(pages.to_vec()))
    } else if let Some(query) = search {
        Box::new(SearchSelection::new(query))
    } else if !config.select_entry.preset_pages().is_empty() {
        Box::new(StaticSelection::new(config.select_entry.preset_pages().to_vec()))
    } else {
        Box::new(AllPages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidates() -> Vec<String> {
        ["index", "demo/demo", "Demo/Other", "about"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_all_pages_keeps_everything() {
        let selected = AllPages.select(&candidates()).await.unwrap();
        assert_eq!(selected, candidates());
    }

    #[tokio::test]
    async fn test_static_selection_keeps_candidate_order() {
        let selector = StaticSelection::new(vec!["about".to_string(), "index".to_string(), "gone".to_string()]);
        let selected = selector.select(&candidates()).await.unwrap();
        assert_eq!(selected, vec!["index", "about"]);
    }

    #[tokio::test]
    async fn test_search_ignores_case() {
        let selected = SearchSelection::new("DEMO").select(&candidates()).await.unwrap();
        assert_eq!(selected, vec!["demo/demo", "Demo/Other"]);
    }

    #[test]
    fn test_selector_precedence() {
        let config = Config::from_toml("[select_entry]\npages = [\"about\"]", "/p").unwrap();

        assert_eq!(selector_for(&["index".to_string()], Some("x"), &config).name(), "static");
        assert_eq!(selector_for(&[], Some("x"), &config).name(), "search");
        assert_eq!(selector_for(&[], None, &config).name(), "static");
        assert_eq!(
            selector_for(&[], None, &Config::default_config("/p")).name(),
            "all"
        );
    }
}

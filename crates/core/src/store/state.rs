//! # Catalog State
//!
//! The observable fields of the store. UIs render from a [`CatalogState`]
//! snapshot.

use serde::Serialize;

use crate::api::{CatalogEntry, EvolutionNode};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogState {
    /// Browsable list, grown page by page
    pub entries: Vec<CatalogEntry>,
    /// Entry shown on the detail view
    pub current_detail: Option<CatalogEntry>,
    /// Evolution line of `current_detail`
    pub current_evolution: Vec<EvolutionNode>,
    /// Favorite records in insertion order
    pub favorites: Vec<CatalogEntry>,
    pub loading: bool,
    /// Message of the last failed action
    pub error: Option<String>,
    /// Type names for filter controls
    pub categories: Vec<String>,
    /// Total entries available upstream
    pub total_count: u64,
    /// 1-based page of the last list fetch
    pub current_page: u32,
    pub page_size: u32,
}

impl CatalogState {
    pub fn new(page_size: u32) -> Self {
        Self {
            entries: Vec::new(),
            current_detail: None,
            current_evolution: Vec::new(),
            favorites: Vec::new(),
            loading: false,
            error: None,
            categories: Vec::new(),
            total_count: 0,
            current_page: 1,
            page_size,
        }
    }

    /// Clear list, detail, error, and pagination. Favorites, categories,
    /// and page size survive.
    pub fn reset_browsing(&mut self) {
        self.entries.clear();
        self.current_detail = None;
        self.current_evolution.clear();
        self.loading = false;
        self.error = None;
        self.total_count = 0;
        self.current_page = 1;
    }
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new(20)
    }
}

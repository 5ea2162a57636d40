//! # Catalog Store
//!
//! Observable application state over the catalog client and the favorites
//! slot.
//!
//! ## Modules
//!
//! - `catalog_store` - Actions (paging, detail, search, favorites)
//! - `state` - The state record rendered by UIs
//! - `views` - Pure filters and sorts over loaded entries

pub mod catalog_store;
pub mod state;
pub mod views;

pub use catalog_store::{CatalogStore, FavoriteTarget, FALLBACK_CATEGORIES};
pub use state::CatalogState;
pub use views::{
    filter_by_generation, filter_by_type, generation_range, sort_entries, SortKey,
    GENERATION_RANGES,
};

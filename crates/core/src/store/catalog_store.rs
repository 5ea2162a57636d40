//! # Catalog Store
//!
//! Orchestrates the catalog client and the favorites adapter behind a set of
//! actions, and keeps the resulting [`CatalogState`].
//!
//! Actions take `&self` and may interleave at their await points. They are
//! not serialized: if two `fetch_detail` calls overlap, whichever finishes
//! last owns `current_detail`, even when it was started first.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::state::CatalogState;
use super::views::{self, SortKey};
use crate::api::{CatalogClient, CatalogEntry, EntryPage, EntryRef, EvolutionNode};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::storage::{CatalogDb, FavoritesAdapter, SqliteKvStore};

/// Used when the type list cannot be fetched
pub const FALLBACK_CATEGORIES: [&str; 18] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

/// What `toggle_favorite` operates on
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteTarget {
    Entry(CatalogEntry),
    Id(u32),
}

impl From<CatalogEntry> for FavoriteTarget {
    fn from(entry: CatalogEntry) -> Self {
        FavoriteTarget::Entry(entry)
    }
}

impl From<u32> for FavoriteTarget {
    fn from(id: u32) -> Self {
        FavoriteTarget::Id(id)
    }
}

/// Clears the loading flag when dropped, on success, error, or cancellation
struct LoadingGuard<'a> {
    state: &'a RwLock<CatalogState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

/// The catalog state store
pub struct CatalogStore {
    client: CatalogClient,
    favorites: FavoritesAdapter,
    state: RwLock<CatalogState>,
}

impl CatalogStore {
    /// Build the store and load favorites from storage
    pub async fn init(client: CatalogClient, favorites: FavoritesAdapter) -> Self {
        let page_size = client.config().page_size;
        let store = Self {
            client,
            favorites,
            state: RwLock::new(CatalogState::new(page_size)),
        };
        store.reload_favorites().await;
        store
    }

    /// Store over `reqwest` and the `.pokedex/pokedex.db` database
    pub async fn open(config: CatalogConfig) -> Result<Self> {
        let db = CatalogDb::open().map_err(|e| CatalogError::Storage(format!("{:#}", e)))?;
        let favorites =
            FavoritesAdapter::new(Arc::new(SqliteKvStore::new(&db)), config.favorites_key.clone());
        let client = CatalogClient::new(config)?;
        Ok(Self::init(client, favorites).await)
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CatalogState {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        {
            let mut state = self.write();
            state.loading = true;
            state.error = None;
        }
        LoadingGuard { state: &self.state }
    }

    fn record_error(&self, err: &CatalogError) {
        self.write().error = Some(err.to_string());
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    /// Fetch one page. `offset == 0` replaces the list, anything else appends.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_list(&self, limit: u32, offset: u32) -> Result<EntryPage> {
        let _loading = self.begin_loading();

        match self.client.list_entries(limit, offset).await {
            Ok(page) => {
                let mut state = self.write();
                if offset == 0 {
                    state.entries = page.results.clone();
                } else {
                    state.entries.extend(page.results.iter().cloned());
                }
                state.total_count = page.count;
                state.current_page = offset.checked_div(limit).unwrap_or(0) + 1;
                Ok(page)
            }
            Err(e) => {
                self.record_error(&e);
                tracing::error!(error = %e, "Error in fetch_list");
                Err(e)
            }
        }
    }

    /// Next page, sized by `page_size`, starting after the loaded entries
    pub async fn load_more(&self) -> Result<EntryPage> {
        let (limit, offset) = {
            let state = self.read();
            (state.page_size, state.entries.len() as u32)
        };
        self.fetch_list(limit, offset).await
    }

    /// Load an entry into the detail slot, then its evolution line.
    ///
    /// Evolution failures leave the line empty without failing the call.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_detail(&self, entry: impl Into<EntryRef>) -> Result<CatalogEntry> {
        let entry = entry.into();
        let _loading = self.begin_loading();
        {
            let mut state = self.write();
            state.current_detail = None;
            state.current_evolution.clear();
        }

        let detail = match self.client.get_entry(entry.clone()).await {
            Ok(detail) => detail,
            Err(e) => {
                self.record_error(&e);
                tracing::error!(pokemon = %entry, error = %e, "Error fetching Pokémon detail");
                return Err(e);
            }
        };
        self.write().current_detail = Some(detail.clone());

        let evolution = match self.load_evolution(&entry).await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(pokemon = %entry, error = %e, "Could not fetch evolution chain");
                Vec::new()
            }
        };
        self.write().current_evolution = evolution;

        Ok(detail)
    }

    async fn load_evolution(&self, entry: &EntryRef) -> Result<Vec<EvolutionNode>> {
        let species = self.client.get_species_meta(entry.clone()).await?;
        let url = species.evolution_chain_url.ok_or_else(|| {
            CatalogError::NotFound(format!("evolution chain for Pokémon {}", entry))
        })?;
        let chain = self.client.get_evolution_chain(&url).await?;
        Ok(self.client.parse_evolution_chain(&chain).await)
    }

    /// Exact lookup first, then a name substring match over the loaded list
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Vec<CatalogEntry> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let _loading = self.begin_loading();

        match self.client.search_by_name(query).await {
            Ok(entry) => vec![entry],
            Err(e) => {
                tracing::debug!(error = %e, "No exact match, searching loaded entries");
                let needle = query.trim().to_lowercase();
                self.read()
                    .entries
                    .iter()
                    .filter(|entry| entry.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Type names, fetched once per store and kept
    pub async fn fetch_categories(&self) -> Vec<String> {
        let cached = self.read().categories.clone();
        if !cached.is_empty() {
            return cached;
        }

        let categories = match self.client.list_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching types, using built-in list");
                FALLBACK_CATEGORIES.iter().map(|t| t.to_string()).collect()
            }
        };

        self.write().categories = categories.clone();
        categories
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Re-read favorites from storage
    pub async fn reload_favorites(&self) -> Vec<CatalogEntry> {
        let loaded = self.favorites.load(&self.client).await;
        self.write().favorites = loaded.clone();
        loaded
    }

    /// Add the entry if absent, remove it otherwise. Returns whether it is a
    /// favorite afterwards.
    ///
    /// A bare id is resolved from the loaded list, then the detail slot, then
    /// the network. Removing an already-favorited id needs no lookup.
    pub async fn toggle_favorite(&self, target: impl Into<FavoriteTarget>) -> Result<bool> {
        let entry = match target.into() {
            FavoriteTarget::Entry(entry) => entry,
            FavoriteTarget::Id(id) if self.is_favorite(id) => {
                self.remove_favorite(id);
                return Ok(false);
            }
            FavoriteTarget::Id(id) => self.resolve_entry(id).await?,
        };

        if entry.id == 0 {
            return Err(CatalogError::Validation("Invalid Pokémon id".to_string()));
        }

        let now_favorite = {
            let mut state = self.write();
            match state.favorites.iter().position(|f| f.id == entry.id) {
                Some(index) => {
                    state.favorites.remove(index);
                    false
                }
                None => {
                    state.favorites.push(entry);
                    true
                }
            }
        };

        self.persist_favorites();
        Ok(now_favorite)
    }

    async fn resolve_entry(&self, id: u32) -> Result<CatalogEntry> {
        if id == 0 {
            return Err(CatalogError::Validation("Invalid Pokémon id".to_string()));
        }

        let local = {
            let state = self.read();
            state
                .entries
                .iter()
                .chain(state.current_detail.iter())
                .find(|entry| entry.id == id)
                .cloned()
        };

        match local {
            Some(entry) => Ok(entry),
            None => self.client.get_entry(id).await,
        }
    }

    /// Add unless already present or without an id. Returns whether it was added.
    pub fn add_favorite(&self, entry: CatalogEntry) -> bool {
        if entry.id == 0 {
            tracing::warn!(name = %entry.name, "Refusing a favorite without an id");
            return false;
        }

        let added = {
            let mut state = self.write();
            if state.favorites.iter().any(|f| f.id == entry.id) {
                false
            } else {
                state.favorites.push(entry);
                true
            }
        };

        if added {
            self.persist_favorites();
        }
        added
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove_favorite(&self, id: u32) -> bool {
        let removed = {
            let mut state = self.write();
            let before = state.favorites.len();
            state.favorites.retain(|f| f.id != id);
            state.favorites.len() != before
        };

        if removed {
            self.persist_favorites();
        }
        removed
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.read().favorites.iter().any(|f| f.id == id)
    }

    pub fn clear_all_favorites(&self) {
        self.write().favorites.clear();
        self.persist_favorites();
    }

    pub fn favorites(&self) -> Vec<CatalogEntry> {
        self.read().favorites.clone()
    }

    /// Favorites that are also in the loaded list, in list order
    pub fn favorite_entries(&self) -> Vec<CatalogEntry> {
        let state = self.read();
        state
            .entries
            .iter()
            .filter(|entry| state.favorites.iter().any(|f| f.id == entry.id))
            .cloned()
            .collect()
    }

    fn persist_favorites(&self) {
        let favorites = self.favorites();
        self.favorites.save(&favorites);
    }

    // =========================================================================
    // Lookups and derived views
    // =========================================================================

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.read().entries.clone()
    }

    pub fn get_by_id(&self, id: u32) -> Option<CatalogEntry> {
        self.read().entries.iter().find(|e| e.id == id).cloned()
    }

    /// Case-insensitive exact name match in the loaded list
    pub fn get_by_name(&self, name: &str) -> Option<CatalogEntry> {
        let name = name.to_lowercase();
        self.read()
            .entries
            .iter()
            .find(|e| e.name.to_lowercase() == name)
            .cloned()
    }

    pub fn filter_by_type(&self, type_name: Option<&str>) -> Vec<CatalogEntry> {
        views::filter_by_type(&self.read().entries, type_name)
    }

    pub fn filter_by_generation(&self, generation: Option<&str>) -> Vec<CatalogEntry> {
        views::filter_by_generation(&self.read().entries, generation)
    }

    pub fn sort_by(&self, key: SortKey) -> Vec<CatalogEntry> {
        views::sort_entries(&self.read().entries, key)
    }

    // =========================================================================
    // Flags and resets
    // =========================================================================

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn has_error(&self) -> bool {
        self.read().error.is_some()
    }

    pub fn has_entries(&self) -> bool {
        !self.read().entries.is_empty()
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    pub fn clear_current_detail(&self) {
        let mut state = self.write();
        state.current_detail = None;
        state.current_evolution.clear();
    }

    /// Clear browsing state; favorites are kept
    pub fn reset_all(&self) {
        self.write().reset_browsing();
    }
}

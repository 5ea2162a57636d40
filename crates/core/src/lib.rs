//! # Pokédex Core
//!
//! The data layer of the Pokédex: a cached client for the public catalog
//! API, durable favorites, and the state store that UIs render from.
//!
//! ## Architecture
//!
//! - `api/` - Remote catalog client, response cache, and HTTP transport
//! - `storage/` - Runtime directory, SQLite key-value slots, favorites adapter
//! - `store/` - Catalog state store and derived views
//! - `session` - Sign-in contract and route guard
//! - `config` - Client configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pokedex_core::{CatalogConfig, CatalogStore};
//!
//! let store = CatalogStore::open(CatalogConfig::from_env()).await?;
//! store.fetch_list(20, 0).await?;
//! store.toggle_favorite(25).await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;

#[cfg(test)]
mod testing;

pub use api::{CatalogClient, CatalogEntry, EntryPage, EntryRef, EvolutionNode};
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use store::{CatalogState, CatalogStore, SortKey};

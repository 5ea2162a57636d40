//! # Storage
//!
//! Durable client state: the SQLite database, named key-value slots, and the
//! favorites persistence adapter built on them.

pub mod db;
pub mod favorites;
pub mod io;
pub mod kv;

pub use db::CatalogDb;
pub use favorites::{legacy_ids, normalize_records, FavoritesAdapter, StoredFavorites};
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};

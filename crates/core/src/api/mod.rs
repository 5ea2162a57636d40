//! # Remote Catalog Client
//!
//! HTTP access to the catalog API with a time-boxed response cache.
//!
//! ## Modules
//!
//! - `client` - Cached catalog operations (lists, entries, species, evolution chains)
//! - `cache` - Process-wide response cache with a fixed staleness window
//! - `models` - Typed views over API responses
//! - `transport` - GET-only HTTP capability (`reqwest` in production)

pub mod cache;
pub mod client;
pub mod models;
pub mod transport;

pub use cache::{CacheEntry, CacheStats, ResponseCache};
pub use client::CatalogClient;
pub use models::{
    id_from_url, AbilityInfo, CatalogEntry, ChainLink, EntryPage, EntryRef, EvolutionChain,
    EvolutionDetail, EvolutionNode, NamedResource, SpeciesMeta,
};
pub use transport::{HttpResponse, ReqwestTransport, Transport};

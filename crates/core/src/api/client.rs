//! # Catalog Client
//!
//! Cached access to the catalog API. Every read goes through one
//! cache-or-fetch helper keyed by operation name and parameters; search and
//! batch lookups are thin wrappers over the cached `get_entry`.

use futures::future::{join_all, try_join_all};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use super::cache::{CacheStats, ResponseCache};
use super::models::{
    AbilityInfo, CatalogEntry, EntryPage, EntryRef, EvolutionChain, EvolutionNode, ResourceList,
    SpeciesMeta,
};
use super::transport::{HttpResponse, ReqwestTransport, Transport};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};

/// Client for the remote catalog API
///
/// Cloning is cheap; clones share the transport and the response cache.
#[derive(Clone)]
pub struct CatalogClient {
    config: Arc<CatalogConfig>,
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
}

impl CatalogClient {
    /// Create a client backed by `reqwest`
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over any transport (useful for testing)
    pub fn with_transport(config: CatalogConfig, transport: Arc<dyn Transport>) -> Self {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl()));
        Self {
            config: Arc::new(config),
            transport,
            cache,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// One page of entries, each hydrated with its detail record.
    ///
    /// Detail fetches run concurrently; any single failure fails the page.
    pub async fn list_entries(&self, limit: u32, offset: u32) -> Result<EntryPage> {
        let key = format!("pokemon-list-{}-{}", limit, offset);

        self.cached(key, || async move {
            let url = self
                .config
                .endpoint(&format!("pokemon?limit={}&offset={}", limit, offset));
            let list: ResourceList = self.fetch_typed(&url, "Pokémon list").await?;

            let results = try_join_all(list.results.iter().map(|resource| async move {
                let id = resource.id()?;
                self.get_entry(id).await
            }))
            .await?;

            Ok(EntryPage {
                count: list.count,
                next: list.next,
                previous: list.previous,
                results,
            })
        })
        .await
        .inspect_err(|e| tracing::error!(limit, offset, error = %e, "Error fetching Pokémon list"))
    }

    /// A single entry by id or name, with artwork fallback applied
    pub async fn get_entry(&self, entry: impl Into<EntryRef>) -> Result<CatalogEntry> {
        let entry = entry.into();
        let key = format!("pokemon-{}", entry);

        self.cached(key, || async {
            let url = self.config.endpoint(&format!("pokemon/{}", path_segment(&entry)));
            let raw = self.fetch_json(&url, &format!("Pokémon {}", entry)).await?;
            CatalogEntry::from_api(raw)
        })
        .await
        .inspect_err(|e| tracing::error!(pokemon = %entry, error = %e, "Error fetching Pokémon"))
    }

    /// Species metadata, including the evolution chain reference
    pub async fn get_species_meta(&self, entry: impl Into<EntryRef>) -> Result<SpeciesMeta> {
        let entry = entry.into();
        let key = format!("species-{}", entry);

        self.cached(key, || async {
            let url = self
                .config
                .endpoint(&format!("pokemon-species/{}", path_segment(&entry)));
            let raw = self
                .fetch_json(&url, &format!("species for Pokémon {}", entry))
                .await?;
            Ok(SpeciesMeta::from_api(raw))
        })
        .await
        .inspect_err(|e| tracing::error!(pokemon = %entry, error = %e, "Error fetching species"))
    }

    /// Raw evolution chain at `url`
    pub async fn get_evolution_chain(&self, url: &str) -> Result<EvolutionChain> {
        let key = format!("evolution-{}", url);

        self.cached(key, || self.fetch_typed(url, "evolution chain"))
            .await
            .inspect_err(|e| tracing::error!(url, error = %e, "Error fetching evolution chain"))
    }

    /// Flatten a chain root-to-leaf, following only the first branch.
    ///
    /// A failed lookup ends the walk; whatever was collected so far is
    /// returned.
    pub async fn parse_evolution_chain(&self, chain: &EvolutionChain) -> Vec<EvolutionNode> {
        let mut nodes = Vec::new();
        let mut current = Some(&chain.chain);

        while let Some(link) = current {
            let resolved = match link.species.id() {
                Ok(id) => self.get_entry(id).await.map(|entry| (id, entry)),
                Err(e) => Err(e),
            };

            let (id, entry) = match resolved {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(
                        species = %link.species.name,
                        parsed = nodes.len(),
                        error = %e,
                        "Error parsing evolution chain"
                    );
                    break;
                }
            };

            let detail = link.evolution_details.first();
            nodes.push(EvolutionNode {
                id,
                name: link.species.name.clone(),
                image: entry.artwork,
                min_level: detail.and_then(|d| d.min_level).filter(|level| *level > 0),
                trigger: detail
                    .and_then(|d| d.trigger.as_ref())
                    .map(|trigger| trigger.name.clone()),
            });

            current = link.evolves_to.first();
        }

        nodes
    }

    /// All type names, in API order
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        self.cached("pokemon-types".to_string(), || async {
            let list: ResourceList = self
                .fetch_typed(&self.config.endpoint("type"), "Pokémon types")
                .await?;
            Ok(list
                .results
                .into_iter()
                .map(|resource| resource.name)
                .collect::<Vec<_>>())
        })
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Error fetching Pokémon types"))
    }

    /// Exact lookup by (trimmed, lower-cased) name or id
    pub async fn search_by_name(&self, text: &str) -> Result<CatalogEntry> {
        let clean = text.trim().to_lowercase();
        if clean.is_empty() {
            return Err(CatalogError::Validation("Invalid Pokemon name".to_string()));
        }
        self.get_entry(clean).await
    }

    /// Ability name and English description; never fails
    pub async fn get_ability_meta(&self, url: &str) -> AbilityInfo {
        let key = format!("ability-{}", url);

        let result = self
            .cached(key, || async {
                let raw = self.fetch_json(url, "ability").await?;
                Ok(AbilityInfo::from_api(&raw))
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::warn!(url, error = %e, "Error fetching ability");
            AbilityInfo::unavailable()
        })
    }

    /// Fetch each id independently, keeping every outcome
    pub async fn get_many_settled(&self, ids: &[u32]) -> Vec<(u32, Result<CatalogEntry>)> {
        join_all(
            ids.iter()
                .map(|&id| async move { (id, self.get_entry(id).await) }),
        )
        .await
    }

    /// Best-effort batch: only the ids that resolved, in input order
    pub async fn get_many_entries(&self, ids: &[u32]) -> Vec<CatalogEntry> {
        if ids.is_empty() {
            return Vec::new();
        }

        self.get_many_settled(ids)
            .await
            .into_iter()
            .filter_map(|(_, result)| result.ok())
            .collect()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Cache-or-fetch for any serializable payload
    async fn cached<T, F, Fut>(&self, key: String, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let payload = self
            .cache
            .get_or_fetch(&key, || async {
                let value = fetch().await?;
                serde_json::to_value(&value).map_err(|e| CatalogError::decode(key.as_str(), e))
            })
            .await?;

        serde_json::from_value(payload).map_err(|e| CatalogError::decode(key.as_str(), e))
    }

    async fn fetch_json(&self, url: &str, context: &str) -> Result<Value> {
        let response = self.transport.get(url).await?;
        check_status(&response, context)?;
        serde_json::from_str(&response.body).map_err(|e| CatalogError::decode(context, e))
    }

    async fn fetch_typed<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T> {
        let raw = self.fetch_json(url, context).await?;
        serde_json::from_value(raw).map_err(|e| CatalogError::decode(context, e))
    }
}

/// Map a non-2xx response to `NotFound` (404) or `Transport`
fn check_status(response: &HttpResponse, context: &str) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(CatalogError::NotFound(format!("{} not found", context)));
    }
    Err(CatalogError::Transport(format!(
        "Failed to fetch {}: {} {}",
        context, response.status, response.status_text
    )))
}

fn path_segment(entry: &EntryRef) -> String {
    match entry {
        EntryRef::Id(id) => id.to_string(),
        EntryRef::Name(name) => urlencoding::encode(name).into_owned(),
    }
}

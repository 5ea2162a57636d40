//! # Catalog API
//!
//! Browsing, detail, search, derived views, and cache administration.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use pokedex_core::api::CacheStats;
use pokedex_core::store::views;
use pokedex_core::{CatalogEntry, CatalogState, EntryPage, EntryRef, EvolutionNode, SortKey};
use serde::{Deserialize, Serialize};

use super::{ApiResponse, ApiResult, SharedState};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Filters for the derived list view
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub generation: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub pokemon: CatalogEntry,
    pub evolution: Vec<EvolutionNode>,
    pub is_favorite: bool,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/pokemon", get(list_pokemon))
        .route("/pokemon/more", post(load_more))
        .route("/pokemon/view", get(view_pokemon))
        .route("/pokemon/:id", get(get_pokemon))
        .route("/search", get(search))
        .route("/types", get(list_types))
        .route("/state", get(get_state))
        .route("/cache", get(cache_stats).delete(clear_cache))
}

/// One page; `offset=0` replaces the loaded list
async fn list_pokemon(
    State(store): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<EntryPage> {
    let limit = query.limit.unwrap_or_else(|| store.snapshot().page_size);
    let page = store.fetch_list(limit, query.offset.unwrap_or(0)).await?;
    Ok(Json(page))
}

async fn load_more(State(store): State<SharedState>) -> ApiResult<EntryPage> {
    Ok(Json(store.load_more().await?))
}

async fn get_pokemon(
    State(store): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<DetailResponse> {
    let pokemon = store.fetch_detail(EntryRef::from(id)).await?;
    let is_favorite = store.is_favorite(pokemon.id);
    let evolution = store.snapshot().current_evolution;

    Ok(Json(DetailResponse {
        pokemon,
        evolution,
        is_favorite,
    }))
}

async fn search(
    State(store): State<SharedState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<CatalogEntry>> {
    Json(store.search(&query.q).await)
}

async fn list_types(State(store): State<SharedState>) -> Json<Vec<String>> {
    Json(store.fetch_categories().await)
}

/// Loaded entries filtered by type, then generation, then sorted
async fn view_pokemon(
    State(store): State<SharedState>,
    Query(query): Query<ViewQuery>,
) -> Json<Vec<CatalogEntry>> {
    let by_type = store.filter_by_type(query.type_name.as_deref());
    let by_generation = views::filter_by_generation(&by_type, query.generation.as_deref());
    let sort = query
        .sort
        .as_deref()
        .and_then(|s| s.parse::<SortKey>().ok())
        .unwrap_or_default();

    Json(views::sort_entries(&by_generation, sort))
}

async fn get_state(State(store): State<SharedState>) -> Json<CatalogState> {
    Json(store.snapshot())
}

async fn cache_stats(State(store): State<SharedState>) -> Json<CacheStats> {
    Json(store.client().cache_stats())
}

async fn clear_cache(State(store): State<SharedState>) -> Json<ApiResponse> {
    let cleared = store.client().cache_stats().size;
    store.client().clear_cache();
    ApiResponse::ok(format!("Cleared {} cached responses", cleared))
}

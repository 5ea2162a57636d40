//! # Favorites API

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use pokedex_core::CatalogEntry;
use serde::Serialize;

use super::{ApiResponse, ApiResult, SharedState};

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: u32,
    pub favorite: bool,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/favorites", get(list_favorites).delete(clear_favorites))
        .route("/favorites/:id", delete(remove_favorite))
        .route("/favorites/:id/toggle", post(toggle_favorite))
}

async fn list_favorites(State(store): State<SharedState>) -> Json<Vec<CatalogEntry>> {
    Json(store.favorites())
}

async fn toggle_favorite(
    State(store): State<SharedState>,
    Path(id): Path<u32>,
) -> ApiResult<ToggleResponse> {
    let favorite = store.toggle_favorite(id).await?;
    Ok(Json(ToggleResponse { id, favorite }))
}

async fn remove_favorite(
    State(store): State<SharedState>,
    Path(id): Path<u32>,
) -> Json<ApiResponse> {
    let message = if store.remove_favorite(id) {
        format!("Removed {} from favorites", id)
    } else {
        format!("{} was not a favorite", id)
    };
    ApiResponse::ok(message)
}

async fn clear_favorites(State(store): State<SharedState>) -> Json<ApiResponse> {
    store.clear_all_favorites();
    ApiResponse::ok("Favorites cleared")
}

//! # HTTP API
//!
//! JSON endpoints over a shared [`CatalogStore`], nested under `/api/v1`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use pokedex_core::{CatalogError, CatalogStore};
use serde::Serialize;
use std::sync::Arc;

pub mod catalog;
pub mod favorites;

pub type SharedState = Arc<CatalogStore>;

/// Generic outcome body
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// A failed request, rendered as an [`ApiResponse`] with a matching status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            success: false,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// All `/api/v1` routes
pub fn routes() -> Router<SharedState> {
    Router::new()
        .nest("/api/v1", catalog::routes().merge(favorites::routes()))
}

//! Tag endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::{ApiError, ApiResponse, PaginationParams};
use crate::api::websocket::state::AppState;
use crate::types::TagFields;

/// Response for GET /api/stats
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub tags: usize,
    pub clients: usize,
}

/// GET /api/tags - Tag snapshot in insertion order
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Response {
    let tags = match state.store.retrieve_tags().await {
        Ok(tags) => tags,
        Err(e) => return unavailable(e.to_string()),
    };

    let total = tags.len();
    let page: Vec<TagFields> = tags
        .iter()
        .skip(params.offset)
        .take(params.normalized_limit())
        .map(|t| t.to_fields())
        .collect();

    Json(ApiResponse::with_total(page, total)).into_response()
}

/// GET /api/stats - Tag and client counts
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Response {
    let tags = match state.store.count().await {
        Ok(n) => n,
        Err(e) => return unavailable(e.to_string()),
    };
    let clients = match state.registry.count().await {
        Ok(n) => n,
        Err(e) => return unavailable(e.to_string()),
    };

    Json(ApiResponse::new(StatsResponse { tags, clients })).into_response()
}

fn unavailable(message: String) -> Response {
    tracing::error!(error = %message, "rest request failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError::unavailable(message)),
    )
        .into_response()
}

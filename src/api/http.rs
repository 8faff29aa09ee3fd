//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use super::rest::tags;
use super::websocket::{handler::ws_handler, state::AppState};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser dashboards are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // REST API endpoints
        .route("/api/tags", get(tags::list_tags))
        .route("/api/stats", get(tags::get_stats))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::types::Tag;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = Arc::new(AppState::new(&ServerConfig::local()));
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_list_tags_paginates_in_insertion_order() {
        let state = Arc::new(AppState::new(&ServerConfig::local()));
        for n in 0..5u8 {
            let tag = Tag::new(0x3000, 6, 96, vec![0xE2, n], vec![]);
            state.store.add_tags(vec![tag]).await.unwrap();
        }

        let json = get_json(create_router(state), "/api/tags?offset=1&limit=2").await;

        assert_eq!(json["total"], 5);
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["EPC"], "E201");
        assert_eq!(data[1]["EPC"], "E202");
    }

    #[tokio::test]
    async fn test_stats() {
        let state = Arc::new(AppState::new(&ServerConfig::local()));
        let tag = Tag::new(0x3000, 6, 96, vec![0xE2], vec![]);
        state.store.add_tags(vec![tag]).await.unwrap();

        let json = get_json(create_router(state), "/api/stats").await;

        assert_eq!(json["data"]["tags"], 1);
        assert_eq!(json["data"]["clients"], 0);
    }
}

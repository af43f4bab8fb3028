use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::favorites::handlers;
use crate::features::favorites::services::FavoriteService;

/// Favorites routes (all require authentication)
pub fn routes(service: Arc<FavoriteService>) -> Router {
    Router::new()
        .route("/api/favorites/toggle", post(handlers::toggle_favorite))
        .route("/api/favorites", get(handlers::list_favorites))
        .route("/api/favorites/{id}", delete(handlers::remove_favorite))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_pool;
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    fn server() -> TestServer {
        let service = Arc::new(FavoriteService::new(lazy_pool()));
        TestServer::new(with_user(routes(service), test_user("buyer"))).unwrap()
    }

    #[tokio::test]
    async fn test_toggle_without_listing_id_is_bad_request() {
        let response = server()
            .post("/api/favorites/toggle")
            .form(&[("other", "1")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "listing_id is required");
    }

    #[tokio::test]
    async fn test_toggle_with_non_numeric_id_is_bad_request() {
        let response = server()
            .post("/api/favorites/toggle")
            .form(&[("listing_id", "abc")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn test_toggle_with_json_body_is_bad_request() {
        let response = server()
            .post("/api/favorites/toggle")
            .json(&serde_json::json!({ "listing_id": 1 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }
}

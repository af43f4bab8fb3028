use crate::features::accounts::handlers::profile_handler;
use crate::features::accounts::services::AccountService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Own-profile routes (require authentication)
pub fn routes(service: Arc<AccountService>) -> Router {
    Router::new()
        .route(
            "/api/me/profile",
            get(profile_handler::get_profile).patch(profile_handler::update_profile),
        )
        .with_state(service)
}

pub fn public_routes(service: Arc<AccountService>) -> Router {
    Router::new()
        .route(
            "/api/users/{username}",
            get(profile_handler::get_public_profile),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_pool;
    use crate::features::categories::CategoryService;
    use crate::features::favorites::FavoriteService;
    use crate::features::listings::ListingService;
    use crate::shared::test_helpers::{test_user, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn service() -> Arc<AccountService> {
        let pool = lazy_pool();
        let listings = Arc::new(ListingService::new(
            pool.clone(),
            Arc::new(CategoryService::new(pool.clone())),
            Arc::new(FavoriteService::new(pool.clone())),
        ));
        Arc::new(AccountService::new(pool, listings))
    }

    #[tokio::test]
    async fn test_profile_requires_authentication() {
        let server = TestServer::new(routes(service())).unwrap();
        server
            .get("/api/me/profile")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_phone_is_rejected() {
        let app = with_user(routes(service()), test_user("seller"));
        let server = TestServer::new(app).unwrap();
        server
            .patch("/api/me/profile")
            .json(&json!({ "phone": "call me maybe" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::listings::handlers;
use crate::features::listings::services::ListingService;

/// Browsing routes; a bearer token is optional and only personalises output
pub fn public_routes(service: Arc<ListingService>) -> Router {
    Router::new()
        .route("/api/listings", get(handlers::search_listings))
        .route("/api/listings/{slug}", get(handlers::get_listing))
        .route("/api/home", get(handlers::home))
        .with_state(service)
}

/// Seller routes (require authentication)
pub fn protected_routes(service: Arc<ListingService>) -> Router {
    Router::new()
        .route("/api/listings", post(handlers::create_listing))
        .route(
            "/api/listings/{slug}",
            axum::routing::patch(handlers::update_listing).delete(handlers::delete_listing),
        )
        .route("/api/me/listings", get(handlers::my_listings))
        .with_state(service)
}

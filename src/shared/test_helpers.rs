//! Fixtures shared by handler and service tests.

#![cfg(test)]

use axum::{extract::Request, middleware::Next, Router};
use fake::faker::lorem::en::{Sentence, Words};
use fake::Fake;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::ROLE_ADMIN;

pub fn test_user(username: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: format!("sub-{}", username),
        username: username.to_string(),
        email: Some(format!("{}@example.com", username)),
        roles: vec![],
    }
}

pub fn test_admin() -> AuthenticatedUser {
    AuthenticatedUser {
        roles: vec![ROLE_ADMIN.to_string()],
        ..test_user("admin")
    }
}

/// Wrap a router so every request arrives as `user`, skipping token validation
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(move |mut request: Request, next: Next| {
        let user = user.clone();
        async move {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
    }))
}

/// Local user row for `user`, as the services would create it
pub async fn seed_user(pool: &PgPool, user: &AuthenticatedUser) -> i64 {
    sqlx::query_scalar("INSERT INTO users (sub, username, email) VALUES ($1, $2, $3) RETURNING id")
        .bind(&user.sub)
        .bind(&user.username)
        .bind(&user.email)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_category(pool: &PgPool, slug: &str, parent_id: Option<i64>) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO categories (parent_id, name, slug) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(parent_id)
    .bind(slug.replace('-', " "))
    .bind(slug)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Listing with a random title; returns `(id, slug)`
pub async fn seed_listing(
    pool: &PgPool,
    owner_id: i64,
    category_id: i64,
    price: Decimal,
    status: &str,
) -> (i64, String) {
    let words: Vec<String> = Words(2..4).fake();
    let title = words.join(" ");
    let slug = format!("{}-{}", words.join("-").to_lowercase(), &Uuid::new_v4().simple().to_string()[..8]);
    let description: String = Sentence(6..12).fake();

    sqlx::query_as(
        r#"
        INSERT INTO listings (title, slug, description, price, city, category_id, owner_id, status)
        VALUES ($1, $2, $3, $4, 'Chisinau', $5, $6, $7::listing_status)
        RETURNING id, slug
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .bind(price)
    .bind(category_id)
    .bind(owner_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

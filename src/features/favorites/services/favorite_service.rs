use std::collections::HashSet;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::accounts::ensure_user;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::favorites::dtos::{FavoriteDto, FavoriteRow};
use crate::features::listings::models::{ListingStatus, LISTING_COLUMNS, LISTING_JOINS};
use crate::shared::constants::FAVORITES_PAGE_SIZE;
use crate::shared::pagination::PageInfo;

/// State of the favorite after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub is_favorited: bool,
    /// Caller's favorites after the toggle
    pub favorites_count: i64,
}

/// Service for favorite operations
pub struct FavoriteService {
    pool: PgPool,
}

impl FavoriteService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add the listing to the caller's favorites, or remove it if present.
    ///
    /// The listing must be active and owned by someone else. Runs as one
    /// transaction. The user upsert locks the caller's row, so toggles by the
    /// same caller apply one after another.
    pub async fn toggle(&self, user: &AuthenticatedUser, listing_id: i64) -> Result<ToggleOutcome> {
        let mut tx = self.pool.begin().await?;

        let listing: Option<(ListingStatus, String)> = sqlx::query_as(
            r#"
            SELECT l.status, u.sub
            FROM listings l
            JOIN users u ON u.id = l.owner_id
            WHERE l.id = $1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&mut *tx)
        .await?;

        let owner_sub = match listing {
            Some((ListingStatus::Active, owner_sub)) => owner_sub,
            _ => {
                return Err(AppError::NotFound(format!(
                    "Listing {} not found",
                    listing_id
                )))
            }
        };
        if owner_sub == user.sub {
            return Err(AppError::Forbidden(
                "You cannot favorite your own listing".to_string(),
            ));
        }

        let user_id = ensure_user(&mut *tx, user).await?;

        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO favorites (user_id, listing_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, listing_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(listing_id)
        .fetch_optional(&mut *tx)
        .await?;

        let is_favorited = inserted.is_some();
        if !is_favorited {
            sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND listing_id = $2")
                .bind(user_id)
                .bind(listing_id)
                .execute(&mut *tx)
                .await?;
        }

        let favorites_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        tracing::debug!(
            listing_id,
            user = %user.username,
            is_favorited,
            "Favorite toggled"
        );

        Ok(ToggleOutcome {
            is_favorited,
            favorites_count,
        })
    }

    /// Which of `listing_ids` the viewer has favorited, in one query
    pub async fn favorited_among(
        &self,
        viewer: &AuthenticatedUser,
        listing_ids: &[i64],
    ) -> Result<HashSet<i64>> {
        if listing_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT f.listing_id
            FROM favorites f
            JOIN users u ON u.id = f.user_id
            WHERE u.sub = $1 AND f.listing_id = ANY($2)
            "#,
        )
        .bind(&viewer.sub)
        .bind(listing_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up favorites: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(ids.into_iter().collect())
    }

    /// Caller's favorites, newest first
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        raw_page: Option<&str>,
    ) -> Result<(Vec<FavoriteDto>, PageInfo)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM favorites f
            JOIN users fu ON fu.id = f.user_id
            WHERE fu.sub = $1
            "#,
        )
        .bind(&user.sub)
        .fetch_one(&self.pool)
        .await?;

        let page = PageInfo::resolve(raw_page, total, FAVORITES_PAGE_SIZE);

        let sql = format!(
            r#"
            SELECT f.id AS favorite_id, f.created_at AS favorited_at, {}
            FROM favorites f
            JOIN users fu ON fu.id = f.user_id
            JOIN listings l ON l.id = f.listing_id
            {}
            WHERE fu.sub = $1
            ORDER BY f.created_at DESC, f.id DESC
            LIMIT $2 OFFSET $3
            "#,
            LISTING_COLUMNS, LISTING_JOINS
        );
        let rows = sqlx::query_as::<_, FavoriteRow>(&sql)
            .bind(&user.sub)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list favorites: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(FavoriteDto::from).collect(), page))
    }

    /// Remove one of the caller's favorites
    pub async fn remove(&self, user: &AuthenticatedUser, favorite_id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM favorites f
            USING users u
            WHERE u.id = f.user_id AND f.id = $1 AND u.sub = $2
            "#,
        )
        .bind(favorite_id)
        .bind(&user.sub)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Favorite {} not found",
                favorite_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_category, seed_listing, seed_user, test_user};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    struct Fixture {
        service: FavoriteService,
        pool: PgPool,
        listing_id: i64,
    }

    async fn fixture(pool: PgPool, status: &str) -> Fixture {
        let seller_id = seed_user(&pool, &test_user("seller")).await;
        let category_id = seed_category(&pool, "electronics", None).await;
        let (listing_id, _) =
            seed_listing(&pool, seller_id, category_id, Decimal::new(500, 0), status).await;
        Fixture {
            service: FavoriteService::new(pool.clone()),
            pool,
            listing_id,
        }
    }

    async fn favorite_rows(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM favorites")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_toggle_twice_restores_state(pool: PgPool) {
        let f = fixture(pool, "active").await;
        let buyer = test_user("buyer");

        let on = f.service.toggle(&buyer, f.listing_id).await.unwrap();
        assert!(on.is_favorited);
        assert_eq!(on.favorites_count, 1);

        let off = f.service.toggle(&buyer, f.listing_id).await.unwrap();
        assert!(!off.is_favorited);
        assert_eq!(off.favorites_count, 0);
        assert_eq!(favorite_rows(&f.pool).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_own_listing_is_forbidden(pool: PgPool) {
        let f = fixture(pool, "active").await;

        let err = f
            .service
            .toggle(&test_user("seller"), f.listing_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(favorite_rows(&f.pool).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_inactive_or_missing_listing_is_not_found(pool: PgPool) {
        let f = fixture(pool, "sold").await;
        let buyer = test_user("buyer");

        let err = f.service.toggle(&buyer, f.listing_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = f.service.toggle(&buyer, 987_654).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_list_and_remove(pool: PgPool) {
        let f = fixture(pool, "active").await;
        let buyer = test_user("buyer");
        f.service.toggle(&buyer, f.listing_id).await.unwrap();

        let favorited = f
            .service
            .favorited_among(&buyer, &[f.listing_id, 42])
            .await
            .unwrap();
        assert_eq!(favorited, HashSet::from([f.listing_id]));

        let (items, page) = f.service.list(&buyer, None).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(page.total, 1);
        assert_eq!(items[0].listing.id, f.listing_id);

        // someone else cannot remove it
        let err = f
            .service
            .remove(&test_user("stranger"), items[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        f.service.remove(&buyer, items[0].id).await.unwrap();
        assert_eq!(favorite_rows(&f.pool).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_concurrent_toggles_alternate(pool: PgPool) {
        let f = fixture(pool, "active").await;
        let service = Arc::new(f.service);
        let toggles = 9;

        let calls = (0..toggles).map(|_| {
            let service = Arc::clone(&service);
            let listing_id = f.listing_id;
            tokio::spawn(async move { service.toggle(&test_user("buyer"), listing_id).await })
        });

        let mut added = 0;
        for outcome in futures::future::join_all(calls).await {
            if outcome.unwrap().unwrap().is_favorited {
                added += 1;
            }
        }
        assert_eq!(added, toggles / 2 + 1);
        assert_eq!(favorite_rows(&f.pool).await, toggles % 2);
    }
}

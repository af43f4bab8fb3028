use std::collections::HashSet;
use std::sync::Arc;

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::accounts::ensure_user;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::CategoryService;
use crate::features::favorites::FavoriteService;
use crate::features::listings::dtos::{
    CreateListingDto, HomeDto, ListingCardDto, ListingDetailDto, ListingSearchQuery,
    ListingSummaryDto, NewImageDto, UpdateListingDto,
};
use crate::features::listings::models::{
    listing_select, ListingImage, ListingRow, ListingStatus,
};
use crate::features::listings::services::{escape_like, ListingFilters, ListingSort};
use crate::shared::constants::{
    HOME_FEATURED_LIMIT, HOME_RECENT_LIMIT, HOME_TOP_CATEGORIES, MY_LISTINGS_PAGE_SIZE,
    SEARCH_PAGE_SIZE, SIMILAR_LISTINGS_LIMIT,
};
use crate::shared::pagination::PageInfo;
use crate::shared::slug::{numbered_slug, slugify};

/// Attempts at inserting a listing before a slug collision is reported.
/// An attempt only fails when a concurrent creator committed the same slug.
const MAX_SLUG_ATTEMPTS: u32 = 8;

/// Service for listing operations
pub struct ListingService {
    pool: PgPool,
    categories: Arc<CategoryService>,
    favorites: Arc<FavoriteService>,
}

impl ListingService {
    pub fn new(
        pool: PgPool,
        categories: Arc<CategoryService>,
        favorites: Arc<FavoriteService>,
    ) -> Self {
        Self {
            pool,
            categories,
            favorites,
        }
    }

    /// Search active listings.
    ///
    /// An unknown category reference is ignored like any other malformed filter.
    pub async fn search(
        &self,
        query: &ListingSearchQuery,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<(Vec<ListingCardDto>, PageInfo)> {
        let category_ids = match query.category.as_deref().map(str::trim) {
            Some(reference) if !reference.is_empty() => {
                match self.categories.resolve_subtree(reference).await {
                    Ok(ids) => Some(ids),
                    Err(AppError::NotFound(_)) => {
                        tracing::debug!(reference, "Ignoring unknown category filter");
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => None,
        };

        let filters = ListingFilters::from_raw(
            query.seller.as_deref(),
            query.min_price.as_deref(),
            query.max_price.as_deref(),
            query.city.as_deref(),
            query.search.as_deref(),
        )
        .with_categories(category_ids);
        let sort = ListingSort::parse(query.sort.as_deref());

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM listings l JOIN users u ON u.id = l.owner_id",
        );
        filters.push_where(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count listings: {:?}", e);
                AppError::Database(e)
            })?;

        let page = PageInfo::resolve(query.page.as_deref(), total, SEARCH_PAGE_SIZE);

        let mut select = QueryBuilder::<Postgres>::new(listing_select());
        filters.push_where(&mut select);
        select
            .push(" ORDER BY ")
            .push(sort.order_by())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search listings: {:?}", e);
                AppError::Database(e)
            })?;

        let favorited = self.favorited(viewer, &rows).await?;
        Ok((to_cards(rows, &favorited), page))
    }

    /// Listing page. Counts one view per call.
    pub async fn get_detail(
        &self,
        slug: &str,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<ListingDetailDto> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE listings
            SET views_count = views_count + 1
            WHERE slug = $1 AND status = 'active'
            RETURNING id
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        let id = id.ok_or_else(|| AppError::NotFound(format!("Listing '{}' not found", slug)))?;
        self.load_detail(id, viewer).await
    }

    /// Create a listing owned by `user`, with its image references
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateListingDto,
    ) -> Result<ListingDetailDto> {
        self.ensure_active_category(dto.category_id).await?;

        let base = match slugify(&dto.title) {
            s if s.is_empty() => "listing".to_string(),
            s => s,
        };

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let mut tx = self.pool.begin().await?;
            let owner_id = ensure_user(&mut *tx, user).await?;
            let slug = free_slug(&mut *tx, &base).await?;

            let inserted: std::result::Result<i64, sqlx::Error> = sqlx::query_scalar(
                r#"
                INSERT INTO listings (title, slug, description, price, city, category_id, owner_id, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
            )
            .bind(&dto.title)
            .bind(&slug)
            .bind(&dto.description)
            .bind(dto.price)
            .bind(&dto.city)
            .bind(dto.category_id)
            .bind(owner_id)
            .bind(ListingStatus::Active)
            .fetch_one(&mut *tx)
            .await;

            let id = match inserted {
                Ok(id) => id,
                Err(e) if is_unique_violation(&e) => {
                    tracing::debug!(slug = %slug, attempt, "Listing slug taken concurrently, retrying");
                    continue;
                }
                Err(e) => {
                    tracing::error!("Failed to create listing: {:?}", e);
                    return Err(AppError::Database(e));
                }
            };

            insert_images(&mut *tx, id, &dto.title, &dto.images).await?;
            tx.commit().await?;

            tracing::info!(listing_id = id, slug = %slug, owner = %user.username, "Listing created");
            return self.load_detail(id, Some(user)).await;
        }

        Err(AppError::Conflict(format!(
            "Could not find a free slug for '{}'",
            dto.title
        )))
    }

    /// Partial update by the owner. The slug never changes.
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        slug: &str,
        dto: UpdateListingDto,
    ) -> Result<ListingDetailDto> {
        if let Some(category_id) = dto.category_id {
            self.ensure_active_category(category_id).await?;
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "{} WHERE l.slug = $1 AND u.sub = $2 FOR UPDATE OF l",
            listing_select()
        );
        let current = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(slug)
            .bind(&user.sub)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Listing '{}' not found", slug)))?;

        let title = dto.title.unwrap_or(current.title);
        sqlx::query(
            r#"
            UPDATE listings
            SET title = $2, description = $3, price = $4, city = $5,
                category_id = $6, status = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(current.id)
        .bind(&title)
        .bind(dto.description.unwrap_or(current.description))
        .bind(dto.price.unwrap_or(current.price))
        .bind(dto.city.unwrap_or(current.city))
        .bind(dto.category_id.unwrap_or(current.category_id))
        .bind(dto.status.unwrap_or(current.status))
        .execute(&mut *tx)
        .await?;

        if !dto.remove_image_ids.is_empty() {
            sqlx::query("DELETE FROM listing_images WHERE listing_id = $1 AND id = ANY($2)")
                .bind(current.id)
                .bind(&dto.remove_image_ids)
                .execute(&mut *tx)
                .await?;
        }
        insert_images(&mut *tx, current.id, &title, &dto.add_images).await?;

        tx.commit().await?;

        tracing::info!(listing_id = current.id, slug, "Listing updated");
        self.load_detail(current.id, Some(user)).await
    }

    /// Delete a listing owned by `user`; images and favorites go with it
    pub async fn delete(&self, user: &AuthenticatedUser, slug: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM listings l
            USING users u
            WHERE u.id = l.owner_id AND l.slug = $1 AND u.sub = $2
            "#,
        )
        .bind(slug)
        .bind(&user.sub)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Listing '{}' not found", slug)));
        }

        tracing::info!(slug, owner = %user.username, "Listing deleted");
        Ok(())
    }

    /// The caller's listings in every status, newest first.
    /// An unrecognised status filter lists everything.
    pub async fn my_listings(
        &self,
        user: &AuthenticatedUser,
        status: Option<&str>,
        raw_page: Option<&str>,
    ) -> Result<(Vec<ListingSummaryDto>, PageInfo)> {
        let status = status.and_then(ListingStatus::parse);

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM listings l JOIN users u ON u.id = l.owner_id",
        );
        push_owner_filter(&mut count, &user.sub, status);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let page = PageInfo::resolve(raw_page, total, MY_LISTINGS_PAGE_SIZE);

        let mut select = QueryBuilder::<Postgres>::new(listing_select());
        push_owner_filter(&mut select, &user.sub, status);
        select
            .push(" ORDER BY ")
            .push(ListingSort::NewestFirst.order_by())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = select
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), page))
    }

    /// Landing page: recent and featured listings plus the busiest categories
    pub async fn home(&self, viewer: Option<&AuthenticatedUser>) -> Result<HomeDto> {
        let recent_sql = format!(
            "{} WHERE l.status = 'active' ORDER BY {} LIMIT $1",
            listing_select(),
            ListingSort::NewestFirst.order_by()
        );
        let recent = sqlx::query_as::<_, ListingRow>(&recent_sql)
            .bind(HOME_RECENT_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        let featured_sql = format!(
            "{} WHERE l.status = 'active' AND l.is_featured ORDER BY {} LIMIT $1",
            listing_select(),
            ListingSort::NewestFirst.order_by()
        );
        let featured = sqlx::query_as::<_, ListingRow>(&featured_sql)
            .bind(HOME_FEATURED_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        let top_categories = self
            .categories
            .top_by_listing_count(HOME_TOP_CATEGORIES)
            .await?;

        // one lookup covers both lists
        let all: Vec<ListingRow> = recent.iter().chain(featured.iter()).cloned().collect();
        let favorited = self.favorited(viewer, &all).await?;

        Ok(HomeDto {
            recent: to_cards(recent, &favorited),
            featured: to_cards(featured, &favorited),
            top_categories,
        })
    }

    /// Active listings of one seller, newest first, with their total
    pub async fn active_by_owner(
        &self,
        owner_id: i64,
        limit: i64,
    ) -> Result<(Vec<ListingSummaryDto>, i64)> {
        let sql = format!(
            "{} WHERE l.owner_id = $1 AND l.status = 'active' ORDER BY {} LIMIT $2",
            listing_select(),
            ListingSort::NewestFirst.order_by()
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(owner_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM listings WHERE owner_id = $1 AND status = 'active'",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn load_detail(
        &self,
        id: i64,
        viewer: Option<&AuthenticatedUser>,
    ) -> Result<ListingDetailDto> {
        let sql = format!("{} WHERE l.id = $1", listing_select());
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", id)))?;

        let images = sqlx::query_as::<_, ListingImage>(
            r#"
            SELECT id, listing_id, image, alt_text, created_at
            FROM listing_images
            WHERE listing_id = $1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let similar_sql = format!(
            "{} WHERE l.category_id = $1 AND l.status = 'active' AND l.id <> $2 ORDER BY {} LIMIT $3",
            listing_select(),
            ListingSort::NewestFirst.order_by()
        );
        let similar = sqlx::query_as::<_, ListingRow>(&similar_sql)
            .bind(row.category_id)
            .bind(id)
            .bind(SIMILAR_LISTINGS_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        let mut lookup = similar.clone();
        lookup.push(row.clone());
        let favorited = self.favorited(viewer, &lookup).await?;

        let is_owner = viewer.is_some_and(|v| v.sub == row.owner_sub);
        let is_favorited = favorited.contains(&row.id);
        let description = row.description.clone();
        let updated_at = row.updated_at;

        Ok(ListingDetailDto {
            listing: row.into(),
            description,
            updated_at,
            images: images.into_iter().map(Into::into).collect(),
            is_favorited,
            is_owner,
            similar: to_cards(similar, &favorited),
        })
    }

    /// Favorited ids among `rows` for the viewer; empty for anonymous callers
    async fn favorited(
        &self,
        viewer: Option<&AuthenticatedUser>,
        rows: &[ListingRow],
    ) -> Result<HashSet<i64>> {
        match viewer {
            Some(viewer) => {
                let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
                self.favorites.favorited_among(viewer, &ids).await
            }
            None => Ok(HashSet::new()),
        }
    }

    async fn ensure_active_category(&self, category_id: i64) -> Result<()> {
        let active: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND is_active)",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        if active {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "category_id: {} is not an active category",
                category_id
            )))
        }
    }
}

fn push_owner_filter(
    qb: &mut QueryBuilder<'_, Postgres>,
    owner_sub: &str,
    status: Option<ListingStatus>,
) {
    qb.push(" WHERE u.sub = ").push_bind(owner_sub.to_string());
    if let Some(status) = status {
        qb.push(" AND l.status = ").push_bind(status);
    }
}

fn to_cards(rows: Vec<ListingRow>, favorited: &HashSet<i64>) -> Vec<ListingCardDto> {
    rows.into_iter()
        .map(|row| ListingCardDto {
            is_favorited: favorited.contains(&row.id),
            listing: row.into(),
        })
        .collect()
}

/// First of `base`, `base-2`, `base-3`, ... not used by any listing
async fn free_slug(conn: &mut PgConnection, base: &str) -> Result<String> {
    let taken: Vec<String> =
        sqlx::query_scalar(r"SELECT slug FROM listings WHERE slug = $1 OR slug LIKE $2 ESCAPE '\'")
            .bind(base)
            .bind(format!("{}-%", escape_like(base)))
            .fetch_all(&mut *conn)
            .await?;
    let taken: HashSet<String> = taken.into_iter().collect();

    let slug = (1..)
        .map(|n| numbered_slug(base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string());
    Ok(slug)
}

async fn insert_images(
    conn: &mut PgConnection,
    listing_id: i64,
    title: &str,
    images: &[NewImageDto],
) -> Result<()> {
    if images.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO listing_images (listing_id, image, alt_text) ",
    );
    qb.push_values(images, |mut b, image| {
        let alt_text = image
            .alt_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Image for {}", title));
        b.push_bind(listing_id)
            .push_bind(image.image.trim().to_string())
            .push_bind(alt_text);
    });
    qb.build().execute(&mut *conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{seed_category, seed_listing, seed_user, test_user};
    use rust_decimal::Decimal;

    fn service(pool: &PgPool) -> ListingService {
        ListingService::new(
            pool.clone(),
            Arc::new(CategoryService::new(pool.clone())),
            Arc::new(FavoriteService::new(pool.clone())),
        )
    }

    fn query(pairs: &[(&str, &str)]) -> ListingSearchQuery {
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        };
        ListingSearchQuery {
            seller: get("seller"),
            category: get("category"),
            min_price: get("min_price"),
            max_price: get("max_price"),
            city: get("city"),
            search: get("search"),
            sort: get("sort"),
            page: get("page"),
        }
    }

    fn ids(cards: &[ListingCardDto]) -> Vec<i64> {
        cards.iter().map(|c| c.listing.id).collect()
    }

    async fn views(pool: &PgPool, id: i64) -> i64 {
        sqlx::query_scalar("SELECT views_count FROM listings WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn new_listing(title: &str, category_id: i64) -> CreateListingDto {
        CreateListingDto {
            title: title.to_string(),
            description: "Stare buna".to_string(),
            price: Decimal::new(150, 0),
            city: "Chisinau".to_string(),
            category_id,
            images: vec![NewImageDto {
                image: "listings/a.jpg".to_string(),
                alt_text: None,
            }],
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_category_and_price_filter(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let electronics = seed_category(&pool, "electronics", None).await;
        let phones = seed_category(&pool, "phones", Some(electronics)).await;
        let auto = seed_category(&pool, "auto", None).await;
        let (phone, _) = seed_listing(&pool, seller, phones, Decimal::new(500, 0), "active").await;
        seed_listing(&pool, seller, auto, Decimal::new(500, 0), "active").await;

        let service = service(&pool);
        let (found, _) = service
            .search(
                &query(&[("category", "electronics"), ("min_price", "400"), ("max_price", "600")]),
                None,
            )
            .await
            .unwrap();
        assert_eq!(ids(&found), vec![phone]);

        let (found, _) = service
            .search(&query(&[("category", "electronics"), ("max_price", "100")]), None)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_category_filter_stays_inside_subtree(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let root = seed_category(&pool, "electronics", None).await;
        let child = seed_category(&pool, "phones", Some(root)).await;
        let grandchild = seed_category(&pool, "android", Some(child)).await;
        let other = seed_category(&pool, "auto", None).await;
        for category in [root, child, grandchild, other] {
            seed_listing(&pool, seller, category, Decimal::new(10, 0), "active").await;
        }

        let (found, page) = service(&pool)
            .search(&query(&[("category", "electronics")]), None)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(found
            .iter()
            .all(|c| [root, child, grandchild].contains(&c.listing.category_id)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unknown_category_and_bogus_sort_are_ignored(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let category = seed_category(&pool, "auto", None).await;
        for _ in 0..3 {
            seed_listing(&pool, seller, category, Decimal::new(10, 0), "active").await;
        }
        let service = service(&pool);

        let (plain, _) = service.search(&query(&[]), None).await.unwrap();
        let (bogus, _) = service
            .search(&query(&[("sort", "bogus_value"), ("category", "nope")]), None)
            .await
            .unwrap();
        assert_eq!(ids(&plain), ids(&bogus));
        assert_eq!(plain.len(), 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_page_past_end_returns_last_page(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let category = seed_category(&pool, "auto", None).await;
        for _ in 0..3 {
            seed_listing(&pool, seller, category, Decimal::new(10, 0), "active").await;
        }

        let (items, page) = service(&pool)
            .search(&query(&[("page", "999")]), None)
            .await
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(items.len(), 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_search_matches_like_metacharacters_literally(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let category = seed_category(&pool, "auto", None).await;
        seed_listing(&pool, seller, category, Decimal::new(10, 0), "active").await;

        let (found, _) = service(&pool)
            .search(&query(&[("search", "%")]), None)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_sequential_views_are_counted(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let category = seed_category(&pool, "auto", None).await;
        let (id, slug) = seed_listing(&pool, seller, category, Decimal::new(10, 0), "active").await;

        let service = service(&pool);
        for _ in 0..10 {
            service.get_detail(&slug, None).await.unwrap();
        }
        assert_eq!(views(&pool, id).await, 10);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_concurrent_views_are_counted(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let category = seed_category(&pool, "auto", None).await;
        let (id, slug) = seed_listing(&pool, seller, category, Decimal::new(10, 0), "active").await;

        let service = Arc::new(service(&pool));
        let reads = (0..20).map(|_| {
            let service = Arc::clone(&service);
            let slug = slug.clone();
            tokio::spawn(async move { service.get_detail(&slug, None).await })
        });
        for read in futures::future::join_all(reads).await {
            read.unwrap().unwrap();
        }
        assert_eq!(views(&pool, id).await, 20);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_inactive_listing_detail_is_not_found(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let category = seed_category(&pool, "auto", None).await;
        let (id, slug) = seed_listing(&pool, seller, category, Decimal::new(10, 0), "draft").await;

        let err = service(&pool).get_detail(&slug, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(views(&pool, id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_numbers_colliding_slugs(pool: PgPool) {
        let category = seed_category(&pool, "bikes", None).await;
        let service = service(&pool);
        let user = test_user("seller");

        let first = service.create(&user, new_listing("Bicicletă BMX", category)).await.unwrap();
        let second = service.create(&user, new_listing("Bicicleta BMX", category)).await.unwrap();

        assert_eq!(first.listing.slug, "bicicleta-bmx");
        assert_eq!(second.listing.slug, "bicicleta-bmx-2");
        assert_eq!(first.images[0].alt_text, "Image for Bicicletă BMX");
        assert!(first.is_owner);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_concurrent_creates_get_distinct_slugs(pool: PgPool) {
        let category = seed_category(&pool, "bikes", None).await;
        let service = Arc::new(service(&pool));

        let creates = (0..MAX_SLUG_ATTEMPTS).map(|i| {
            let service = Arc::clone(&service);
            let seller = test_user(&format!("seller_{}", i));
            tokio::spawn(async move {
                service
                    .create(&seller, new_listing("Bicicleta BMX", category))
                    .await
            })
        });

        let mut slugs = HashSet::new();
        for created in futures::future::join_all(creates).await {
            let created = created.unwrap().unwrap();
            assert!(created.listing.slug.starts_with("bicicleta-bmx"));
            slugs.insert(created.listing.slug);
        }
        assert_eq!(slugs.len(), MAX_SLUG_ATTEMPTS as usize);
        assert!(slugs.contains("bicicleta-bmx"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_update_and_delete_are_owner_only(pool: PgPool) {
        let category = seed_category(&pool, "bikes", None).await;
        let service = service(&pool);
        let owner = test_user("seller");
        let created = service.create(&owner, new_listing("Bicicleta", category)).await.unwrap();
        let slug = created.listing.slug.clone();

        let dto = UpdateListingDto {
            status: Some(ListingStatus::Sold),
            remove_image_ids: vec![created.images[0].id],
            ..Default::default()
        };
        let err = service
            .update(&test_user("stranger"), &slug, dto.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let updated = service.update(&owner, &slug, dto).await.unwrap();
        assert_eq!(updated.listing.status, ListingStatus::Sold);
        assert_eq!(updated.listing.slug, slug);
        assert!(updated.images.is_empty());

        let err = service.delete(&test_user("stranger"), &slug).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        service.delete(&owner, &slug).await.unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_rejects_inactive_category(pool: PgPool) {
        let category = seed_category(&pool, "bikes", None).await;
        sqlx::query("UPDATE categories SET is_active = FALSE WHERE id = $1")
            .bind(category)
            .execute(&pool)
            .await
            .unwrap();

        let err = service(&pool)
            .create(&test_user("seller"), new_listing("Bicicleta", category))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_viewer_favorites_are_annotated(pool: PgPool) {
        let seller = seed_user(&pool, &test_user("seller")).await;
        let category = seed_category(&pool, "auto", None).await;
        let (liked, _) = seed_listing(&pool, seller, category, Decimal::new(10, 0), "active").await;
        seed_listing(&pool, seller, category, Decimal::new(20, 0), "active").await;

        let buyer = test_user("buyer");
        FavoriteService::new(pool.clone())
            .toggle(&buyer, liked)
            .await
            .unwrap();

        let (cards, _) = service(&pool).search(&query(&[]), Some(&buyer)).await.unwrap();
        for card in cards {
            assert_eq!(card.is_favorited, card.listing.id == liked);
        }
    }
}

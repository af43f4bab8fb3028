use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::accounts::dtos::{
    ProfileDto, ProfileStatsDto, PublicProfileDto, UpdateProfileDto,
};
use crate::features::accounts::models::{User, UserProfile};
use crate::features::accounts::services::ensure_user;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::listings::ListingService;
use crate::shared::constants::PROFILE_PREVIEW_SIZE;

const USER_COLUMNS: &str = "id, sub, username, email, first_name, last_name, date_joined";
const PROFILE_COLUMNS: &str =
    "user_id, phone, city, bio, avatar_url, average_rating, created_at, updated_at";

/// Service for local accounts and profiles
pub struct AccountService {
    pool: PgPool,
    listings: Arc<ListingService>,
}

impl AccountService {
    pub fn new(pool: PgPool, listings: Arc<ListingService>) -> Self {
        Self { pool, listings }
    }

    /// Caller's profile, created on first access
    pub async fn profile(&self, user: &AuthenticatedUser) -> Result<ProfileDto> {
        let user_id = ensure_user(&self.pool, user).await?;
        let profile = self.get_or_create_profile(user_id).await?;
        let account = self.user_by_id(user_id).await?;

        let stats = sqlx::query_as::<_, ProfileStatsDto>(
            r#"
            SELECT
                COUNT(*) AS total_listings,
                COUNT(*) FILTER (WHERE status = 'active') AS active_listings,
                COUNT(*) FILTER (WHERE status = 'sold') AS sold_listings
            FROM listings
            WHERE owner_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProfileDto {
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            phone: profile.phone,
            city: profile.city,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            average_rating: profile.average_rating,
            member_since: account.date_joined,
            stats,
        })
    }

    /// Update the caller's names and contact details in one transaction
    pub async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<ProfileDto> {
        let trim = |value: &Option<String>| value.as_deref().map(str::trim).map(str::to_string);

        let mut tx = self.pool.begin().await?;
        let user_id = ensure_user(&mut *tx, user).await?;

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name)
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(trim(&dto.first_name))
        .bind(trim(&dto.last_name))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, phone, city, bio, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
                SET phone = COALESCE(EXCLUDED.phone, user_profiles.phone),
                    city = COALESCE(EXCLUDED.city, user_profiles.city),
                    bio = COALESCE(EXCLUDED.bio, user_profiles.bio),
                    avatar_url = COALESCE(EXCLUDED.avatar_url, user_profiles.avatar_url),
                    updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(trim(&dto.phone))
        .bind(trim(&dto.city))
        .bind(trim(&dto.bio))
        .bind(trim(&dto.avatar_url))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update profile for {}: {:?}", user.sub, e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!(user = %user.username, "Profile updated");
        self.profile(user).await
    }

    /// Profile of any user, by username
    pub async fn public_profile(&self, username: &str) -> Result<PublicProfileDto> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let account = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

        let sql = format!(
            "SELECT {} FROM user_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(account.id)
            .fetch_optional(&self.pool)
            .await?;

        let (listings, active_listings_count) = self
            .listings
            .active_by_owner(account.id, PROFILE_PREVIEW_SIZE)
            .await?;

        let (city, bio, avatar_url, average_rating) = match profile {
            Some(p) => (p.city, p.bio, p.avatar_url, p.average_rating),
            None => (None, None, None, Default::default()),
        };

        Ok(PublicProfileDto {
            username: account.username,
            first_name: account.first_name,
            city,
            bio,
            avatar_url,
            average_rating,
            member_since: account.date_joined,
            active_listings_count,
            listings,
        })
    }

    async fn user_by_id(&self, user_id: i64) -> Result<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let account = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(account)
    }

    async fn get_or_create_profile(&self, user_id: i64) -> Result<UserProfile> {
        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM user_profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }
}

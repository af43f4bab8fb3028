use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Lifecycle of a listing. Only `active` listings are publicly visible.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    #[default]
    Active,
    Sold,
    Removed,
}

impl ListingStatus {
    /// Parse a wire value; unknown values yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "sold" => Some(Self::Sold),
            "removed" => Some(Self::Removed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Sold => "sold",
            Self::Removed => "removed",
        }
    }
}

/// Select list for [`ListingRow`]; pair with [`LISTING_JOINS`]
pub const LISTING_COLUMNS: &str = r#"
    l.id, l.title, l.slug, l.description, l.price, l.city,
    l.category_id, c.name AS category_name, c.slug AS category_slug,
    l.owner_id, u.sub AS owner_sub, u.username AS owner_username,
    l.status, l.views_count, l.is_featured, l.created_at, l.updated_at,
    (SELECT i.image FROM listing_images i WHERE i.listing_id = l.id ORDER BY i.id LIMIT 1) AS primary_image
"#;

/// Joins needed by [`LISTING_COLUMNS`], with `listings` aliased as `l`
pub const LISTING_JOINS: &str = r#"
    JOIN categories c ON c.id = l.category_id
    JOIN users u ON u.id = l.owner_id
"#;

/// Listing joined with its category and owner
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub city: String,
    pub category_id: i64,
    pub category_name: String,
    pub category_slug: String,
    pub owner_id: i64,
    pub owner_sub: String,
    pub owner_username: String,
    pub status: ListingStatus,
    pub views_count: i64,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub primary_image: Option<String>,
}

/// `SELECT ... FROM listings l JOIN ...` without a WHERE clause
pub fn listing_select() -> String {
    format!("SELECT {} FROM listings l {}", LISTING_COLUMNS, LISTING_JOINS)
}

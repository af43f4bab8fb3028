use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Column list for the `categories` table
pub const CATEGORY_COLUMNS: &str =
    "id, parent_id, name, slug, description, icon, display_order, is_active, created_at, updated_at";

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

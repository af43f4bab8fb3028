use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Reference to an image blob held in external storage
#[derive(Debug, Clone, FromRow)]
pub struct ListingImage {
    pub id: i64,
    pub listing_id: i64,
    pub image: String,
    pub alt_text: String,
    pub created_at: DateTime<Utc>,
}

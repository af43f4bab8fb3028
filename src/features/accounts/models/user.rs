use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Local mirror of an identity
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub sub: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub average_rating: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

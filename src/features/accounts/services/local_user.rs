use sqlx::PgExecutor;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

/// Upsert the local user row for a validated identity and return its id.
///
/// Keyed on `sub`; username and email follow the latest token. Takes any
/// executor so write paths can run it inside their own transaction.
pub async fn ensure_user<'e, E>(executor: E, user: &AuthenticatedUser) -> Result<i64>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO users (sub, username, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (sub) DO UPDATE
            SET username = EXCLUDED.username,
                email = COALESCE(EXCLUDED.email, users.email)
        RETURNING id
        "#,
    )
    .bind(&user.sub)
    .bind(&user.username)
    .bind(&user.email)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Username '{}' is already taken", user.username))
        } else {
            tracing::error!("Failed to sync local user {}: {:?}", user.sub, e);
            AppError::Database(e)
        }
    })
}

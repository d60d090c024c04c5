//! Session allowlist rows.
//!
//! A bearer token is live only while a matching row exists here. Issuing a
//! token inserts a row; logout deletes exactly one matching row; logout-all
//! clears every row for the user. There is no expiry sweep: revocation is
//! deletion, and the token's own `exp` claim is checked at verification time.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: i32,
    pub user_id: i32,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub async fn insert(pool: &PgPool, user_id: i32, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO sessions (user_id, token) VALUES ($1, $2)")
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Removes exactly one row matching this token. Two logins in the same
    /// second can legitimately produce identical token strings, so the delete
    /// is limited to a single row rather than every match.
    pub async fn revoke(pool: &PgPool, user_id: i32, token: &str) -> Result<(), AppError> {
        sqlx::query(
            "DELETE FROM sessions WHERE id = \
             (SELECT id FROM sessions WHERE user_id = $1 AND token = $2 LIMIT 1)",
        )
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn revoke_all(pool: &PgPool, user_id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn count_for_user(pool: &PgPool, user_id: i32) -> Result<i64, AppError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}

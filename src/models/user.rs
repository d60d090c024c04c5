//! User entity: the database row, its sanitized public view, the profile
//! patch payload, and the credential/cascade queries that operate on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::auth::password::verify_password;
use crate::error::AppError;

const USER_COLUMNS: &str = "id, name, email, age, password_hash, created_at, updated_at";

/// A user row as stored in the database. The avatar blob is deliberately not
/// part of this struct; it is large, rarely needed, and fetched by the avatar
/// routes alone.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The sanitized representation of a user: no password hash, no session
/// tokens, no avatar bytes. This is the only user shape ever serialized to a
/// client.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Patch payload for `PATCH /users/me`. Any key outside this set rejects the
/// whole request at deserialization time, before any field is applied.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 0, message = "age must be a positive number"))]
    pub age: Option<i32>,
    #[validate(length(min = 7), custom = "crate::auth::password_content")]
    pub password: Option<String>,
}

impl User {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Resolves a verified token claim to a user, but only when that exact
    /// token string is still present in the user's session allowlist. This is
    /// what makes logout effective for tokens whose signature is otherwise
    /// still valid.
    pub async fn find_by_id_and_token(
        pool: &PgPool,
        id: i32,
        token: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT u.{} FROM users u \
             INNER JOIN sessions s ON s.user_id = u.id \
             WHERE u.id = $1 AND s.token = $2 \
             LIMIT 1",
            USER_COLUMNS.replace(", ", ", u.")
        ))
        .bind(id)
        .bind(token)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Looks a user up by email and checks the password against the stored
    /// bcrypt hash. "Email not found" and "password mismatch" are
    /// distinguished only in the debug log; callers receive one generic
    /// failure either way.
    pub async fn find_by_credentials(
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = match Self::find_by_email(pool, email).await? {
            Some(user) => user,
            None => {
                log::debug!("login failed: email not found");
                return Err(AppError::BadRequest("Unable to login".into()));
            }
        };

        if !verify_password(password, &user.password_hash)? {
            log::debug!("login failed: password mismatch for user {}", user.id);
            return Err(AppError::BadRequest("Unable to login".into()));
        }

        Ok(user)
    }

    pub async fn insert(
        pool: &PgPool,
        name: &str,
        email: &str,
        age: i32,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, age, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    /// Removes the user together with everything they own. Tasks and sessions
    /// go first, inside the same transaction as the user row itself.
    pub async fn delete_cascade(pool: &PgPool, user_id: i32) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

//! Database pool setup.
//!
//! Connects once at process start; the pool lives for the process lifetime
//! and is shared with handlers through `web::Data`. Migrations run on every
//! startup and are idempotent.

use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn establish_connection(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Ok(pool)
}

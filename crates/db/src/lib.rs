//! PostgreSQL persistence for Easel: pool construction, migrations, row
//! models, and repositories.
//!
//! The drawing log lives in the `canvas_sessions` table, one row per room,
//! with strokes and shapes as JSONB arrays. Appends are single-statement
//! JSONB concatenations, so they are atomic per call and ordered per room
//! even with multiple server processes writing concurrently.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe, used by startup checks and `/health`.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply embedded migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

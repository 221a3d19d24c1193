//! Read-only repository for the `users` table.

use sqlx::PgPool;

use easel_core::types::DbId;

use crate::models::user::User;

const COLUMNS: &str = "id, name, email, created_at";

/// Lookups against the externally-managed users table.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by internal ID (the JWT `sub` claim).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

//! User entity model.

use sqlx::FromRow;

use easel_core::types::{DbId, Timestamp};

/// Row from the `users` table. Written by the external auth service;
/// read here only to resolve display names.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}

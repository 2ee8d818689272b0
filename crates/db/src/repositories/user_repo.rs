//! Repository for the `users` table.

use juris_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str =
    "id, tenant_id, display_name, email, is_lawyer, is_active, created_at, updated_at";

/// Provides lookups for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by ID.
    pub async fn get(pool: &PgPool, user_id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active lawyer within a tenant by display name or email,
    /// case-insensitive. Inactive users and non-lawyers never match.
    pub async fn find_active_lawyer(
        pool: &PgPool,
        tenant_id: DbId,
        reference: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users \
             WHERE tenant_id = $1 \
               AND is_lawyer = true AND is_active = true \
               AND (LOWER(display_name) = LOWER($2) OR LOWER(email) = LOWER($2))"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(tenant_id)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    /// List the display names of a tenant's active lawyers, alphabetically.
    pub async fn list_active_lawyer_names(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT display_name FROM users \
             WHERE tenant_id = $1 AND is_lawyer = true AND is_active = true \
             ORDER BY display_name",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }
}

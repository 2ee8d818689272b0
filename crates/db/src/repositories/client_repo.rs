//! Repository for the `clients` table.

use juris_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::Client;

/// Column list for `clients` queries.
const COLUMNS: &str = "id, tenant_id, display_name, email, created_at, updated_at";

/// Provides lookups for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Find a client within a tenant by display name, case-insensitive.
    pub async fn find_by_name(
        pool: &PgPool,
        tenant_id: DbId,
        name: &str,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clients \
             WHERE tenant_id = $1 AND LOWER(display_name) = LOWER($2)"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(tenant_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}

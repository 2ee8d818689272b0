//! Repository for the `classifications` table.

use juris_core::types::DbId;
use sqlx::PgPool;

use crate::models::classification::Classification;

/// Column list for `classifications` queries.
const COLUMNS: &str = "id, tenant_id, code, label, is_active, created_at, updated_at";

/// Provides lookups for case classifications.
pub struct ClassificationRepo;

impl ClassificationRepo {
    /// Find an active classification within a tenant by code,
    /// case-insensitive.
    pub async fn find_by_code(
        pool: &PgPool,
        tenant_id: DbId,
        code: &str,
    ) -> Result<Option<Classification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM classifications \
             WHERE tenant_id = $1 AND is_active = true AND LOWER(code) = LOWER($2)"
        );
        sqlx::query_as::<_, Classification>(&query)
            .bind(tenant_id)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's active classification codes, alphabetically.
    pub async fn list_active_codes(
        pool: &PgPool,
        tenant_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT code FROM classifications \
             WHERE tenant_id = $1 AND is_active = true \
             ORDER BY code",
        )
        .bind(tenant_id)
        .fetch_all(pool)
        .await
    }
}

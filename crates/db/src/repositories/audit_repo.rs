//! Repository for the `audit_logs` table.

use juris_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str =
    "id, tenant_id, actor_id, action_type, entity_type, entity_id, details, created_at";

/// Provides insert and query operations for the audit trail.
pub struct AuditRepo;

impl AuditRepo {
    /// Insert a single audit trail entry, returning the generated ID.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO audit_logs \
                (tenant_id, actor_id, action_type, entity_type, entity_id, details) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(entry.tenant_id)
        .bind(entry.actor_id)
        .bind(&entry.action_type)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.details)
        .fetch_one(pool)
        .await
    }

    /// List a tenant's audit entries for one entity, newest-first.
    pub async fn list_for_entity(
        pool: &PgPool,
        tenant_id: DbId,
        entity_type: &str,
        entity_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE tenant_id = $1 AND entity_type = $2 AND entity_id = $3 \
             ORDER BY created_at DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(tenant_id)
            .bind(entity_type)
            .bind(entity_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

//! Repository for the `tenant_quotas` table.
//!
//! Admission is a two-step protocol: [`QuotaRepo::reserve`] atomically
//! grants up to the requested number of slots under a row lock, and each
//! created case later moves one slot from reserved to used via
//! [`QuotaRepo::commit_one`]. Slots that were reserved but never produced a
//! case are returned with [`QuotaRepo::release`]. Reading the quota and
//! acting on it separately would let two concurrent imports both admit into
//! the last remaining slots.

use juris_core::types::DbId;
use sqlx::PgPool;

use crate::models::quota::TenantQuota;

/// Column list for `tenant_quotas` queries.
const COLUMNS: &str = "tenant_id, case_limit, cases_used, cases_reserved, updated_at";

/// Provides quota reads and the atomic reservation protocol.
pub struct QuotaRepo;

impl QuotaRepo {
    /// Fetch a tenant's quota row.
    pub async fn get(pool: &PgPool, tenant_id: DbId) -> Result<Option<TenantQuota>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tenant_quotas WHERE tenant_id = $1");
        sqlx::query_as::<_, TenantQuota>(&query)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically reserve up to `requested` case slots for a tenant.
    ///
    /// Returns the number of slots actually granted: `requested` for
    /// unlimited plans, otherwise `min(requested, remaining)` where
    /// remaining accounts for both used and already-reserved slots. Returns
    /// `None` when the tenant has no quota row.
    pub async fn reserve(
        pool: &PgPool,
        tenant_id: DbId,
        requested: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar(
            "WITH prior AS ( \
                 SELECT case_limit, cases_used, cases_reserved \
                 FROM tenant_quotas \
                 WHERE tenant_id = $1 \
                 FOR UPDATE \
             ), \
             granted AS ( \
                 SELECT CASE \
                     WHEN case_limit < 0 THEN $2 \
                     ELSE LEAST($2, GREATEST(case_limit - cases_used - cases_reserved, 0)) \
                 END AS slots \
                 FROM prior \
             ) \
             UPDATE tenant_quotas q \
             SET cases_reserved = q.cases_reserved + granted.slots, updated_at = NOW() \
             FROM granted \
             WHERE q.tenant_id = $1 \
             RETURNING granted.slots",
        )
        .bind(tenant_id)
        .bind(requested)
        .fetch_optional(pool)
        .await
    }

    /// Convert one reserved slot into a used slot after a case is created.
    pub async fn commit_one(pool: &PgPool, tenant_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tenant_quotas \
             SET cases_used = cases_used + 1, \
                 cases_reserved = GREATEST(cases_reserved - 1, 0), \
                 updated_at = NOW() \
             WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Return reserved slots that did not produce cases.
    pub async fn release(pool: &PgPool, tenant_id: DbId, count: i64) -> Result<(), sqlx::Error> {
        if count <= 0 {
            return Ok(());
        }
        sqlx::query(
            "UPDATE tenant_quotas \
             SET cases_reserved = GREATEST(cases_reserved - $2, 0), updated_at = NOW() \
             WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .bind(count)
        .execute(pool)
        .await?;
        Ok(())
    }
}

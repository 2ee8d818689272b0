//! Quota admission gate.

use juris_core::admission::{decide, AdmissionDecision};
use juris_core::error::CoreError;
use juris_core::types::DbId;
use juris_db::repositories::QuotaRepo;
use juris_db::DbPool;

use crate::error::ImportError;

/// Admission control over tenant case quotas.
///
/// [`QuotaGate::preview`] is read-only math for immediate user feedback.
/// [`QuotaGate::admit`] atomically reserves the granted slots under a row
/// lock and is the decision the import run honors; a preview can be
/// overtaken by a concurrent import between upload and execution.
pub struct QuotaGate;

impl QuotaGate {
    /// Compute the admission decision for `requested` rows without
    /// reserving anything.
    pub async fn preview(
        pool: &DbPool,
        tenant_id: DbId,
        requested: i64,
    ) -> Result<AdmissionDecision, ImportError> {
        let quota = QuotaRepo::get(pool, tenant_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "tenant_quota",
                id: tenant_id,
            })?;
        Ok(decide(&quota.snapshot(), requested))
    }

    /// Atomically reserve slots for `requested` rows and return the
    /// binding admission decision.
    pub async fn admit(
        pool: &DbPool,
        tenant_id: DbId,
        requested: i64,
    ) -> Result<AdmissionDecision, ImportError> {
        let allowed = QuotaRepo::reserve(pool, tenant_id, requested)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "tenant_quota",
                id: tenant_id,
            })?;
        Ok(AdmissionDecision {
            total_rows: requested,
            allowed_count: allowed,
            skipped_count: requested - allowed,
            truncation_index: allowed,
        })
    }
}

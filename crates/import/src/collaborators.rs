//! Database-backed collaborators for [`BulkImporter`](crate::BulkImporter).
//!
//! Each implementation is a thin adapter from a collaborator trait onto the
//! repository layer. Conflict classification happens here: 23505 violations
//! are matched against the schema's named unique constraints so the importer
//! sees conflicts as values rather than raw driver errors.

use async_trait::async_trait;
use juris_core::audit::{action_types, entity_types};
use juris_core::case_number::format_case_number;
use juris_core::types::DbId;
use juris_db::models::audit::CreateAuditLog;
use juris_db::models::case::CreateCase;
use juris_db::repositories::{
    AuditRepo, CaseRepo, ClassificationRepo, ClientRepo, ImportJobRepo, QuotaRepo, UserRepo,
};
use juris_db::DbPool;

use crate::error::{unique_violation, ImportError};
use crate::importer::{
    AuditSink, CaseWriter, ProgressSink, QuotaLedger, ReferenceResolver, WriteOutcome,
};

/// Unique constraint on `(tenant_id, case_number)`.
const CASE_NUMBER_CONSTRAINT: &str = "uq_cases_tenant_case_number";

/// Unique index on `(tenant_id, filing_number)`.
const FILING_NUMBER_CONSTRAINT: &str = "uq_cases_tenant_filing_number";

// ---------------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------------

/// Resolves spreadsheet references through the tenant-scoped lookup queries.
pub struct PgReferenceResolver {
    pool: DbPool,
}

impl PgReferenceResolver {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceResolver for PgReferenceResolver {
    async fn resolve_client(
        &self,
        tenant_id: DbId,
        reference: &str,
    ) -> Result<Option<DbId>, ImportError> {
        let client = ClientRepo::find_by_name(&self.pool, tenant_id, reference).await?;
        Ok(client.map(|c| c.id))
    }

    async fn resolve_lawyer(
        &self,
        tenant_id: DbId,
        reference: &str,
    ) -> Result<Option<DbId>, ImportError> {
        let lawyer = UserRepo::find_active_lawyer(&self.pool, tenant_id, reference).await?;
        Ok(lawyer.map(|u| u.id))
    }

    async fn resolve_classification(
        &self,
        tenant_id: DbId,
        code: &str,
    ) -> Result<Option<DbId>, ImportError> {
        let classification = ClassificationRepo::find_by_code(&self.pool, tenant_id, code).await?;
        Ok(classification.map(|c| c.id))
    }
}

// ---------------------------------------------------------------------------
// Case persistence
// ---------------------------------------------------------------------------

/// Allocates case numbers from the per-tenant sequence and inserts cases.
pub struct PgCaseWriter {
    pool: DbPool,
}

impl PgCaseWriter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseWriter for PgCaseWriter {
    async fn next_case_number(&self, tenant_id: DbId, year: i32) -> Result<String, ImportError> {
        let sequence = CaseRepo::next_case_sequence(&self.pool, tenant_id, year).await?;
        Ok(format_case_number(year, sequence))
    }

    async fn insert_case(&self, input: &CreateCase) -> Result<WriteOutcome, ImportError> {
        match CaseRepo::insert(&self.pool, input).await {
            Ok(case) => Ok(WriteOutcome::Created(case.id)),
            Err(err) => match unique_violation(&err) {
                Some(CASE_NUMBER_CONSTRAINT) => Ok(WriteOutcome::CaseNumberConflict),
                Some(FILING_NUMBER_CONSTRAINT) => Ok(WriteOutcome::FilingNumberConflict),
                _ => Err(err.into()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Quota, audit, progress
// ---------------------------------------------------------------------------

/// Moves reserved quota slots to used as cases land.
pub struct PgQuotaLedger {
    pool: DbPool,
}

impl PgQuotaLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotaLedger for PgQuotaLedger {
    async fn commit_one(&self, tenant_id: DbId) -> Result<(), ImportError> {
        QuotaRepo::commit_one(&self.pool, tenant_id).await?;
        Ok(())
    }
}

/// Writes `CREATE` audit entries for imported cases. A failed write is
/// logged and swallowed; the case it describes stays.
pub struct PgAuditSink {
    pool: DbPool,
}

impl PgAuditSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn case_created(
        &self,
        tenant_id: DbId,
        actor_id: DbId,
        case_id: DbId,
        case_number: &str,
    ) {
        let entry = CreateAuditLog {
            tenant_id,
            actor_id: Some(actor_id),
            action_type: action_types::CREATE.to_string(),
            entity_type: entity_types::CASE.to_string(),
            entity_id: Some(case_id),
            details: serde_json::json!({
                "case_number": case_number,
                "source": "bulk_import",
            }),
        };
        if let Err(err) = AuditRepo::insert(&self.pool, &entry).await {
            tracing::warn!(case_id, error = %err, "Failed to write audit entry for imported case");
        }
    }
}

/// Persists run counters onto the job row, which also refreshes its
/// liveness timestamp.
pub struct JobProgressSink {
    pool: DbPool,
    job_id: DbId,
}

impl JobProgressSink {
    pub fn new(pool: DbPool, job_id: DbId) -> Self {
        Self { pool, job_id }
    }
}

#[async_trait]
impl ProgressSink for JobProgressSink {
    async fn report(&self, processed: i64, created: i64, failed: i64) {
        if let Err(err) =
            ImportJobRepo::update_progress(&self.pool, self.job_id, processed, created, failed)
                .await
        {
            tracing::warn!(job_id = self.job_id, error = %err, "Failed to persist import progress");
        }
    }
}

//! Repository for the `import_jobs` table.
//!
//! Uses `ImportJobStatus` from `models::status` for all status transitions.
//! Every transition is guarded by the expected current status so a crashed
//! or duplicate worker cannot move a job backwards.

use juris_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::import_job::{CreateImportJob, ImportJob};
use crate::models::status::{ImportJobStatus, StatusId};

/// Column list for `import_jobs` queries.
const COLUMNS: &str = "\
    id, public_id, tenant_id, initiated_by, file_path, file_sha256, file_size_bytes, \
    status_id, total_rows, allowed_count, skipped_count, truncation_index, \
    processed_rows, created_count, failed_count, error_message, \
    claimed_by, claimed_at, started_at, completed_at, created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Statuses of jobs a worker currently holds.
const IN_FLIGHT_STATUSES: [StatusId; 3] = [
    ImportJobStatus::Analyzing as StatusId,
    ImportJobStatus::Admitted as StatusId,
    ImportJobStatus::Running as StatusId,
];

/// Provides CRUD operations and lifecycle transitions for import jobs.
pub struct ImportJobRepo;

impl ImportJobRepo {
    /// Enqueue a new pending import job, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateImportJob) -> Result<ImportJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO import_jobs \
                (public_id, tenant_id, initiated_by, file_path, file_sha256, file_size_bytes, \
                 status_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(input.public_id)
            .bind(input.tenant_id)
            .bind(input.initiated_by)
            .bind(&input.file_path)
            .bind(&input.file_sha256)
            .bind(input.file_size_bytes)
            .bind(ImportJobStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Fetch a job by internal ID.
    pub async fn get(pool: &PgPool, job_id: DbId) -> Result<Option<ImportJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM import_jobs WHERE id = $1");
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a job by its public identifier, scoped to a tenant.
    pub async fn get_by_public_id(
        pool: &PgPool,
        tenant_id: DbId,
        public_id: Uuid,
    ) -> Result<Option<ImportJob>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM import_jobs WHERE tenant_id = $1 AND public_id = $2");
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(tenant_id)
            .bind(public_id)
            .fetch_optional(pool)
            .await
    }

    /// List a tenant's jobs newest-first.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ImportJob>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM import_jobs \
             WHERE tenant_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(tenant_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Atomically claim the oldest pending job for a worker.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` to prevent double-dispatch when
    /// multiple workers poll concurrently. The claimed job moves to
    /// `Analyzing`.
    pub async fn claim_next(
        pool: &PgPool,
        worker_id: &str,
    ) -> Result<Option<ImportJob>, sqlx::Error> {
        let query = format!(
            "UPDATE import_jobs \
             SET claimed_by = $1, claimed_at = NOW(), status_id = $2, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM import_jobs \
                 WHERE status_id = $3 AND claimed_at IS NULL \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(worker_id)
            .bind(ImportJobStatus::Analyzing.id())
            .bind(ImportJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Record the admission decision and move `Analyzing` to `Admitted`.
    ///
    /// Returns `false` if the job was not in `Analyzing`.
    pub async fn record_admission(
        pool: &PgPool,
        job_id: DbId,
        total_rows: i64,
        allowed_count: i64,
        skipped_count: i64,
        truncation_index: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_jobs \
             SET total_rows = $2, allowed_count = $3, skipped_count = $4, \
                 truncation_index = $5, status_id = $6, updated_at = NOW() \
             WHERE id = $1 AND status_id = $7",
        )
        .bind(job_id)
        .bind(total_rows)
        .bind(allowed_count)
        .bind(skipped_count)
        .bind(truncation_index)
        .bind(ImportJobStatus::Admitted.id())
        .bind(ImportJobStatus::Analyzing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move `Admitted` to `Running` and stamp `started_at`.
    pub async fn mark_running(pool: &PgPool, job_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_jobs \
             SET status_id = $2, started_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(job_id)
        .bind(ImportJobStatus::Running.id())
        .bind(ImportJobStatus::Admitted.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update run counters; also refreshes `updated_at`, which doubles as
    /// the liveness signal for stall detection.
    pub async fn update_progress(
        pool: &PgPool,
        job_id: DbId,
        processed_rows: i64,
        created_count: i64,
        failed_count: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE import_jobs \
             SET processed_rows = $2, created_count = $3, failed_count = $4, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(job_id)
        .bind(processed_rows)
        .bind(created_count)
        .bind(failed_count)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Move `Running` to `Completed` with final counters.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        processed_rows: i64,
        created_count: i64,
        failed_count: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_jobs \
             SET status_id = $2, processed_rows = $3, created_count = $4, failed_count = $5, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $6",
        )
        .bind(job_id)
        .bind(ImportJobStatus::Completed.id())
        .bind(processed_rows)
        .bind(created_count)
        .bind(failed_count)
        .bind(ImportJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a non-terminal job to `Failed` with an error message.
    pub async fn fail(
        pool: &PgPool,
        job_id: DbId,
        error_message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($4, $5)",
        )
        .bind(job_id)
        .bind(ImportJobStatus::Failed.id())
        .bind(error_message)
        .bind(ImportJobStatus::Completed.id())
        .bind(ImportJobStatus::Failed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fail every in-flight job whose `updated_at` is older than
    /// `stall_secs`, returning the affected rows so the caller can release
    /// quota reservations and notify initiators.
    ///
    /// Catches jobs orphaned by a worker crash; a live worker refreshes
    /// `updated_at` with every progress write.
    pub async fn fail_stalled(
        pool: &PgPool,
        stall_secs: i64,
        error_message: &str,
    ) -> Result<Vec<ImportJob>, sqlx::Error> {
        let query = format!(
            "UPDATE import_jobs \
             SET status_id = $1, error_message = $2, completed_at = NOW(), updated_at = NOW() \
             WHERE status_id IN ($3, $4, $5) \
               AND updated_at < NOW() - make_interval(secs => $6::double precision) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(ImportJobStatus::Failed.id())
            .bind(error_message)
            .bind(IN_FLIGHT_STATUSES[0])
            .bind(IN_FLIGHT_STATUSES[1])
            .bind(IN_FLIGHT_STATUSES[2])
            .bind(stall_secs)
            .fetch_all(pool)
            .await
    }
}

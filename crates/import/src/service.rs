//! Request-facing import operations.
//!
//! [`ImportService`] is the surface an HTTP handler (or any other caller)
//! talks to: upload intake, admission previews, job status reads, and
//! template generation. Uploads are validated and staged synchronously;
//! the actual run happens later on a scheduler worker.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use juris_core::admission::AdmissionDecision;
use juris_core::error::CoreError;
use juris_core::hashing::sha256_hex;
use juris_core::spreadsheet::{analyze, Locale, MAX_UPLOAD_BYTES};
use juris_core::template::render_template;
use juris_core::types::DbId;
use juris_db::models::import_job::{CreateImportJob, ImportJob};
use juris_db::models::import_row_failure::ImportRowFailure;
use juris_db::models::status::ImportJobStatus;
use juris_db::repositories::{
    ClassificationRepo, ImportFailureRepo, ImportJobRepo, UserRepo,
};
use juris_db::DbPool;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::quota::QuotaGate;

/// Assumed wall-clock cost per imported row, for user-facing estimates.
const ROW_ESTIMATE_MS: i64 = 40;

/// What the initiator gets back immediately after an upload is accepted.
///
/// The counts come from a read-only preview; the binding admission happens
/// when a worker claims the job and reserves quota slots, so a concurrent
/// import can shift the final figures.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReceipt {
    pub public_id: Uuid,
    pub total_rows: i64,
    pub admitted_count: i64,
    pub skipped_count: i64,
    pub estimated_duration_secs: i64,
}

/// Point-in-time view of a job for status polling.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatusView {
    pub public_id: Uuid,
    pub status: &'static str,
    pub total_rows: Option<i64>,
    pub allowed_count: Option<i64>,
    pub skipped_count: Option<i64>,
    pub processed_rows: i64,
    pub created_count: i64,
    pub failed_count: i64,
    pub error_message: Option<String>,
}

impl JobStatusView {
    fn from_job(job: &ImportJob) -> Self {
        let status = ImportJobStatus::from_id(job.status_id)
            .map(ImportJobStatus::name)
            .unwrap_or("unknown");
        Self {
            public_id: job.public_id,
            status,
            total_rows: job.total_rows,
            allowed_count: job.allowed_count,
            skipped_count: job.skipped_count,
            processed_rows: job.processed_rows,
            created_count: job.created_count,
            failed_count: job.failed_count,
            error_message: job.error_message.clone(),
        }
    }
}

/// Upload intake, status reads, and template generation.
pub struct ImportService {
    pool: DbPool,
    config: ImportConfig,
}

impl ImportService {
    pub fn new(pool: DbPool, config: ImportConfig) -> Self {
        Self { pool, config }
    }

    /// Analyze an uploaded file and compute the admission it would get
    /// right now, without staging it or reserving anything.
    pub async fn preview(
        &self,
        tenant_id: DbId,
        bytes: &[u8],
    ) -> Result<AdmissionDecision, ImportError> {
        let summary = analyze(bytes)?;
        QuotaGate::preview(&self.pool, tenant_id, summary.row_count).await
    }

    /// Validate an upload, stage it, and enqueue a pending import job.
    ///
    /// Format problems abort here with no job created; a receipt means the
    /// file was accepted and a worker will pick it up.
    pub async fn launch_import(
        &self,
        tenant_id: DbId,
        initiated_by: DbId,
        bytes: &[u8],
    ) -> Result<ImportReceipt, ImportError> {
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(CoreError::Validation(format!(
                "file exceeds the {MAX_UPLOAD_BYTES} byte upload limit"
            ))
            .into());
        }

        let summary = analyze(bytes)?;
        let decision = QuotaGate::preview(&self.pool, tenant_id, summary.row_count).await?;

        let public_id = Uuid::now_v7();
        let path = stage_upload(&self.config.staging_dir, public_id, bytes).await?;

        let input = CreateImportJob {
            public_id,
            tenant_id,
            initiated_by,
            file_path: path.to_string_lossy().into_owned(),
            file_sha256: sha256_hex(bytes),
            file_size_bytes: bytes.len() as i64,
        };
        let job = ImportJobRepo::create(&self.pool, &input).await?;
        info!(
            job_id = job.id,
            tenant_id,
            total_rows = summary.row_count,
            "Enqueued import job"
        );

        Ok(ImportReceipt {
            public_id,
            total_rows: decision.total_rows,
            admitted_count: decision.allowed_count,
            skipped_count: decision.skipped_count,
            estimated_duration_secs: estimate_duration_secs(decision.allowed_count),
        })
    }

    /// Fetch the current status of a job by its public identifier.
    pub async fn job_status(
        &self,
        tenant_id: DbId,
        public_id: Uuid,
    ) -> Result<Option<JobStatusView>, ImportError> {
        let job = ImportJobRepo::get_by_public_id(&self.pool, tenant_id, public_id).await?;
        Ok(job.as_ref().map(JobStatusView::from_job))
    }

    /// List a job's per-row failures in file order.
    ///
    /// Returns `None` when no such job exists for the tenant; a job with a
    /// clean run yields `Some` of an empty list.
    pub async fn job_failures(
        &self,
        tenant_id: DbId,
        public_id: Uuid,
    ) -> Result<Option<Vec<ImportRowFailure>>, ImportError> {
        let Some(job) = ImportJobRepo::get_by_public_id(&self.pool, tenant_id, public_id).await?
        else {
            return Ok(None);
        };
        let failures = ImportFailureRepo::list_for_job(&self.pool, job.id).await?;
        Ok(Some(failures))
    }

    /// Render a localized template pre-filled with the tenant's active
    /// lawyers and classification codes.
    pub async fn generate_template(
        &self,
        tenant_id: DbId,
        locale: Locale,
    ) -> Result<Vec<u8>, ImportError> {
        let lawyers = UserRepo::list_active_lawyer_names(&self.pool, tenant_id).await?;
        let codes = ClassificationRepo::list_active_codes(&self.pool, tenant_id).await?;
        Ok(render_template(locale, &lawyers, &codes)?)
    }
}

/// Write an upload into the staging directory as `<public_id>.csv`,
/// creating the directory if needed. Workers re-read the file from here.
async fn stage_upload(
    staging_dir: &Path,
    public_id: Uuid,
    bytes: &[u8],
) -> Result<PathBuf, std::io::Error> {
    let path = staging_dir.join(format!("{public_id}.csv"));
    tokio::fs::create_dir_all(staging_dir).await?;
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Rounded-up wall-clock estimate for importing `rows` rows.
fn estimate_duration_secs(rows: i64) -> i64 {
    (rows.max(0) * ROW_ESTIMATE_MS + 999) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn staging_writes_the_upload_under_its_public_id() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("imports");
        let public_id = Uuid::now_v7();

        let path = stage_upload(&staging, public_id, b"Title,Client\n")
            .await
            .unwrap();

        assert_eq!(path, staging.join(format!("{public_id}.csv")));
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, b"Title,Client\n");
    }

    #[test]
    fn estimate_rounds_up_to_whole_seconds() {
        assert_eq!(estimate_duration_secs(0), 0);
        assert_eq!(estimate_duration_secs(1), 1);
        assert_eq!(estimate_duration_secs(25), 1);
        assert_eq!(estimate_duration_secs(26), 2);
        assert_eq!(estimate_duration_secs(500), 20);
        assert_eq!(estimate_duration_secs(-5), 0);
    }

    #[test]
    fn status_view_mirrors_the_job_row() {
        let job = ImportJob {
            id: 1,
            public_id: Uuid::now_v7(),
            tenant_id: 7,
            initiated_by: 99,
            file_path: "/tmp/juris/imports/x.csv".to_string(),
            file_sha256: "0".repeat(64),
            file_size_bytes: 10,
            status_id: ImportJobStatus::Running.id(),
            total_rows: Some(10),
            allowed_count: Some(8),
            skipped_count: Some(2),
            truncation_index: Some(8),
            processed_rows: 5,
            created_count: 4,
            failed_count: 1,
            error_message: None,
            claimed_by: Some("import-worker-0".to_string()),
            claimed_at: Some(Utc::now()),
            started_at: Some(Utc::now()),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let view = JobStatusView::from_job(&job);
        assert_eq!(view.status, "running");
        assert_eq!(view.public_id, job.public_id);
        assert_eq!(view.total_rows, Some(10));
        assert_eq!(view.processed_rows, 5);
        assert_eq!(view.created_count, 4);
        assert_eq!(view.failed_count, 1);
    }

    #[test]
    fn status_view_tolerates_an_unknown_status_id() {
        let job = ImportJob {
            id: 1,
            public_id: Uuid::now_v7(),
            tenant_id: 7,
            initiated_by: 99,
            file_path: "/tmp/juris/imports/x.csv".to_string(),
            file_sha256: "0".repeat(64),
            file_size_bytes: 10,
            status_id: 99,
            total_rows: None,
            allowed_count: None,
            skipped_count: None,
            truncation_index: None,
            processed_rows: 0,
            created_count: 0,
            failed_count: 0,
            error_message: None,
            claimed_by: None,
            claimed_at: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(JobStatusView::from_job(&job).status, "unknown");
    }
}

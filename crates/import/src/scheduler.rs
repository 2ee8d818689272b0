//! Background execution of import jobs.
//!
//! [`ImportScheduler`] runs a small pool of worker loops that poll the
//! `import_jobs` queue, plus one housekeeping loop that sweeps stalled
//! jobs. Claims go through `FOR UPDATE SKIP LOCKED`, so adding workers or
//! whole processes never double-runs a job, and a process restart leaves
//! queued work in place for the next claimant.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use juris_core::audit::entity_types;
use juris_core::spreadsheet::read_sheet;
use juris_core::types::DbId;
use juris_db::models::import_job::ImportJob;
use juris_db::repositories::{ImportFailureRepo, ImportJobRepo, QuotaRepo};
use juris_db::DbPool;
use juris_events::bus::{event_types, EventBus, PlatformEvent};

use crate::collaborators::{
    JobProgressSink, PgAuditSink, PgCaseWriter, PgQuotaLedger, PgReferenceResolver,
};
use crate::config::ImportConfig;
use crate::importer::BulkImporter;
use crate::quota::QuotaGate;

/// How often the housekeeping loop looks for stalled jobs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Error message recorded on jobs failed by the stall sweep.
const STALL_MESSAGE: &str = "worker stopped reporting progress";

/// Owns the worker pool that executes import jobs.
pub struct ImportScheduler {
    pool: DbPool,
    bus: Arc<EventBus>,
    config: ImportConfig,
}

impl ImportScheduler {
    pub fn new(pool: DbPool, bus: Arc<EventBus>, config: ImportConfig) -> Self {
        Self { pool, bus, config }
    }

    /// Spawn the configured number of worker loops plus the housekeeping
    /// loop. All loops run until `cancel` fires; the returned handles let
    /// the caller await a clean drain on shutdown.
    pub fn spawn_workers(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.config.worker_count + 1);

        for n in 0..self.config.worker_count {
            let worker_id = format!("import-worker-{n}");
            let pool = self.pool.clone();
            let bus = Arc::clone(&self.bus);
            let config = self.config.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, pool, bus, config, cancel).await;
            }));
        }

        let pool = self.pool.clone();
        let bus = Arc::clone(&self.bus);
        let config = self.config.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            housekeeping_loop(pool, bus, config, cancel).await;
        }));

        handles
    }
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

/// Poll for pending jobs and process them one at a time.
///
/// Each tick drains the queue: a busy system keeps workers working instead
/// of sleeping between single jobs.
async fn worker_loop(
    worker_id: String,
    pool: DbPool,
    bus: Arc<EventBus>,
    config: ImportConfig,
    cancel: CancellationToken,
) {
    info!(worker = %worker_id, "Import worker started");
    let mut interval = tokio::time::interval(config.poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(worker = %worker_id, "Import worker stopping");
                break;
            }
            _ = interval.tick() => {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    match ImportJobRepo::claim_next(&pool, &worker_id).await {
                        Ok(Some(job)) => process_job(&pool, &bus, job).await,
                        Ok(None) => break,
                        Err(err) => {
                            error!(worker = %worker_id, error = %err, "Failed to poll for import jobs");
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Drive one claimed job through analysis, admission, and the import run.
///
/// The job is already in `Analyzing` when this is called. Every exit path
/// leaves the job in a terminal state or releases its claim to the stall
/// sweeper, and reserved quota slots are always returned.
async fn process_job(pool: &DbPool, bus: &EventBus, job: ImportJob) {
    info!(job_id = job.id, tenant_id = job.tenant_id, "Processing import job");

    let bytes = match tokio::fs::read(&job.file_path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            fail_job(pool, bus, &job, &format!("could not read staged file: {err}")).await;
            return;
        }
    };

    // Re-analyze from disk. The upload endpoint already validated the
    // file, but admission must be based on what the worker can read now.
    let sheet = match read_sheet(&bytes) {
        Ok(sheet) => sheet,
        Err(err) => {
            fail_job(pool, bus, &job, &format!("file failed analysis: {err}")).await;
            return;
        }
    };
    let total_rows = sheet.rows.len() as i64;

    let decision = match QuotaGate::admit(pool, job.tenant_id, total_rows).await {
        Ok(decision) => decision,
        Err(err) => {
            fail_job(pool, bus, &job, &format!("quota admission failed: {err}")).await;
            return;
        }
    };

    match ImportJobRepo::record_admission(
        pool,
        job.id,
        decision.total_rows,
        decision.allowed_count,
        decision.skipped_count,
        decision.truncation_index,
    )
    .await
    {
        Ok(true) => {}
        Ok(false) => {
            warn!(job_id = job.id, "Import job left Analyzing before admission; abandoning");
            release_quota(pool, job.tenant_id, decision.allowed_count).await;
            return;
        }
        Err(err) => {
            release_quota(pool, job.tenant_id, decision.allowed_count).await;
            fail_job(pool, bus, &job, &format!("could not record admission: {err}")).await;
            return;
        }
    }

    match ImportJobRepo::mark_running(pool, job.id).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(job_id = job.id, "Import job left Admitted before start; abandoning");
            release_quota(pool, job.tenant_id, decision.allowed_count).await;
            return;
        }
        Err(err) => {
            release_quota(pool, job.tenant_id, decision.allowed_count).await;
            fail_job(pool, bus, &job, &format!("could not start run: {err}")).await;
            return;
        }
    }

    let importer = BulkImporter::new(
        Arc::new(PgReferenceResolver::new(pool.clone())),
        Arc::new(PgCaseWriter::new(pool.clone())),
        Arc::new(PgQuotaLedger::new(pool.clone())),
        Arc::new(PgAuditSink::new(pool.clone())),
    )
    .with_progress(Arc::new(JobProgressSink::new(pool.clone(), job.id)));

    match importer
        .run(job.tenant_id, job.initiated_by, &sheet, decision.truncation_index)
        .await
    {
        Ok(outcome) => {
            if let Err(err) = ImportFailureRepo::batch_insert(pool, job.id, &outcome.failures).await
            {
                error!(job_id = job.id, error = %err, "Failed to persist row failures");
            }
            release_quota(
                pool,
                job.tenant_id,
                decision.allowed_count - outcome.created_count,
            )
            .await;
            match ImportJobRepo::complete(
                pool,
                job.id,
                outcome.attempted_count(),
                outcome.created_count,
                outcome.failed_count(),
            )
            .await
            {
                Ok(true) => {
                    info!(
                        job_id = job.id,
                        created = outcome.created_count,
                        failed = outcome.failed_count(),
                        skipped = decision.skipped_count,
                        "Import job completed"
                    );
                    bus.publish(completed_event(
                        &job,
                        outcome.created_count,
                        outcome.failed_count(),
                        decision.skipped_count,
                        decision.total_rows,
                    ));
                }
                Ok(false) => {
                    warn!(job_id = job.id, "Import job was not Running at completion; leaving as-is");
                }
                Err(err) => {
                    error!(job_id = job.id, error = %err, "Failed to mark import job completed");
                }
            }
        }
        Err(err) => {
            // The run flushed its final counters before bailing; re-read
            // them so exactly the unused reservations are returned.
            let created = match ImportJobRepo::get(pool, job.id).await {
                Ok(Some(row)) => row.created_count,
                Ok(None) => 0,
                Err(read_err) => {
                    error!(job_id = job.id, error = %read_err, "Could not re-read job after aborted run");
                    0
                }
            };
            release_quota(pool, job.tenant_id, decision.allowed_count - created).await;
            fail_job(pool, bus, &job, &format!("import aborted: {err}")).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Housekeeping loop
// ---------------------------------------------------------------------------

/// Periodically fail in-flight jobs whose worker has gone silent, return
/// their unused reservations, and notify the initiators.
async fn housekeeping_loop(
    pool: DbPool,
    bus: Arc<EventBus>,
    config: ImportConfig,
    cancel: CancellationToken,
) {
    info!("Import housekeeping started");
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Import housekeeping stopping");
                break;
            }
            _ = interval.tick() => {
                match ImportJobRepo::fail_stalled(&pool, config.stall_timeout_secs, STALL_MESSAGE).await {
                    Ok(jobs) => {
                        for job in jobs {
                            warn!(
                                job_id = job.id,
                                claimed_by = job.claimed_by.as_deref().unwrap_or("unknown"),
                                "Failed stalled import job"
                            );
                            let remainder = job.allowed_count.unwrap_or(0) - job.created_count;
                            release_quota(&pool, job.tenant_id, remainder).await;
                            bus.publish(failed_event(&job, STALL_MESSAGE));
                        }
                    }
                    Err(err) => error!(error = %err, "Stalled job sweep failed"),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Move a job to `Failed` and announce it. No-op when already terminal.
async fn fail_job(pool: &DbPool, bus: &EventBus, job: &ImportJob, message: &str) {
    match ImportJobRepo::fail(pool, job.id, message).await {
        Ok(true) => bus.publish(failed_event(job, message)),
        Ok(false) => warn!(job_id = job.id, "Import job already terminal; not failing"),
        Err(err) => error!(job_id = job.id, error = %err, "Failed to mark import job failed"),
    }
}

/// Return reserved quota slots; errors are logged, never propagated.
async fn release_quota(pool: &DbPool, tenant_id: DbId, count: i64) {
    if let Err(err) = QuotaRepo::release(pool, tenant_id, count).await {
        error!(tenant_id, count, error = %err, "Failed to release reserved quota slots");
    }
}

fn completed_event(
    job: &ImportJob,
    created: i64,
    failed: i64,
    skipped: i64,
    total: i64,
) -> PlatformEvent {
    PlatformEvent::new(event_types::IMPORT_COMPLETED)
        .with_tenant(job.tenant_id)
        .with_source(entity_types::IMPORT_JOB, job.id)
        .with_actor(job.initiated_by)
        .with_payload(serde_json::json!({
            "public_id": job.public_id,
            "created": created,
            "failed": failed,
            "skipped": skipped,
            "total": total,
        }))
}

fn failed_event(job: &ImportJob, message: &str) -> PlatformEvent {
    PlatformEvent::new(event_types::IMPORT_FAILED)
        .with_tenant(job.tenant_id)
        .with_source(entity_types::IMPORT_JOB, job.id)
        .with_actor(job.initiated_by)
        .with_payload(serde_json::json!({
            "public_id": job.public_id,
            "error": message,
        }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use juris_db::models::status::ImportJobStatus;
    use uuid::Uuid;

    fn job() -> ImportJob {
        ImportJob {
            id: 42,
            public_id: Uuid::now_v7(),
            tenant_id: 7,
            initiated_by: 99,
            file_path: "/tmp/juris/imports/test.csv".to_string(),
            file_sha256: "0".repeat(64),
            file_size_bytes: 1024,
            status_id: ImportJobStatus::Running.id(),
            total_rows: Some(8),
            allowed_count: Some(6),
            skipped_count: Some(2),
            truncation_index: Some(6),
            processed_rows: 0,
            created_count: 0,
            failed_count: 0,
            error_message: None,
            claimed_by: Some("import-worker-0".to_string()),
            claimed_at: Some(Utc::now()),
            started_at: Some(Utc::now()),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn completed_event_addresses_the_initiator() {
        let event = completed_event(&job(), 5, 1, 2, 8);

        assert_eq!(event.event_type, event_types::IMPORT_COMPLETED);
        assert_eq!(event.tenant_id, Some(7));
        assert_eq!(event.actor_user_id, Some(99));
        assert_eq!(event.source_entity_type.as_deref(), Some("import_job"));
        assert_eq!(event.source_entity_id, Some(42));
        assert_eq!(event.payload["created"], 5);
        assert_eq!(event.payload["failed"], 1);
        assert_eq!(event.payload["skipped"], 2);
        assert_eq!(event.payload["total"], 8);
    }

    #[test]
    fn failed_event_carries_the_error() {
        let event = failed_event(&job(), "worker stopped reporting progress");

        assert_eq!(event.event_type, event_types::IMPORT_FAILED);
        assert_eq!(event.tenant_id, Some(7));
        assert_eq!(event.actor_user_id, Some(99));
        assert_eq!(
            event.payload["error"],
            "worker stopped reporting progress"
        );
    }
}

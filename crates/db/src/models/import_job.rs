//! Bulk import job entity models and DTOs.

use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::status::StatusId;

/// A row from the `import_jobs` table.
///
/// A job is created `Pending` when an upload is accepted and then driven
/// through the lifecycle by a worker. Admission figures (`total_rows`,
/// `allowed_count`, `skipped_count`, `truncation_index`) are filled in when
/// the worker re-analyzes the staged file and reserves quota slots.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportJob {
    pub id: DbId,
    /// Stable identifier exposed outside the database.
    pub public_id: Uuid,
    pub tenant_id: DbId,
    pub initiated_by: DbId,
    /// Location of the staged upload on shared storage.
    pub file_path: String,
    pub file_sha256: String,
    pub file_size_bytes: i64,
    pub status_id: StatusId,
    pub total_rows: Option<i64>,
    pub allowed_count: Option<i64>,
    pub skipped_count: Option<i64>,
    pub truncation_index: Option<i64>,
    pub processed_rows: i64,
    pub created_count: i64,
    pub failed_count: i64,
    pub error_message: Option<String>,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for enqueueing a new import job.
///
/// `public_id` is supplied by the caller so the staged file can be named
/// after it before the row exists.
#[derive(Debug, Clone)]
pub struct CreateImportJob {
    pub public_id: Uuid,
    pub tenant_id: DbId,
    pub initiated_by: DbId,
    pub file_path: String,
    pub file_sha256: String,
    pub file_size_bytes: i64,
}

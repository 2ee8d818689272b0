//! Per-row import failure entity model.

use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `import_row_failures` table.
///
/// One row per spreadsheet row that failed during an import run, in file
/// order. `reason` holds the stable taxonomy string (see
/// `juris_core::outcome::FailureReason`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportRowFailure {
    pub id: DbId,
    pub job_id: DbId,
    /// 1-based ordinal of the data row within the uploaded file.
    pub row_index: i64,
    pub reason: String,
    pub detail: Option<String>,
    pub created_at: Timestamp,
}

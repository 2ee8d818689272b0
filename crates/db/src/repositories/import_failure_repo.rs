//! Repository for the `import_row_failures` table.

use juris_core::outcome::RowFailure;
use juris_core::types::DbId;
use sqlx::PgPool;

use crate::models::import_row_failure::ImportRowFailure;

/// Column list for `import_row_failures` queries.
const COLUMNS: &str = "id, job_id, row_index, reason, detail, created_at";

/// Provides insert and query operations for per-row import failures.
pub struct ImportFailureRepo;

impl ImportFailureRepo {
    /// Batch insert the failures recorded by one import run.
    ///
    /// Uses a single INSERT with multiple value rows for efficiency.
    pub async fn batch_insert(
        pool: &PgPool,
        job_id: DbId,
        failures: &[RowFailure],
    ) -> Result<u64, sqlx::Error> {
        if failures.is_empty() {
            return Ok(0);
        }

        // Build a multi-row INSERT statement.
        let mut query = String::from("INSERT INTO import_row_failures (job_id, row_index, reason, detail) VALUES ");
        let mut param_idx = 1u32;
        let mut first = true;

        for _ in failures {
            if !first {
                query.push_str(", ");
            }
            first = false;
            query.push('(');
            for i in 0..4 {
                if i > 0 {
                    query.push_str(", ");
                }
                query.push_str(&format!("${param_idx}"));
                param_idx += 1;
            }
            query.push(')');
        }

        let mut q = sqlx::query(&query);
        for failure in failures {
            q = q
                .bind(job_id)
                .bind(failure.row_index)
                .bind(failure.reason.as_str())
                .bind(&failure.detail);
        }

        let result = q.execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// List a job's failures in file order.
    pub async fn list_for_job(
        pool: &PgPool,
        job_id: DbId,
    ) -> Result<Vec<ImportRowFailure>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM import_row_failures \
             WHERE job_id = $1 \
             ORDER BY row_index ASC"
        );
        sqlx::query_as::<_, ImportRowFailure>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }
}

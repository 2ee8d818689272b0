//! Repository for the `cases` and `tenant_case_sequences` tables.

use juris_core::types::DbId;
use sqlx::PgPool;

use crate::models::case::{Case, CreateCase};
use crate::models::status::CaseStatus;

/// Column list for `cases` queries.
const COLUMNS: &str = "\
    id, tenant_id, case_number, title, client_id, lawyer_id, classification_id, \
    filing_number, notes, status_id, created_by, created_at, updated_at";

/// Provides write operations for cases and case number sequences.
pub struct CaseRepo;

impl CaseRepo {
    /// Atomically allocate the next case number sequence value for a
    /// tenant and year.
    ///
    /// Uses an upsert so the first allocation of a (tenant, year) pair
    /// creates the sequence row; concurrent callers serialize on the row
    /// lock and each receive a distinct value. An in-process counter would
    /// not survive restarts or multiple workers.
    pub async fn next_case_sequence(
        pool: &PgPool,
        tenant_id: DbId,
        year: i32,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO tenant_case_sequences (tenant_id, year, next_value) \
             VALUES ($1, $2, 1) \
             ON CONFLICT (tenant_id, year) \
             DO UPDATE SET next_value = tenant_case_sequences.next_value + 1 \
             RETURNING next_value",
        )
        .bind(tenant_id)
        .bind(year)
        .fetch_one(pool)
        .await
    }

    /// Insert a new case in `Active` status, returning the full row.
    ///
    /// Uniqueness of `case_number` and `filing_number` within the tenant is
    /// enforced by named constraints; violations surface as
    /// `sqlx::Error::Database` with code 23505 for the caller to classify.
    pub async fn insert(pool: &PgPool, input: &CreateCase) -> Result<Case, sqlx::Error> {
        let query = format!(
            "INSERT INTO cases \
                (tenant_id, case_number, title, client_id, lawyer_id, classification_id, \
                 filing_number, notes, status_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Case>(&query)
            .bind(input.tenant_id)
            .bind(&input.case_number)
            .bind(&input.title)
            .bind(input.client_id)
            .bind(input.lawyer_id)
            .bind(input.classification_id)
            .bind(&input.filing_number)
            .bind(&input.notes)
            .bind(CaseStatus::Active.id())
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }
}

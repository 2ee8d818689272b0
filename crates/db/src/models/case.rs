//! Legal case entity models and DTOs.

use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `cases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Case {
    pub id: DbId,
    pub tenant_id: DbId,
    /// Generated, unique per tenant (e.g. `CAS-2026-00042`).
    pub case_number: String,
    pub title: String,
    pub client_id: DbId,
    pub lawyer_id: DbId,
    pub classification_id: DbId,
    /// Court filing number, unique per tenant when present.
    pub filing_number: Option<String>,
    pub notes: Option<String>,
    pub status_id: StatusId,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a case with all references already resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCase {
    pub tenant_id: DbId,
    pub case_number: String,
    pub title: String,
    pub client_id: DbId,
    pub lawyer_id: DbId,
    pub classification_id: DbId,
    pub filing_number: Option<String>,
    pub notes: Option<String>,
    pub created_by: DbId,
}

//! Case classification entity model.

use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `classifications` table.
///
/// Classifications are the per-tenant practice-area taxonomy (e.g. `CIV`,
/// `CRIM`, `LAB`) that every case must carry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Classification {
    pub id: DbId,
    pub tenant_id: DbId,
    pub code: String,
    pub label: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

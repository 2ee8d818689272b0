//! User entity model.

use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
///
/// Lawyers are users with `is_lawyer = true`; only active lawyers are
/// assignable to cases.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub tenant_id: DbId,
    pub display_name: String,
    pub email: String,
    pub is_lawyer: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

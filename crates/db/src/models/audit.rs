//! Audit trail entity models and DTOs.
//!
//! Audit records are append-only and have no `updated_at` field (immutable
//! records). Rendering the trail for display is handled elsewhere; this
//! layer only stores it.

use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A single audit trail entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub tenant_id: DbId,
    /// Acting user, or `None` for system-initiated actions.
    pub actor_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for inserting a new audit trail entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub tenant_id: DbId,
    pub actor_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: String,
    pub entity_id: Option<DbId>,
    pub details: serde_json::Value,
}

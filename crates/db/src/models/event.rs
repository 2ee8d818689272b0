//! Platform event entity model.

use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table.
///
/// Events carry their dot-separated type name (e.g. `"import.completed"`)
/// inline rather than through a lookup table; the set of types is small and
/// owned by code.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type: String,
    pub tenant_id: Option<DbId>,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

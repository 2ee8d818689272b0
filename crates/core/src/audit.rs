//! Audit trail constants.
//!
//! This module lives in `core` (zero internal deps) so the import engine,
//! repositories, and any future CLI tooling agree on the same action and
//! entity vocabulary.

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for audit trail entries.
pub mod action_types {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const IMPORT_START: &str = "import_start";
    pub const IMPORT_COMPLETE: &str = "import_complete";
    pub const IMPORT_FAIL: &str = "import_fail";
}

// ---------------------------------------------------------------------------
// Entity type constants
// ---------------------------------------------------------------------------

/// Known entity types referenced by audit trail entries.
pub mod entity_types {
    pub const CASE: &str = "case";
    pub const CLIENT: &str = "client";
    pub const IMPORT_JOB: &str = "import_job";
}

//! Import pipeline error taxonomy.
//!
//! Only operation-aborting conditions live here. A row that fails to
//! import is not an error; it is recorded as a
//! [`RowFailure`](juris_core::outcome::RowFailure) and the run continues.

use juris_core::error::CoreError;
use juris_core::spreadsheet::FormatError;

/// An error that aborts an import operation.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The uploaded file cannot be reconciled with the import schema.
    /// Always raised before any quota is consumed or row is written.
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Return the constraint name when `err` is a PostgreSQL unique violation
/// (error code 23505), `None` for anything else.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            db_err.constraint()
        }
        _ => None,
    }
}

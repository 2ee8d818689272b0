//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Create DTOs for inserts performed by the import engine

pub mod audit;
pub mod case;
pub mod classification;
pub mod client;
pub mod event;
pub mod import_job;
pub mod import_row_failure;
pub mod notification;
pub mod quota;
pub mod status;
pub mod user;

//! Bulk case import engine.
//!
//! The pipeline that turns an uploaded spreadsheet into cases:
//!
//! - [`service::ImportService`] — upload-facing facade: analysis preview,
//!   job launch, status reads, template download.
//! - [`quota::QuotaGate`] — admission control over tenant case quotas.
//! - [`importer::BulkImporter`] — the row-by-row import run, built on
//!   injected collaborator traits.
//! - [`collaborators`] — Postgres-backed implementations of those traits.
//! - [`scheduler::ImportScheduler`] — bounded worker pool that claims
//!   persisted jobs and drives them to completion.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod importer;
pub mod quota;
pub mod scheduler;
pub mod service;

pub use config::ImportConfig;
pub use error::ImportError;
pub use importer::BulkImporter;
pub use quota::QuotaGate;
pub use scheduler::ImportScheduler;
pub use service::ImportService;

//! Data access repositories.
//!
//! Each repository is a zero-sized struct providing async CRUD methods that
//! accept `&PgPool` as the first argument. Queries use a `COLUMNS` constant
//! per table so `SELECT` lists stay in sync with the model structs.

pub mod audit_repo;
pub mod case_repo;
pub mod classification_repo;
pub mod client_repo;
pub mod event_repo;
pub mod import_failure_repo;
pub mod import_job_repo;
pub mod notification_repo;
pub mod quota_repo;
pub mod user_repo;

pub use audit_repo::AuditRepo;
pub use case_repo::CaseRepo;
pub use classification_repo::ClassificationRepo;
pub use client_repo::ClientRepo;
pub use event_repo::EventRepo;
pub use import_failure_repo::ImportFailureRepo;
pub use import_job_repo::ImportJobRepo;
pub use notification_repo::NotificationRepo;
pub use quota_repo::QuotaRepo;
pub use user_repo::UserRepo;

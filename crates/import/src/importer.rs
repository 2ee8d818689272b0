//! Row-by-row bulk import run.
//!
//! [`BulkImporter`] executes one admitted job: rows are processed strictly
//! in file order, one at a time, so a bad row cannot disturb its
//! neighbors and a crash leaves every already-created case in place. All
//! side effects go through collaborator traits injected at construction,
//! which keeps the run logic testable without a database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use juris_core::error::CoreError;
use juris_core::outcome::{FailureReason, ImportOutcome, RowFailure};
use juris_core::spreadsheet::{parse_row, ColumnMap, Sheet};
use juris_core::types::DbId;
use juris_db::models::case::CreateCase;

use crate::error::ImportError;

/// Run counters are flushed to the progress sink every this many rows.
pub const PROGRESS_INTERVAL: i64 = 25;

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Resolves spreadsheet references to entity ids, scoped to a tenant.
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    async fn resolve_client(
        &self,
        tenant_id: DbId,
        reference: &str,
    ) -> Result<Option<DbId>, ImportError>;

    async fn resolve_lawyer(
        &self,
        tenant_id: DbId,
        reference: &str,
    ) -> Result<Option<DbId>, ImportError>;

    async fn resolve_classification(
        &self,
        tenant_id: DbId,
        code: &str,
    ) -> Result<Option<DbId>, ImportError>;
}

/// Result of attempting to persist one case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(DbId),
    /// The generated case number is already taken within the tenant.
    CaseNumberConflict,
    /// The row's filing number is already taken within the tenant.
    FilingNumberConflict,
}

/// Allocates case numbers and persists cases.
#[async_trait]
pub trait CaseWriter: Send + Sync {
    /// Allocate the next case number for a tenant and year. Allocations
    /// must be unique across concurrent runs and process restarts.
    async fn next_case_number(&self, tenant_id: DbId, year: i32) -> Result<String, ImportError>;

    /// Persist one case. Uniqueness conflicts are values, not errors, so
    /// the run can classify and continue.
    async fn insert_case(&self, input: &CreateCase) -> Result<WriteOutcome, ImportError>;
}

/// Converts reserved quota slots into used ones as cases are created.
#[async_trait]
pub trait QuotaLedger: Send + Sync {
    async fn commit_one(&self, tenant_id: DbId) -> Result<(), ImportError>;
}

/// Records audit events for created cases.
///
/// Implementations are best-effort: the signature has no error channel, so
/// a failed audit write can never undo or abort the case it describes.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn case_created(
        &self,
        tenant_id: DbId,
        actor_id: DbId,
        case_id: DbId,
        case_number: &str,
    );
}

/// Receives refreshed run counters. Best-effort.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, processed: i64, created: i64, failed: i64);
}

/// Progress sink for callers that do not track progress.
pub struct NoProgress;

#[async_trait]
impl ProgressSink for NoProgress {
    async fn report(&self, _processed: i64, _created: i64, _failed: i64) {}
}

// ---------------------------------------------------------------------------
// BulkImporter
// ---------------------------------------------------------------------------

/// How one row was dispositioned.
enum RowDisposition {
    Created,
    Failed {
        reason: FailureReason,
        detail: Option<String>,
    },
}

impl RowDisposition {
    fn failed(reason: FailureReason, detail: Option<String>) -> Self {
        RowDisposition::Failed { reason, detail }
    }
}

/// Executes one import run over an already-analyzed sheet.
pub struct BulkImporter {
    resolver: Arc<dyn ReferenceResolver>,
    writer: Arc<dyn CaseWriter>,
    quota: Arc<dyn QuotaLedger>,
    audit: Arc<dyn AuditSink>,
    progress: Arc<dyn ProgressSink>,
}

impl BulkImporter {
    pub fn new(
        resolver: Arc<dyn ReferenceResolver>,
        writer: Arc<dyn CaseWriter>,
        quota: Arc<dyn QuotaLedger>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            resolver,
            writer,
            quota,
            audit,
            progress: Arc::new(NoProgress),
        }
    }

    /// Attach a progress sink.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Run the import.
    ///
    /// Attempts rows in file order until `truncation_index` rows have been
    /// attempted or the sheet ends. A row that fails consumes its slot:
    /// admission granted a number of attempts, and re-extending the window
    /// past failures could exceed what was reserved.
    ///
    /// Returns `Err` only for infrastructure faults; those abort the run
    /// immediately, leaving already-created cases in place. Final counters
    /// are flushed to the progress sink on both paths.
    pub async fn run(
        &self,
        tenant_id: DbId,
        initiated_by: DbId,
        sheet: &Sheet,
        truncation_index: i64,
    ) -> Result<ImportOutcome, ImportError> {
        let year = Utc::now().year();
        let limit = truncation_index.max(0) as usize;
        let mut outcome = ImportOutcome::default();
        let mut processed: i64 = 0;

        for (offset, cells) in sheet.rows.iter().take(limit).enumerate() {
            let row_index = (offset + 1) as i64;
            let disposition = match self
                .import_row(tenant_id, initiated_by, &sheet.columns, cells, year)
                .await
            {
                Ok(disposition) => disposition,
                Err(err) => {
                    self.progress
                        .report(processed, outcome.created_count, outcome.failed_count())
                        .await;
                    return Err(err);
                }
            };

            processed += 1;
            match disposition {
                RowDisposition::Created => outcome.created_count += 1,
                RowDisposition::Failed { reason, detail } => {
                    tracing::debug!(row_index, reason = %reason, "Import row failed");
                    outcome.failures.push(RowFailure {
                        row_index,
                        reason,
                        detail,
                    });
                }
            }

            if processed % PROGRESS_INTERVAL == 0 {
                self.progress
                    .report(processed, outcome.created_count, outcome.failed_count())
                    .await;
            }
        }

        self.progress
            .report(processed, outcome.created_count, outcome.failed_count())
            .await;
        Ok(outcome)
    }

    /// Process a single row: parse, resolve references, allocate a case
    /// number, persist, commit the quota slot, and record the audit event.
    async fn import_row(
        &self,
        tenant_id: DbId,
        initiated_by: DbId,
        columns: &ColumnMap,
        cells: &[String],
        year: i32,
    ) -> Result<RowDisposition, ImportError> {
        let draft = match parse_row(columns, cells) {
            Ok(draft) => draft,
            Err(CoreError::Validation(message)) => {
                return Ok(RowDisposition::failed(
                    FailureReason::Parse,
                    Some(message),
                ))
            }
            Err(err) => return Err(err.into()),
        };

        let client_id = match self
            .resolver
            .resolve_client(tenant_id, &draft.client_ref)
            .await?
        {
            Some(id) => id,
            None => {
                return Ok(RowDisposition::failed(
                    FailureReason::UnknownClient,
                    Some(draft.client_ref),
                ))
            }
        };

        let lawyer_id = match self
            .resolver
            .resolve_lawyer(tenant_id, &draft.lawyer_ref)
            .await?
        {
            Some(id) => id,
            None => {
                return Ok(RowDisposition::failed(
                    FailureReason::UnknownLawyer,
                    Some(draft.lawyer_ref),
                ))
            }
        };

        let classification_id = match self
            .resolver
            .resolve_classification(tenant_id, &draft.classification_ref)
            .await?
        {
            Some(id) => id,
            None => {
                return Ok(RowDisposition::failed(
                    FailureReason::UnknownClassification,
                    Some(draft.classification_ref),
                ))
            }
        };

        let case_number = self.writer.next_case_number(tenant_id, year).await?;
        let mut input = CreateCase {
            tenant_id,
            case_number,
            title: draft.title,
            client_id,
            lawyer_id,
            classification_id,
            filing_number: draft.filing_number,
            notes: draft.notes,
            created_by: initiated_by,
        };

        let created_id = match self.writer.insert_case(&input).await? {
            WriteOutcome::Created(id) => id,
            WriteOutcome::FilingNumberConflict => {
                return Ok(RowDisposition::failed(
                    FailureReason::DuplicateFilingNumber,
                    input.filing_number,
                ))
            }
            WriteOutcome::CaseNumberConflict => {
                // One retry with a freshly allocated number; a second
                // collision means something beyond allocation is wrong.
                input.case_number = self.writer.next_case_number(tenant_id, year).await?;
                match self.writer.insert_case(&input).await? {
                    WriteOutcome::Created(id) => id,
                    WriteOutcome::CaseNumberConflict => {
                        return Ok(RowDisposition::failed(
                            FailureReason::DuplicateCaseNumber,
                            Some(input.case_number),
                        ))
                    }
                    WriteOutcome::FilingNumberConflict => {
                        return Ok(RowDisposition::failed(
                            FailureReason::DuplicateFilingNumber,
                            input.filing_number,
                        ))
                    }
                }
            }
        };

        self.quota.commit_one(tenant_id).await?;
        self.audit
            .case_created(tenant_id, initiated_by, created_id, &input.case_number)
            .await;

        Ok(RowDisposition::Created)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

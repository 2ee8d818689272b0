//! Per-row failure taxonomy and the aggregate result of an import run.

use serde::{Deserialize, Serialize};

// ── Failure taxonomy ─────────────────────────────────────────────────

/// Why one spreadsheet row failed to become a case.
///
/// Every variant is row-isolated: it is recorded against the failing row
/// and the run continues with the next one. Infrastructure faults are not
/// represented here; those abort the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The row could not be parsed into a structurally valid draft.
    Parse,
    /// The client reference did not resolve within the tenant.
    UnknownClient,
    /// The lawyer reference did not resolve within the tenant.
    UnknownLawyer,
    /// The classification code did not resolve within the tenant.
    UnknownClassification,
    /// The generated case number collided even after a retry.
    DuplicateCaseNumber,
    /// The filing number is already taken within the tenant.
    DuplicateFilingNumber,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Parse => "parse",
            FailureReason::UnknownClient => "unknown_client",
            FailureReason::UnknownLawyer => "unknown_lawyer",
            FailureReason::UnknownClassification => "unknown_classification",
            FailureReason::DuplicateCaseNumber => "duplicate_case_number",
            FailureReason::DuplicateFilingNumber => "duplicate_filing_number",
        }
    }

    /// Coarse grouping used in summaries: `parse`, `reference`, or
    /// `conflict`.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::Parse => "parse",
            FailureReason::UnknownClient
            | FailureReason::UnknownLawyer
            | FailureReason::UnknownClassification => "reference",
            FailureReason::DuplicateCaseNumber | FailureReason::DuplicateFilingNumber => "conflict",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Row and run outcomes ─────────────────────────────────────────────

/// One failed row: its 1-based position in the file plus the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based ordinal of the data row within the file (header excluded).
    pub row_index: i64,
    pub reason: FailureReason,
    /// Human-readable detail, e.g. the unresolved reference value.
    pub detail: Option<String>,
}

/// Aggregate result of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Number of cases actually created.
    pub created_count: i64,
    /// Every failed row, in file order.
    pub failures: Vec<RowFailure>,
}

impl ImportOutcome {
    pub fn failed_count(&self) -> i64 {
        self.failures.len() as i64
    }

    /// Rows attempted by the run: creations plus recorded failures.
    pub fn attempted_count(&self) -> i64 {
        self.created_count + self.failed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_kinds_group_the_taxonomy() {
        assert_eq!(FailureReason::Parse.kind(), "parse");
        assert_eq!(FailureReason::UnknownClient.kind(), "reference");
        assert_eq!(FailureReason::UnknownLawyer.kind(), "reference");
        assert_eq!(FailureReason::UnknownClassification.kind(), "reference");
        assert_eq!(FailureReason::DuplicateCaseNumber.kind(), "conflict");
        assert_eq!(FailureReason::DuplicateFilingNumber.kind(), "conflict");
    }

    #[test]
    fn reason_serializes_as_snake_case() {
        let json = serde_json::to_string(&FailureReason::DuplicateFilingNumber).unwrap();
        assert_eq!(json, "\"duplicate_filing_number\"");
    }

    #[test]
    fn outcome_counts_balance() {
        let outcome = ImportOutcome {
            created_count: 3,
            failures: vec![
                RowFailure {
                    row_index: 2,
                    reason: FailureReason::UnknownClient,
                    detail: Some("Nonexistent Co".to_string()),
                },
                RowFailure {
                    row_index: 4,
                    reason: FailureReason::Parse,
                    detail: None,
                },
            ],
        };
        assert_eq!(outcome.failed_count(), 2);
        assert_eq!(outcome.attempted_count(), 5);
    }
}

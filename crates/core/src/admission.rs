//! Quota admission math for bulk case imports.
//!
//! Admission is computed once, before any row-level work starts, so the
//! uploader gets accurate skip counts immediately and the truncation policy
//! stays first-N-in-file-order. The functions here are pure; the atomic
//! slot reservation that makes the decision binding under concurrent
//! imports lives in the database layer.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Sentinel `case_limit` value meaning the tenant's plan has no cap.
pub const UNLIMITED_CASE_QUOTA: i64 = -1;

/// A tenant's quota state, read fresh per import request.
///
/// `cases_in_use` includes both committed usage and outstanding
/// reservations held by in-flight imports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    pub tenant_id: DbId,
    /// Plan cap on total cases; [`UNLIMITED_CASE_QUOTA`] means no cap.
    pub case_limit: i64,
    pub cases_in_use: i64,
}

impl QuotaSnapshot {
    /// Returns `true` if the tenant's plan has no case cap.
    pub fn is_unlimited(&self) -> bool {
        self.case_limit == UNLIMITED_CASE_QUOTA
    }

    /// Remaining headroom under the cap, clamped at zero.
    ///
    /// `None` for unlimited plans.
    pub fn remaining(&self) -> Option<i64> {
        if self.is_unlimited() {
            None
        } else {
            Some((self.case_limit - self.cases_in_use).max(0))
        }
    }
}

/// The outcome of admission control for one import request.
///
/// Invariant: `total_rows == allowed_count + skipped_count`, and
/// `truncation_index == allowed_count` (rows past it are never attempted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionDecision {
    pub total_rows: i64,
    pub allowed_count: i64,
    pub skipped_count: i64,
    /// Ordinal (in file order) of the last row eligible for import.
    pub truncation_index: i64,
}

impl AdmissionDecision {
    /// Returns `true` if every requested row was admitted.
    pub fn is_full(&self) -> bool {
        self.skipped_count == 0
    }
}

/// Decide how many of `requested` rows may be imported under `snapshot`.
///
/// Unlimited plans admit everything; otherwise the first
/// `min(requested, remaining)` rows in file order are admitted and the
/// rest are skipped.
pub fn decide(snapshot: &QuotaSnapshot, requested: i64) -> AdmissionDecision {
    let allowed = match snapshot.remaining() {
        None => requested,
        Some(remaining) => requested.min(remaining),
    };
    AdmissionDecision {
        total_rows: requested,
        allowed_count: allowed,
        skipped_count: requested - allowed,
        truncation_index: allowed,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(case_limit: i64, cases_in_use: i64) -> QuotaSnapshot {
        QuotaSnapshot {
            tenant_id: 1,
            case_limit,
            cases_in_use,
        }
    }

    #[test]
    fn unlimited_admits_everything() {
        let decision = decide(&snapshot(UNLIMITED_CASE_QUOTA, 9_999), 500);
        assert_eq!(decision.allowed_count, 500);
        assert_eq!(decision.skipped_count, 0);
        assert_eq!(decision.truncation_index, 500);
        assert!(decision.is_full());
    }

    #[test]
    fn near_limit_truncates_to_remaining() {
        // Plan limit 50, 48 already in use, 10 rows uploaded.
        let decision = decide(&snapshot(50, 48), 10);
        assert_eq!(decision.allowed_count, 2);
        assert_eq!(decision.skipped_count, 8);
        assert_eq!(decision.truncation_index, 2);
        assert!(!decision.is_full());
    }

    #[test]
    fn under_limit_admits_everything() {
        let decision = decide(&snapshot(100, 10), 30);
        assert_eq!(decision.allowed_count, 30);
        assert_eq!(decision.skipped_count, 0);
    }

    #[test]
    fn usage_over_limit_admits_nothing() {
        let decision = decide(&snapshot(50, 53), 10);
        assert_eq!(decision.allowed_count, 0);
        assert_eq!(decision.skipped_count, 10);
        assert_eq!(decision.truncation_index, 0);
    }

    #[test]
    fn exactly_at_limit_admits_nothing() {
        let decision = decide(&snapshot(50, 50), 5);
        assert_eq!(decision.allowed_count, 0);
        assert_eq!(decision.skipped_count, 5);
    }

    #[test]
    fn zero_rows_is_a_noop_decision() {
        let decision = decide(&snapshot(50, 10), 0);
        assert_eq!(decision.total_rows, 0);
        assert_eq!(decision.allowed_count, 0);
        assert_eq!(decision.skipped_count, 0);
    }

    #[test]
    fn totals_always_balance() {
        for (limit, in_use, requested) in [
            (UNLIMITED_CASE_QUOTA, 0, 500),
            (50, 48, 10),
            (50, 53, 10),
            (100, 0, 100),
            (1, 0, 1),
            (0, 0, 7),
        ] {
            let decision = decide(&snapshot(limit, in_use), requested);
            assert_eq!(
                decision.total_rows,
                decision.allowed_count + decision.skipped_count,
                "limit={limit} in_use={in_use} requested={requested}"
            );
            assert_eq!(decision.truncation_index, decision.allowed_count);
        }
    }

    #[test]
    fn remaining_clamps_at_zero() {
        assert_eq!(snapshot(50, 53).remaining(), Some(0));
        assert_eq!(snapshot(50, 48).remaining(), Some(2));
        assert_eq!(snapshot(UNLIMITED_CASE_QUOTA, 7).remaining(), None);
    }
}

//! Tenant quota entity model.

use juris_core::admission::QuotaSnapshot;
use juris_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tenant_quotas` table (one per tenant).
///
/// `cases_reserved` counts slots promised to in-flight imports but not yet
/// turned into cases; admission must treat them as spent or two concurrent
/// imports could both fill the last slot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TenantQuota {
    pub tenant_id: DbId,
    /// Maximum number of cases for the tenant's plan; `-1` means unlimited.
    pub case_limit: i64,
    pub cases_used: i64,
    pub cases_reserved: i64,
    pub updated_at: Timestamp,
}

impl TenantQuota {
    /// View this row as the pure admission-math snapshot.
    pub fn snapshot(&self) -> QuotaSnapshot {
        QuotaSnapshot {
            tenant_id: self.tenant_id,
            case_limit: self.case_limit,
            cases_in_use: self.cases_used + self.cases_reserved,
        }
    }
}

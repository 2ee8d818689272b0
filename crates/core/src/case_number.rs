//! Case numbering convention.
//!
//! Case numbers are unique per tenant and allocated from a per-tenant,
//! per-year sequence. This module only formats; allocation lives with the
//! sequence storage so concurrent imports never mint the same value.

/// Prefix shared by every generated case number.
pub const CASE_NUMBER_PREFIX: &str = "CAS";

/// Format a case number from its year and per-tenant sequence value.
///
/// Convention: `CAS-{year}-{sequence}` with the sequence zero-padded to
/// five digits. Sequences past 99999 simply widen.
///
/// # Examples
///
/// ```
/// use juris_core::case_number::format_case_number;
///
/// assert_eq!(format_case_number(2026, 42), "CAS-2026-00042");
/// assert_eq!(format_case_number(2026, 123456), "CAS-2026-123456");
/// ```
pub fn format_case_number(year: i32, sequence: i64) -> String {
    format!("{CASE_NUMBER_PREFIX}-{year}-{sequence:05}")
}

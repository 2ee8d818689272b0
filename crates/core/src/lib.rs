//! Pure domain logic for the juris platform.
//!
//! This crate has no database, async, or I/O dependencies. It provides:
//!
//! - Shared type aliases ([`types::DbId`], [`types::Timestamp`]).
//! - The core error taxonomy ([`error::CoreError`]).
//! - Quota admission math ([`admission`]).
//! - Spreadsheet schema, analysis, and row parsing ([`spreadsheet`]).
//! - The per-row failure taxonomy and run outcome ([`outcome`]).
//! - Case number formatting ([`case_number`]).
//! - Import template rendering ([`template`]).
//! - Audit action constants ([`audit`]).
//! - SHA-256 digests for upload fingerprints ([`hashing`]).

pub mod admission;
pub mod audit;
pub mod case_number;
pub mod error;
pub mod hashing;
pub mod outcome;
pub mod spreadsheet;
pub mod template;
pub mod types;

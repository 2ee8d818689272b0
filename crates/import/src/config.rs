//! Import engine configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the import engine, loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Number of concurrent import workers (default: `2`).
    pub worker_count: usize,
    /// How often idle workers poll for pending jobs (default: `1000` ms).
    pub poll_interval: Duration,
    /// Seconds without progress before an in-flight job is considered
    /// stalled and failed (default: `900`).
    pub stall_timeout_secs: i64,
    /// Directory where accepted uploads are staged (default:
    /// `/tmp/juris/imports`).
    pub staging_dir: PathBuf,
}

impl ImportConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default             |
    /// |-----------------------------|---------------------|
    /// | `IMPORT_WORKER_COUNT`       | `2`                 |
    /// | `IMPORT_POLL_INTERVAL_MS`   | `1000`              |
    /// | `IMPORT_STALL_TIMEOUT_SECS` | `900`               |
    /// | `IMPORT_STAGING_DIR`        | `/tmp/juris/imports`|
    pub fn from_env() -> Self {
        let worker_count: usize = std::env::var("IMPORT_WORKER_COUNT")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("IMPORT_WORKER_COUNT must be a valid usize");

        let poll_interval_ms: u64 = std::env::var("IMPORT_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("IMPORT_POLL_INTERVAL_MS must be a valid u64");

        let stall_timeout_secs: i64 = std::env::var("IMPORT_STALL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("IMPORT_STALL_TIMEOUT_SECS must be a valid i64");

        let staging_dir =
            std::env::var("IMPORT_STAGING_DIR").unwrap_or_else(|_| "/tmp/juris/imports".into());

        Self {
            worker_count,
            poll_interval: Duration::from_millis(poll_interval_ms),
            stall_timeout_secs,
            staging_dir: PathBuf::from(staging_dir),
        }
    }
}

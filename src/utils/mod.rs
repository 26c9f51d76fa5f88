//! Utility modules
//!
//! Provides logging setup, the in-memory icon cache and the periodic app
//! rescan job.

pub mod icon_cache;
pub mod logging;
pub mod update_job;

pub use icon_cache::IconCache;
pub use logging::init_logging;
pub use update_job::AppUpdateJob;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

//! Persistent app record
//!
//! One row of the `apps` table. Column names follow the on-disk schema,
//! field names follow Rust conventions.

use serde::{Deserialize, Serialize};

/// Category assigned when no heuristic matches
pub const DEFAULT_CATEGORY: &str = "Apps";

/// Per-application metadata and usage counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Unique package identifier (primary key)
    pub package_id: String,
    /// Label shown on the app card
    pub display_name: String,
    /// Launcher entry point activity, if known
    pub entry_point_class: Option<String>,
    /// Category tag (Games, Video, Music, Browser, Settings, Apps)
    pub category: String,
    /// Pinned to the favorites row
    pub is_favorite: bool,
    /// Preinstalled system package
    pub is_system_app: bool,
    /// First install time, milliseconds since the Unix epoch
    pub install_timestamp: i64,
    /// Last update time, milliseconds since the Unix epoch
    pub update_timestamp: i64,
    /// Last launch time, milliseconds since the Unix epoch (0 if never launched)
    pub last_used_timestamp: i64,
    /// Number of launches
    pub usage_count: u32,
    /// Human-readable version
    pub version_name: Option<String>,
    /// Monotonic version number
    pub version_code: i64,
}

impl AppRecord {
    /// Create a record with default metadata and zeroed usage counters
    pub fn new(package_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            display_name: display_name.into(),
            entry_point_class: None,
            category: DEFAULT_CATEGORY.to_string(),
            is_favorite: false,
            is_system_app: false,
            install_timestamp: 0,
            update_timestamp: 0,
            last_used_timestamp: 0,
            usage_count: 0,
            version_name: None,
            version_code: 0,
        }
    }

    /// Whether the app has ever been launched from the launcher
    pub fn has_been_used(&self) -> bool {
        self.last_used_timestamp > 0
    }
}

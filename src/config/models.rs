//! Configuration data models
//!
//! `LauncherConfig` holds deployment settings that are not user-facing:
//! file names inside the data directory, the refresh write policy, and
//! scheduler and cache sizing. User-facing settings live in the preference
//! store instead.

use crate::store::DEFAULT_RECENT_LIMIT;
use crate::utils::icon_cache::DEFAULT_ICON_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a rescan of installed apps is written to the app store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Overwrite scan metadata but keep favorite flag, last-used time and
    /// usage count of apps already in the store
    #[default]
    Merge,
    /// Replace whole rows; favorites and usage of rescanned apps are reset
    Replace,
}

/// Top-level launcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// App store file name, relative to the data directory
    pub database_file: PathBuf,
    /// Preference store file name, relative to the data directory
    pub preferences_file: PathBuf,
    /// Installed-package manifest read by the binary
    pub manifest_file: PathBuf,
    /// Write policy for `refresh_installed_apps`
    pub refresh_policy: RefreshPolicy,
    /// Maximum number of recent apps shown
    pub recent_limit: usize,
    /// Hours between background rescans (0 disables the job)
    pub update_interval_hours: u64,
    /// Packages kept in the in-memory icon cache
    pub icon_cache_capacity: usize,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            database_file: PathBuf::from("tv_launcher.db"),
            preferences_file: PathBuf::from("settings.json"),
            manifest_file: PathBuf::from("packages.json"),
            refresh_policy: RefreshPolicy::default(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            update_interval_hours: 24,
            icon_cache_capacity: DEFAULT_ICON_CACHE_CAPACITY,
        }
    }
}

impl LauncherConfig {
    /// Absolute app store path
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database_file)
    }

    /// Absolute preference store path
    pub fn preferences_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.preferences_file)
    }

    /// Absolute package manifest path
    pub fn manifest_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.manifest_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LauncherConfig::default();
        assert_eq!(config.recent_limit, 10);
        assert_eq!(config.update_interval_hours, 24);
        assert_eq!(config.refresh_policy, RefreshPolicy::Merge);
        assert_eq!(
            config.database_path(Path::new("/data")),
            PathBuf::from("/data/tv_launcher.db")
        );
    }

    #[test]
    fn test_serialization() {
        let config = LauncherConfig {
            refresh_policy: RefreshPolicy::Replace,
            ..LauncherConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"replace\""));
        let deserialized: LauncherConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: LauncherConfig = serde_json::from_str(r#"{ "recent_limit": 4 }"#).unwrap();
        assert_eq!(config.recent_limit, 4);
        assert_eq!(config.preferences_file, PathBuf::from("settings.json"));
    }
}

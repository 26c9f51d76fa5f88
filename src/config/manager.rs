//! Configuration manager for loading and saving launcher configuration
//!
//! The data directory is `$TVLAUNCHER_HOME` when set, otherwise
//! `<platform data dir>/tvlauncher`. It holds `config.json`, the app store,
//! the preference store and the log files.

use crate::config::models::LauncherConfig;
use crate::error::{LauncherError, Result, StringError};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TVLAUNCHER_HOME";

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the launcher data directory
    pub fn data_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tvlauncher")
    }

    /// Get the path to the configuration file
    ///
    /// Returns: `<data_dir>/config.json`
    pub fn get_config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Ensure the data directory exists
    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist or is corrupt, returns default configuration.
    pub fn load() -> Result<LauncherConfig> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(LauncherConfig::default());
        }

        let json = std::fs::read_to_string(&config_path)?;

        match serde_json::from_str(&json) {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(LauncherConfig::default())
            }
        }
    }

    /// Save configuration to disk with atomic write
    ///
    /// Writes to a temporary file in the data directory, then renames it over
    /// `config.json`.
    pub fn save(config: &LauncherConfig) -> Result<()> {
        let data_dir = Self::ensure_data_dir()?;
        let config_path = data_dir.join("config.json");

        let json = serde_json::to_string_pretty(config)?;
        let mut temp = NamedTempFile::new_in(&data_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&config_path).map_err(|e| {
            LauncherError::Config(StringError::new(format!(
                "Failed to replace {}: {}",
                config_path.display(),
                e.error
            )))
        })?;

        info!("Configuration saved successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefreshPolicy;
    use crate::test_utils::{DataDirGuard, create_test_dir};

    #[test]
    fn test_config_path_follows_env() {
        let dir = create_test_dir();
        let _guard = DataDirGuard::new(&dir);

        let path = ConfigManager::get_config_path();
        assert_eq!(path, dir.path().join("config.json"));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = create_test_dir();
        let _guard = DataDirGuard::new(&dir);

        let config = ConfigManager::load().unwrap();
        assert_eq!(config, LauncherConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = create_test_dir();
        let _guard = DataDirGuard::new(&dir);

        let config = LauncherConfig {
            refresh_policy: RefreshPolicy::Replace,
            recent_limit: 6,
            ..LauncherConfig::default()
        };
        ConfigManager::save(&config).unwrap();

        assert_eq!(ConfigManager::load().unwrap(), config);
    }

    #[test]
    fn test_corrupt_config_uses_defaults() {
        let dir = create_test_dir();
        let _guard = DataDirGuard::new(&dir);

        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        assert_eq!(ConfigManager::load().unwrap(), LauncherConfig::default());
    }
}

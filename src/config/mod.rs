//! Configuration management module
//!
//! This module handles loading, saving, and managing launcher configuration.
//! Configuration is stored in `<data_dir>/config.json` with atomic writes
//! to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::{ConfigManager, DATA_DIR_ENV};
pub use models::{LauncherConfig, RefreshPolicy};

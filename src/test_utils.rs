#![expect(
    clippy::unwrap_used,
    reason = "Test utilities use .unwrap() for brevity"
)]

//! Shared test utilities for launcher unit tests.
//!
//! This module is only compiled during testing (`#[cfg(test)]`).

use crate::config::DATA_DIR_ENV;
use crate::platform::{Icon, LaunchableActivity};
use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that modify the data directory environment variable.
static DATA_DIR_LOCK: Mutex<()> = Mutex::new(());

/// Create a temporary test directory that is removed when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Launcher entry point for a non-system package without a class name.
pub fn activity(package_id: &str, label: &str) -> LaunchableActivity {
    LaunchableActivity {
        package_id: package_id.to_string(),
        label: label.to_string(),
        class_name: None,
        is_system_app: false,
    }
}

/// Opaque white square icon.
pub fn solid_icon(side: u32) -> Icon {
    Icon {
        width: side,
        height: side,
        rgba: vec![255; (side * side * 4) as usize],
    }
}

/// RAII guard that points the data directory at a temp directory for a test
/// scope and restores the original value when dropped.
///
/// # Safety Considerations
///
/// `std::env::set_var` and `std::env::remove_var` are unsafe because other
/// threads may read the environment concurrently. The guard holds
/// `DATA_DIR_LOCK` for its whole lifetime, so only one test at a time touches
/// the variable, and every test that reads it takes the guard first.
pub struct DataDirGuard {
    original: Option<std::ffi::OsString>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only code that modifies environment variables under a global lock"
)]
impl DataDirGuard {
    /// Set the data directory to `temp_dir`.
    pub fn new(temp_dir: &TempDir) -> Self {
        // A test that panicked while holding the lock must not fail the rest
        let lock = DATA_DIR_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var_os(DATA_DIR_ENV);
        // SAFETY: DATA_DIR_LOCK is held, so no other test reads or writes the
        // variable until this guard is dropped.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only code that restores environment variables under a global lock"
)]
impl Drop for DataDirGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held; it is released after this body runs.
        unsafe {
            match &self.original {
                Some(original) => std::env::set_var(DATA_DIR_ENV, original),
                None => std::env::remove_var(DATA_DIR_ENV),
            }
        }
    }
}

//! Error types for the launcher core
//!
//! This module defines all error types used throughout the crate.
//!
//! Wrapped errors use `#[source]` so the full chain is available to
//! `tracing` output and to `anyhow` in the binary.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new boxed `StringError` from a message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for the launcher
#[derive(Debug, Error)]
pub enum LauncherError {
    /// SQLite error from the app store
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Preference store could not be read or written
    #[error("Preference store error: {0}")]
    Preferences(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The platform package registry failed to answer a query
    #[error("Platform query failed: {0}")]
    Platform(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No installed package with this identifier
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// The package could not be launched
    #[error("Failed to launch {package}: {reason}")]
    LaunchFailed {
        /// Package identifier
        package: String,
        /// Why the launch failed
        reason: String,
    },

    /// Icon could not be loaded or decoded
    #[error("Failed to load icon for {package}: {source}")]
    IconLoad {
        /// Package identifier
        package: String,
        /// Underlying decode or IO error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LauncherError>;

/// Convert an error to a message suitable for the launcher's error banner
pub fn get_user_friendly_error(error: &LauncherError) -> String {
    match error {
        LauncherError::Database(e) => format!(
            "The app library could not be read or updated:\n\n{e}\n\n\
             Favorites and recent apps may be out of date."
        ),
        LauncherError::Io(e) => format!(
            "A file system error occurred:\n\n{e}\n\n\
             Please check storage permissions and free space."
        ),
        LauncherError::Json(e) => format!(
            "A settings file is corrupted:\n\n{e}\n\n\
             The launcher will use default settings."
        ),
        LauncherError::Preferences(_) => "Failed to save your preferences.\n\n\
             Changes may not persist after a restart."
            .to_string(),
        LauncherError::Config(_) => "Failed to load or save the launcher configuration.\n\n\
             Default settings are in use."
            .to_string(),
        LauncherError::Platform(_) => "Unable to list installed apps.\n\n\
             The app grid may be incomplete. Try refreshing."
            .to_string(),
        LauncherError::PackageNotFound(package) => format!(
            "App not found: {package}\n\n\
             It may have been uninstalled."
        ),
        LauncherError::LaunchFailed { package, .. } => format!(
            "Could not open {package}.\n\n\
             Try again, or reinstall the app."
        ),
        LauncherError::IconLoad { package, .. } => format!(
            "Failed to load the icon for {package}.\n\n\
             A placeholder is shown instead. This does not affect the app."
        ),
    }
}

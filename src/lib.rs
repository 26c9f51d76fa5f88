//! `tvlauncher` - data and state core of a TV home-screen launcher
//!
//! Enumerates installed applications through a [`platform::PackageCatalog`],
//! keeps per-app usage metadata in a SQLite [`store::AppStore`], keeps user
//! settings in a JSON [`preferences::PreferenceStore`], and aggregates both
//! into one [`viewmodel::LauncherState`] that is pushed to the UI on every
//! change.
//!
//! # Layers
//!
//! ```text
//! UI intent → LauncherViewModel → AppRepository / SettingsRepository
//!                                       ↓
//!                            AppStore / PreferenceStore
//!                                       ↓ change notification
//!           LauncherState ← LauncherViewModel ← LiveQuery
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod observe;
pub mod platform;
pub mod preferences;
pub mod repository;
pub mod store;
pub mod utils;
pub mod viewmodel;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use error::{LauncherError, Result};

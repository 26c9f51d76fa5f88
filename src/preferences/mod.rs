//! Preference store module
//!
//! A flat, durable key-value bag for user-facing settings (theme, grid
//! layout, toggles). Stored as `settings.json` in the data directory and
//! replaced atomically on every edit.

pub mod keys;
pub mod models;
pub mod store;

pub use keys::{PreferenceKey, PreferenceValue, Preferences};
pub use models::UserPreferences;
pub use store::PreferenceStore;

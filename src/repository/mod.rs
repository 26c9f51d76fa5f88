//! Repository layer
//!
//! Repositories sit between the view-model and the stores. The app
//! repository adds platform scanning, category assignment and icons on top
//! of the app store; the settings repository adds typed preference access
//! on top of the preference store.

pub mod app_repository;
pub mod category;
pub mod settings_repository;

pub use crate::config::RefreshPolicy;
pub use app_repository::{AppRepository, LauncherApp};
pub use category::{AppCategory, categorize};
pub use settings_repository::SettingsRepository;

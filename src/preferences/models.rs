//! User preference model and its storage keys

use crate::preferences::keys::{PreferenceKey, Preferences};
use serde::{Deserialize, Serialize};

/// Theme name
pub const THEME: PreferenceKey<String> = PreferenceKey::new("theme");
/// Use wallpaper-derived colors
pub const DYNAMIC_COLOR: PreferenceKey<bool> = PreferenceKey::new("dynamic_color");
/// Dark palette
pub const DARK_THEME: PreferenceKey<bool> = PreferenceKey::new("dark_theme");
/// Focus and transition animations
pub const ANIMATION_ENABLED: PreferenceKey<bool> = PreferenceKey::new("animation_enabled");
/// Voice search button
pub const VOICE_SEARCH_ENABLED: PreferenceKey<bool> = PreferenceKey::new("voice_search_enabled");
/// Show system apps in the grid
pub const SHOW_SYSTEM_APPS: PreferenceKey<bool> = PreferenceKey::new("show_system_apps");
/// Grid ordering selector
pub const SORT_ORDER: PreferenceKey<String> = PreferenceKey::new("sort_order");
/// App grid column count
pub const GRID_COLUMNS: PreferenceKey<i64> = PreferenceKey::new("grid_columns");
/// Wallpaper image path
pub const BACKGROUND_IMAGE: PreferenceKey<String> = PreferenceKey::new("background_image");

/// Theme name that also turns on the dark palette
pub const DARK_THEME_NAME: &str = "dark";

/// Sort orders understood by the app grid
pub mod sort_order {
    /// Alphabetical by display name
    pub const NAME: &str = "name";
    /// Most recently launched first
    pub const RECENT: &str = "recent";
    /// Most launched first
    pub const USAGE: &str = "usage";
}

/// User-facing settings with defaults filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Theme name
    pub theme: String,
    /// Use wallpaper-derived colors
    pub use_dynamic_color: bool,
    /// Dark palette
    pub is_dark_theme: bool,
    /// Focus and transition animations
    pub animation_enabled: bool,
    /// Voice search button
    pub voice_search_enabled: bool,
    /// Show system apps in the grid
    pub show_system_apps: bool,
    /// Grid ordering selector
    pub sort_order: String,
    /// App grid column count (not range-checked)
    pub grid_columns: i64,
    /// Wallpaper image path
    pub background_image: Option<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: DARK_THEME_NAME.to_string(),
            use_dynamic_color: true,
            is_dark_theme: true,
            animation_enabled: true,
            voice_search_enabled: true,
            show_system_apps: false,
            sort_order: sort_order::NAME.to_string(),
            grid_columns: 5,
            background_image: None,
        }
    }
}

impl UserPreferences {
    /// Map a raw bag to the typed shape; absent keys take their defaults
    pub fn from_preferences(prefs: &Preferences) -> Self {
        let defaults = Self::default();
        Self {
            theme: prefs.get(THEME).unwrap_or(defaults.theme),
            use_dynamic_color: prefs.get(DYNAMIC_COLOR).unwrap_or(defaults.use_dynamic_color),
            is_dark_theme: prefs.get(DARK_THEME).unwrap_or(defaults.is_dark_theme),
            animation_enabled: prefs
                .get(ANIMATION_ENABLED)
                .unwrap_or(defaults.animation_enabled),
            voice_search_enabled: prefs
                .get(VOICE_SEARCH_ENABLED)
                .unwrap_or(defaults.voice_search_enabled),
            show_system_apps: prefs
                .get(SHOW_SYSTEM_APPS)
                .unwrap_or(defaults.show_system_apps),
            sort_order: prefs.get(SORT_ORDER).unwrap_or(defaults.sort_order),
            grid_columns: prefs.get(GRID_COLUMNS).unwrap_or(defaults.grid_columns),
            background_image: prefs.get(BACKGROUND_IMAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bag_maps_to_defaults() {
        let prefs = UserPreferences::from_preferences(&Preferences::new());
        assert_eq!(prefs, UserPreferences::default());
        assert_eq!(prefs.theme, "dark");
        assert_eq!(prefs.grid_columns, 5);
        assert!(!prefs.show_system_apps);
        assert_eq!(prefs.background_image, None);
    }

    #[test]
    fn stored_values_override_defaults() {
        let mut bag = Preferences::new();
        bag.set(GRID_COLUMNS, &7);
        bag.set(BACKGROUND_IMAGE, &"/sdcard/wall.png".to_string());

        let prefs = UserPreferences::from_preferences(&bag);
        assert_eq!(prefs.grid_columns, 7);
        assert_eq!(prefs.background_image.as_deref(), Some("/sdcard/wall.png"));
        assert!(prefs.animation_enabled);
    }
}

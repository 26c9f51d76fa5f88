//! Settings repository
//!
//! Typed access to user preferences. Each setter is one atomic edit of the
//! preference store, so concurrent writes to different keys never lose
//! each other.

use crate::error::Result;
use crate::observe::LiveQuery;
use crate::preferences::models::{
    ANIMATION_ENABLED, BACKGROUND_IMAGE, DARK_THEME, DARK_THEME_NAME, DYNAMIC_COLOR, GRID_COLUMNS,
    SHOW_SYSTEM_APPS, SORT_ORDER, THEME, VOICE_SEARCH_ENABLED,
};
use crate::preferences::{PreferenceKey, PreferenceStore, UserPreferences};
use tracing::debug;

/// Repository over the user preference store
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    store: PreferenceStore,
}

impl SettingsRepository {
    /// Wrap a preference store
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    /// Live typed preferences, re-emitted after every change
    pub fn preferences(&self) -> LiveQuery<UserPreferences> {
        self.store
            .watch()
            .map(|prefs| UserPreferences::from_preferences(&prefs))
    }

    /// Current typed preferences
    pub fn current(&self) -> UserPreferences {
        UserPreferences::from_preferences(&self.store.snapshot())
    }

    /// Set the theme; the dark palette follows whether the theme is `"dark"`
    pub fn update_theme(&self, theme: &str) -> Result<()> {
        debug!(theme, "Updating theme");
        self.store.edit(|prefs| {
            prefs.set(THEME, &theme.to_string());
            prefs.set(DARK_THEME, &(theme == DARK_THEME_NAME));
        })
    }

    /// Turn wallpaper-derived colors on or off
    pub fn toggle_dynamic_color(&self, enabled: bool) -> Result<()> {
        self.set_flag(DYNAMIC_COLOR, enabled)
    }

    /// Turn focus and transition animations on or off
    pub fn toggle_animation(&self, enabled: bool) -> Result<()> {
        self.set_flag(ANIMATION_ENABLED, enabled)
    }

    /// Show or hide the voice search button
    pub fn toggle_voice_search(&self, enabled: bool) -> Result<()> {
        self.set_flag(VOICE_SEARCH_ENABLED, enabled)
    }

    /// Show or hide system apps in the grid
    pub fn toggle_system_apps(&self, show: bool) -> Result<()> {
        self.set_flag(SHOW_SYSTEM_APPS, show)
    }

    /// Set the grid ordering selector
    pub fn update_sort_order(&self, sort_order: &str) -> Result<()> {
        self.store
            .edit(|prefs| prefs.set(SORT_ORDER, &sort_order.to_string()))
    }

    /// Set the grid column count; any value is stored as given
    pub fn update_grid_columns(&self, columns: i64) -> Result<()> {
        self.store.edit(|prefs| prefs.set(GRID_COLUMNS, &columns))
    }

    /// Set or clear the wallpaper image path
    pub fn update_background_image(&self, path: Option<&str>) -> Result<()> {
        self.store.edit(|prefs| match path {
            Some(path) => prefs.set(BACKGROUND_IMAGE, &path.to_string()),
            None => {
                prefs.remove(BACKGROUND_IMAGE);
            }
        })
    }

    fn set_flag(&self, key: PreferenceKey<bool>, value: bool) -> Result<()> {
        debug!(key = key.name(), value, "Updating setting");
        self.store.edit(|prefs| prefs.set(key, &value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::Poll;
    use crate::preferences::models::sort_order;
    use std::time::Duration;

    fn repo() -> SettingsRepository {
        SettingsRepository::new(PreferenceStore::open_in_memory())
    }

    #[test]
    fn fresh_store_reads_defaults() {
        assert_eq!(repo().current(), UserPreferences::default());
    }

    #[test]
    fn theme_drives_dark_palette() {
        let repo = repo();
        repo.update_theme("light").unwrap();
        let prefs = repo.current();
        assert_eq!(prefs.theme, "light");
        assert!(!prefs.is_dark_theme);

        repo.update_theme("dark").unwrap();
        assert!(repo.current().is_dark_theme);
    }

    #[test]
    fn toggles_store_the_given_value() {
        let repo = repo();
        repo.toggle_dynamic_color(false).unwrap();
        repo.toggle_animation(false).unwrap();
        repo.toggle_voice_search(false).unwrap();
        repo.toggle_system_apps(true).unwrap();

        let prefs = repo.current();
        assert!(!prefs.use_dynamic_color);
        assert!(!prefs.animation_enabled);
        assert!(!prefs.voice_search_enabled);
        assert!(prefs.show_system_apps);

        repo.toggle_system_apps(true).unwrap();
        assert!(repo.current().show_system_apps);
        repo.toggle_system_apps(false).unwrap();
        assert!(!repo.current().show_system_apps);
    }

    #[test]
    fn grid_columns_are_not_range_checked() {
        let repo = repo();
        repo.update_grid_columns(-3).unwrap();
        assert_eq!(repo.current().grid_columns, -3);
        repo.update_grid_columns(0).unwrap();
        assert_eq!(repo.current().grid_columns, 0);
    }

    #[test]
    fn background_image_can_be_cleared() {
        let repo = repo();
        repo.update_background_image(Some("/media/wall.png")).unwrap();
        assert_eq!(
            repo.current().background_image.as_deref(),
            Some("/media/wall.png")
        );
        repo.update_background_image(None).unwrap();
        assert_eq!(repo.current().background_image, None);
    }

    #[test]
    fn preferences_stream_reemits_on_change() {
        let repo = repo();
        let mut stream = repo.preferences();
        assert_eq!(stream.next().unwrap().unwrap(), UserPreferences::default());

        repo.update_sort_order(sort_order::USAGE).unwrap();
        match stream.next_timeout(Duration::from_secs(1)) {
            Poll::Ready(prefs) => assert_eq!(prefs.unwrap().sort_order, "usage"),
            other => panic!("expected an emission, got {other:?}"),
        }
    }
}

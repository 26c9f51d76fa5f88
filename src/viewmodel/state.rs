//! View state published to the UI

use crate::preferences::UserPreferences;
use crate::preferences::models::sort_order;
use crate::repository::{AppCategory, LauncherApp};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Screen the launcher is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationState {
    /// Home rows (favorites, recent, all apps)
    #[default]
    Home,
    /// Full app grid
    Apps,
    /// Games grid
    Games,
    /// Settings screen
    Settings,
    /// Theme picker
    Themes,
    /// Search screen
    Search,
}

/// Everything the UI renders, rebuilt on every upstream change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherState {
    /// All stored apps ordered by name
    pub apps: Vec<LauncherApp>,
    /// Favorite apps, most recently used first
    pub favorite_apps: Vec<LauncherApp>,
    /// Recently launched apps, newest first
    pub recent_apps: Vec<LauncherApp>,
    /// Categories with app counts
    pub categories: Vec<AppCategory>,
    /// Category tab currently selected
    pub selected_category: Option<AppCategory>,
    /// Query of the last completed search
    pub search_query: String,
    /// Results of the last completed search
    pub search_results: Vec<LauncherApp>,
    /// True until the first full aggregation and while a rescan runs
    pub is_loading: bool,
    /// Last error message, if any
    pub error: Option<String>,
    /// Current user preferences
    pub user_preferences: UserPreferences,
}

impl Default for LauncherState {
    fn default() -> Self {
        Self {
            apps: Vec::new(),
            favorite_apps: Vec::new(),
            recent_apps: Vec::new(),
            categories: Vec::new(),
            selected_category: None,
            search_query: String::new(),
            search_results: Vec::new(),
            is_loading: true,
            error: None,
            user_preferences: UserPreferences::default(),
        }
    }
}

impl LauncherState {
    /// Apps for the main grid, filtered and ordered by the user preferences
    ///
    /// System apps are hidden unless `show_system_apps` is set. Unknown sort
    /// orders fall back to ordering by name.
    pub fn visible_apps(&self) -> Vec<&LauncherApp> {
        let prefs = &self.user_preferences;
        let mut apps: Vec<&LauncherApp> = self
            .apps
            .iter()
            .filter(|app| prefs.show_system_apps || !app.record.is_system_app)
            .collect();

        match prefs.sort_order.as_str() {
            sort_order::RECENT => {
                apps.sort_by_key(|app| Reverse(app.record.last_used_timestamp));
            }
            sort_order::USAGE => apps.sort_by_key(|app| Reverse(app.record.usage_count)),
            _ => apps.sort_by(|a, b| a.record.display_name.cmp(&b.record.display_name)),
        }
        apps
    }

    /// Visible apps in the selected category, or all visible apps when none is selected
    pub fn apps_in_selected_category(&self) -> Vec<&LauncherApp> {
        let visible = self.visible_apps();
        match &self.selected_category {
            Some(category) => visible
                .into_iter()
                .filter(|app| app.record.category == category.name)
                .collect(),
            None => visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AppRecord;

    fn app(package: &str, name: &str, last_used: i64, usage: u32, system: bool) -> LauncherApp {
        LauncherApp {
            record: AppRecord {
                last_used_timestamp: last_used,
                usage_count: usage,
                is_system_app: system,
                category: if package.contains("game") { "Games" } else { "Apps" }.to_string(),
                ..AppRecord::new(package, name)
            },
            icon: None,
        }
    }

    fn state() -> LauncherState {
        LauncherState {
            apps: vec![
                app("com.a.game", "Alpha", 300, 1, false),
                app("com.b", "Bravo", 100, 9, false),
                app("com.c", "Charlie", 200, 5, true),
            ],
            ..LauncherState::default()
        }
    }

    fn names(apps: &[&LauncherApp]) -> Vec<String> {
        apps.iter().map(|a| a.record.display_name.clone()).collect()
    }

    #[test]
    fn initial_state_is_loading() {
        let state = LauncherState::default();
        assert!(state.is_loading);
        assert!(state.apps.is_empty());
        assert_eq!(state.error, None);
    }

    #[test]
    fn system_apps_hidden_by_default() {
        let mut state = state();
        assert_eq!(names(&state.visible_apps()), ["Alpha", "Bravo"]);

        state.user_preferences.show_system_apps = true;
        assert_eq!(names(&state.visible_apps()), ["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn sort_orders() {
        let mut state = state();
        state.user_preferences.show_system_apps = true;

        state.user_preferences.sort_order = sort_order::RECENT.to_string();
        assert_eq!(names(&state.visible_apps()), ["Alpha", "Charlie", "Bravo"]);

        state.user_preferences.sort_order = sort_order::USAGE.to_string();
        assert_eq!(names(&state.visible_apps()), ["Bravo", "Charlie", "Alpha"]);

        state.user_preferences.sort_order = "shuffle".to_string();
        assert_eq!(names(&state.visible_apps()), ["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn selected_category_filters_visible_apps() {
        let mut state = state();
        assert_eq!(state.apps_in_selected_category().len(), 2);

        state.selected_category = Some(AppCategory::new("Games", 1));
        assert_eq!(names(&state.apps_in_selected_category()), ["Alpha"]);
    }

    #[test]
    fn navigation_defaults_to_home() {
        assert_eq!(NavigationState::default(), NavigationState::Home);
    }
}

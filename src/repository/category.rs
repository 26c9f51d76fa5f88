//! App categories
//!
//! Categories are assigned by substring heuristics on the package identifier
//! when an app is scanned. Matching is case-sensitive and the first matching
//! rule wins.

use crate::store::models::DEFAULT_CATEGORY;
use serde::{Deserialize, Serialize};

/// Games
pub const GAMES: &str = "Games";
/// Video and TV
pub const VIDEO: &str = "Video";
/// Music and audio
pub const MUSIC: &str = "Music";
/// Web browsers
pub const BROWSER: &str = "Browser";
/// System and app settings
pub const SETTINGS: &str = "Settings";

/// Pick a category for a scanned app
///
/// Only the games rule also looks at the entry point class name.
pub fn categorize(package_id: &str, class_name: Option<&str>) -> &'static str {
    let contains = |needle: &str| package_id.contains(needle);

    if contains("game") || class_name.is_some_and(|class| class.contains("game")) {
        GAMES
    } else if contains("video") || contains("tv") {
        VIDEO
    } else if contains("music") || contains("audio") {
        MUSIC
    } else if contains("browser") {
        BROWSER
    } else if contains("settings") {
        SETTINGS
    } else {
        DEFAULT_CATEGORY
    }
}

/// A category with the number of apps currently in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCategory {
    /// Stored category name
    pub name: String,
    /// Name with its first character upper-cased
    pub display_name: String,
    /// Apps in this category
    pub app_count: usize,
}

impl AppCategory {
    /// Build a category entry from its stored name and count
    pub fn new(name: impl Into<String>, app_count: usize) -> Self {
        let name = name.into();
        Self {
            display_name: capitalize_first(&name),
            name,
            app_count,
        }
    }
}

fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_apply_in_order() {
        assert_eq!(categorize("com.videogame.tv", None), GAMES);
        assert_eq!(categorize("com.netflix.ninja", None), DEFAULT_CATEGORY);
        assert_eq!(categorize("com.google.android.youtube.tv", None), VIDEO);
        assert_eq!(categorize("com.spotify.music", None), MUSIC);
        assert_eq!(categorize("com.example.audiobooks", None), MUSIC);
        assert_eq!(categorize("org.mozilla.browser", None), BROWSER);
        assert_eq!(categorize("com.android.settings", None), SETTINGS);
    }

    #[test]
    fn class_name_only_matters_for_games() {
        assert_eq!(categorize("com.example.x", Some("com.example.x.gameActivity")), GAMES);
        assert_eq!(categorize("com.example.x", Some("com.example.x.VideoActivity")), DEFAULT_CATEGORY);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(categorize("com.example.GAME", None), DEFAULT_CATEGORY);
        assert_eq!(categorize("com.example.TV", None), DEFAULT_CATEGORY);
    }

    #[test]
    fn display_name_capitalizes_first_character() {
        let category = AppCategory::new("games", 3);
        assert_eq!(category.display_name, "Games");
        assert_eq!(category.app_count, 3);
        assert_eq!(AppCategory::new("Video", 0).display_name, "Video");
        assert_eq!(AppCategory::new("", 0).display_name, "");
    }
}

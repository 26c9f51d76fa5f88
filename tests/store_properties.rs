//! Property-based tests for the app store and category heuristic

use proptest::prelude::*;
use tvlauncher::{
    repository::categorize,
    store::{AppRecord, AppStore},
};

const CATEGORIES: [&str; 6] = ["Games", "Video", "Music", "Browser", "Settings", "Apps"];

fn store_with(count: usize) -> AppStore {
    let store = AppStore::open_in_memory().unwrap();
    let records: Vec<AppRecord> = (0..count)
        .map(|i| AppRecord::new(format!("com.example.app{i}"), format!("App {i}")))
        .collect();
    store.upsert_all(&records).unwrap();
    store
}

proptest! {
    /// Property: each recorded launch adds exactly one to the usage count
    #[test]
    fn record_usage_increments_by_one(launches in 1u32..20, timestamp in 1i64..i64::MAX) {
        let store = store_with(1);
        for n in 1..=launches {
            prop_assert!(store.record_usage("com.example.app0", timestamp).unwrap());
            let record = store.get("com.example.app0").unwrap().unwrap();
            prop_assert_eq!(record.usage_count, n);
            prop_assert_eq!(record.last_used_timestamp, timestamp);
        }
    }

    /// Property: the recent list respects its limit and never holds unused apps
    #[test]
    fn recent_is_bounded_and_used_only(
        launched in prop::collection::vec((0usize..12, 1i64..1_000_000), 0..30),
        limit in 0usize..15,
    ) {
        let store = store_with(12);
        for (index, timestamp) in &launched {
            store.record_usage(&format!("com.example.app{index}"), *timestamp).unwrap();
        }

        let recent = store.list_recent(limit).unwrap();
        prop_assert!(recent.len() <= limit);
        prop_assert!(recent.iter().all(|r| r.last_used_timestamp > 0));
        prop_assert!(
            recent
                .windows(2)
                .all(|pair| pair[0].last_used_timestamp >= pair[1].last_used_timestamp)
        );
    }

    /// Property: toggling a favorite twice restores the original flag
    #[test]
    fn toggle_twice_is_identity(initial in any::<bool>()) {
        let store = store_with(1);
        store.set_favorite("com.example.app0", initial).unwrap();

        prop_assert_eq!(store.toggle_favorite("com.example.app0").unwrap(), Some(!initial));
        prop_assert_eq!(store.toggle_favorite("com.example.app0").unwrap(), Some(initial));
        prop_assert_eq!(store.get("com.example.app0").unwrap().unwrap().is_favorite, initial);
    }

    /// Property: category counts always add up to the number of rows
    #[test]
    fn category_counts_cover_every_row(packages in prop::collection::hash_set("[a-z.]{1,24}", 0..20)) {
        let store = AppStore::open_in_memory().unwrap();
        let records: Vec<AppRecord> = packages
            .iter()
            .map(|package| AppRecord {
                category: categorize(package, None).to_string(),
                ..AppRecord::new(package.clone(), package.clone())
            })
            .collect();
        store.upsert_all(&records).unwrap();

        let counts = store.category_counts().unwrap();
        prop_assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), packages.len());
        prop_assert!(counts.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    /// Property: the heuristic always picks one of the six categories
    #[test]
    fn categorize_is_total(package in ".*", class in proptest::option::of(".*")) {
        let category = categorize(&package, class.as_deref());
        prop_assert!(CATEGORIES.contains(&category));
    }

    /// Property: any package containing "game" is a game
    #[test]
    fn game_rule_wins(prefix in "[a-z.]{0,10}", suffix in "[a-z.]{0,10}") {
        let package = format!("{prefix}game{suffix}");
        prop_assert_eq!(categorize(&package, None), "Games");
    }
}

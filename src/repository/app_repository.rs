//! App repository
//!
//! Joins the platform package catalog with the persistent app store. Scans
//! turn launchable activities into [`AppRecord`]s, and every read attaches
//! icons from the shared [`IconCache`].

use crate::config::{LauncherConfig, RefreshPolicy};
use crate::error::Result;
use crate::observe::LiveQuery;
use crate::platform::{Icon, LaunchableActivity, PackageCatalog, PackageInfo};
use crate::repository::category::{AppCategory, categorize};
use crate::store::{AppRecord, AppStore, DEFAULT_RECENT_LIMIT};
use crate::utils::icon_cache::{CacheStats, IconCache};
use crate::utils::now_millis;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// An app record with its icon attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherApp {
    /// Persisted metadata and usage counters
    pub record: AppRecord,
    /// Decoded icon, absent when the platform could not provide one
    pub icon: Option<Arc<Icon>>,
}

impl LauncherApp {
    /// Package identifier
    pub fn package_id(&self) -> &str {
        &self.record.package_id
    }

    /// Label shown on the app card
    pub fn display_name(&self) -> &str {
        &self.record.display_name
    }
}

/// Repository over installed apps and their usage metadata
#[derive(Clone)]
pub struct AppRepository {
    store: AppStore,
    catalog: Arc<dyn PackageCatalog>,
    icons: Arc<IconCache>,
    refresh_policy: RefreshPolicy,
    recent_limit: usize,
}

impl std::fmt::Debug for AppRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppRepository")
            .field("store", &self.store)
            .field("refresh_policy", &self.refresh_policy)
            .field("recent_limit", &self.recent_limit)
            .finish_non_exhaustive()
    }
}

impl AppRepository {
    /// Repository with the default refresh policy, recent limit and icon cache
    pub fn new(store: AppStore, catalog: Arc<dyn PackageCatalog>) -> Self {
        Self {
            store,
            catalog,
            icons: Arc::new(IconCache::default()),
            refresh_policy: RefreshPolicy::default(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Repository configured from `config`
    pub fn with_config(
        store: AppStore,
        catalog: Arc<dyn PackageCatalog>,
        config: &LauncherConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            icons: Arc::new(IconCache::new(config.icon_cache_capacity)),
            refresh_policy: config.refresh_policy,
            recent_limit: config.recent_limit,
        }
    }

    /// Override the scan write policy
    #[must_use]
    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Override the number of recent apps returned
    #[must_use]
    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Underlying app store
    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Scan write policy in effect
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.refresh_policy
    }

    /// Rescan launchable apps and write them to the store
    ///
    /// Returns the number of apps scanned. Apps that are no longer installed
    /// keep their rows. The icon cache is cleared afterwards.
    pub fn refresh_installed_apps(&self) -> Result<usize> {
        let activities = self.catalog.launchable_activities()?;
        let now = now_millis();

        let mut records: Vec<AppRecord> = activities
            .into_par_iter()
            .map(|activity| self.scan_record(activity, now))
            .collect();
        records.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        match self.refresh_policy {
            RefreshPolicy::Merge => self.store.upsert_all_preserving_usage(&records)?,
            RefreshPolicy::Replace => self.store.upsert_all(&records)?,
        }
        self.icons.clear();

        info!(
            count = records.len(),
            policy = ?self.refresh_policy,
            "Refreshed installed apps"
        );
        Ok(records.len())
    }

    fn scan_record(&self, activity: LaunchableActivity, now: i64) -> AppRecord {
        let info = self
            .catalog
            .package_info(&activity.package_id)
            .unwrap_or_else(|e| {
                debug!(package = %activity.package_id, "Package info unavailable: {}", e);
                PackageInfo::default()
            });

        let category = categorize(&activity.package_id, activity.class_name.as_deref());
        AppRecord {
            category: category.to_string(),
            entry_point_class: activity.class_name,
            is_system_app: activity.is_system_app,
            install_timestamp: info.first_install_time.unwrap_or(now),
            update_timestamp: info.last_update_time.unwrap_or(now),
            version_name: info.version_name,
            version_code: info.version_code.unwrap_or(0),
            ..AppRecord::new(activity.package_id, activity.label)
        }
    }

    fn with_icon(&self, record: AppRecord) -> LauncherApp {
        let icon = self
            .icons
            .get_or_load(&record.package_id, || self.catalog.load_icon(&record.package_id));
        LauncherApp { record, icon }
    }

    fn attach_icons(&self, records: Vec<AppRecord>) -> Vec<LauncherApp> {
        records
            .into_iter()
            .map(|record| self.with_icon(record))
            .collect()
    }

    /// All apps ordered by name
    pub fn get_apps(&self) -> LiveQuery<Vec<LauncherApp>> {
        let repo = self.clone();
        self.store
            .watch_all()
            .map(move |records| repo.attach_icons(records))
    }

    /// Favorite apps, most recently used first
    pub fn get_favorite_apps(&self) -> LiveQuery<Vec<LauncherApp>> {
        let repo = self.clone();
        self.store
            .watch_favorites()
            .map(move |records| repo.attach_icons(records))
    }

    /// Recently launched apps, capped at the configured limit
    pub fn get_recent_apps(&self) -> LiveQuery<Vec<LauncherApp>> {
        let repo = self.clone();
        self.store
            .watch_recent(self.recent_limit)
            .map(move |records| repo.attach_icons(records))
    }

    /// Apps in one category ordered by name
    pub fn get_apps_by_category(&self, category: impl Into<String>) -> LiveQuery<Vec<LauncherApp>> {
        let repo = self.clone();
        self.store
            .watch_by_category(category)
            .map(move |records| repo.attach_icons(records))
    }

    /// Categories in ascending name order with their app counts
    pub fn get_categories(&self) -> LiveQuery<Vec<AppCategory>> {
        self.store.watch_category_counts().map(|counts| {
            counts
                .into_iter()
                .map(|(name, count)| AppCategory::new(name, count))
                .collect()
        })
    }

    /// The `limit` most launched apps
    pub fn get_most_used_apps(&self, limit: usize) -> Result<Vec<LauncherApp>> {
        Ok(self.attach_icons(self.store.list_most_used(limit)?))
    }

    /// One app with its icon
    pub fn get_app(&self, package_id: &str) -> Result<Option<LauncherApp>> {
        Ok(self
            .store
            .get(package_id)?
            .map(|record| self.with_icon(record)))
    }

    /// Flip the favorite flag; returns the new value, or `None` for an unknown package
    pub fn toggle_favorite(&self, package_id: &str) -> Result<Option<bool>> {
        let toggled = self.store.toggle_favorite(package_id)?;
        match toggled {
            Some(is_favorite) => debug!(package = package_id, is_favorite, "Toggled favorite"),
            None => debug!(package = package_id, "Toggle favorite ignored, app not stored"),
        }
        Ok(toggled)
    }

    /// Count one launch at the current time; returns whether the app is stored
    pub fn update_app_usage(&self, package_id: &str) -> Result<bool> {
        self.store.record_usage(package_id, now_millis())
    }

    /// Apps whose name or package contains `query`
    ///
    /// An empty query matches nothing. LIKE wildcards in the query are taken
    /// literally.
    pub fn search_apps(&self, query: &str) -> Result<Vec<LauncherApp>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));
        Ok(self.attach_icons(self.store.search(&pattern)?))
    }

    /// Start an app and count the launch
    ///
    /// Usage is only recorded when the platform accepted the launch.
    pub fn launch_app(&self, package_id: &str) -> Result<()> {
        self.catalog.launch(package_id)?;
        self.update_app_usage(package_id)?;
        Ok(())
    }

    /// Delete every stored system app; returns how many rows were removed
    pub fn purge_system_apps(&self) -> Result<usize> {
        let removed = self.store.delete_all_system_apps()?;
        info!(removed, "Purged system apps");
        Ok(removed)
    }

    /// Icon cache occupancy
    pub fn icon_cache_stats(&self) -> CacheStats {
        self.icons.stats()
    }
}

/// Escape LIKE metacharacters with a backslash
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

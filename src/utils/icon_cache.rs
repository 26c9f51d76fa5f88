//! In-memory icon cache
//!
//! Every emission of an app list attaches icons to its records, so icons are
//! decoded once per package and shared as `Arc<Icon>` afterwards.
//!
//! # Design Principles
//!
//! - **Thread Safety**: `IconCache` is `Send + Sync`; all methods take `&self`
//! - **Graceful Degradation**: a failed load is cached as "no icon" and never
//!   surfaces as an error to the caller
//! - **Bounded**: at most `capacity` packages are held; the oldest entry is
//!   evicted first
//!
//! The cache is cleared whenever the installed app set is rescanned, which is
//! also when a package's icon may have changed.

use crate::error::Result;
use crate::platform::Icon;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Default number of packages kept in the cache
pub const DEFAULT_ICON_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct Entries {
    icons: HashMap<String, Option<Arc<Icon>>>,
    order: VecDeque<String>,
}

/// Bounded icon cache keyed by package identifier
#[derive(Debug)]
pub struct IconCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_CACHE_CAPACITY)
    }
}

impl IconCache {
    /// Create a cache holding at most `capacity` packages
    ///
    /// A capacity of zero disables caching: every lookup calls the loader.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Return the cached icon for `package_id`, loading it on a miss
    ///
    /// Loader errors are logged at debug level and remembered, so a package
    /// without a usable icon is not decoded again until the cache is cleared.
    pub fn get_or_load<F>(&self, package_id: &str, load: F) -> Option<Arc<Icon>>
    where
        F: FnOnce() -> Result<Icon>,
    {
        if let Some(cached) = self.entries.lock().icons.get(package_id) {
            return cached.clone();
        }

        // Load outside the lock; a concurrent miss on the same package just
        // decodes twice and the second insert is discarded.
        let loaded = match load() {
            Ok(icon) => Some(Arc::new(icon)),
            Err(e) => {
                debug!(package = package_id, "Icon unavailable: {}", e);
                None
            }
        };

        if self.capacity == 0 {
            return loaded;
        }

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.icons.get(package_id) {
            return existing.clone();
        }
        while entries.order.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.icons.remove(&oldest);
                }
                None => break,
            }
        }
        entries.order.push_back(package_id.to_string());
        entries.icons.insert(package_id.to_string(), loaded.clone());
        loaded
    }

    /// Drop one package's entry
    pub fn remove(&self, package_id: &str) -> bool {
        let mut entries = self.entries.lock();
        entries.order.retain(|p| p != package_id);
        entries.icons.remove(package_id).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.icons.clear();
        entries.order.clear();
    }

    /// Entry count and decoded pixel bytes held
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let size_bytes = entries
            .icons
            .values()
            .flatten()
            .map(|icon| icon.rgba.len() as u64)
            .sum();
        CacheStats {
            count: entries.icons.len(),
            size_bytes,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached packages, including ones cached as "no icon"
    pub count: usize,
    /// Total size of decoded pixel data in bytes
    pub size_bytes: u64,
}

impl CacheStats {
    /// Format size as human-readable string
    ///
    /// ```
    /// use tvlauncher::utils::icon_cache::CacheStats;
    ///
    /// let stats = CacheStats { count: 10, size_bytes: 40960 };
    /// assert_eq!(stats.size_human_readable(), "40 KB");
    ///
    /// let stats = CacheStats { count: 100, size_bytes: 2_097_152 };
    /// assert_eq!(stats.size_human_readable(), "2.0 MB");
    /// ```
    #[allow(clippy::cast_precision_loss)]
    pub fn size_human_readable(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * KB;

        if self.size_bytes >= MB {
            format!("{:.1} MB", self.size_bytes as f64 / MB as f64)
        } else if self.size_bytes >= KB {
            format!("{} KB", self.size_bytes / KB)
        } else {
            format!("{} bytes", self.size_bytes)
        }
    }
}

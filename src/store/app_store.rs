//! SQLite-backed app store
//!
//! A single `apps` table keyed by package name. Each public method runs one
//! statement (or one transaction for bulk writes) under the connection lock,
//! so every call is atomic on its own. Nothing spans calls.
//!
//! Writes that change at least one row notify subscribers. Watch methods
//! return [`LiveQuery`]s that re-run their statement after each such write.

use crate::error::Result;
use crate::observe::{ChangeNotifier, LiveQuery};
use crate::store::models::AppRecord;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, Statement, params};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Number of rows returned by [`AppStore::list_recent`] when the caller has no preference
pub const DEFAULT_RECENT_LIMIT: usize = 10;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS apps (
    package_name  TEXT PRIMARY KEY NOT NULL,
    name          TEXT NOT NULL,
    class_name    TEXT,
    category      TEXT NOT NULL,
    is_favorite   INTEGER NOT NULL DEFAULT 0,
    is_system_app INTEGER NOT NULL DEFAULT 0,
    install_time  INTEGER NOT NULL,
    update_time   INTEGER NOT NULL,
    last_used     INTEGER NOT NULL DEFAULT 0,
    usage_count   INTEGER NOT NULL DEFAULT 0,
    version_name  TEXT,
    version_code  INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_apps_last_used ON apps(last_used);
CREATE INDEX IF NOT EXISTS idx_apps_category ON apps(category);
";

const COLUMNS: &str = "package_name, name, class_name, category, is_favorite, is_system_app, \
                       install_time, update_time, last_used, usage_count, version_name, version_code";

const INSERT_OR_REPLACE: &str = "INSERT OR REPLACE INTO apps (package_name, name, class_name, \
     category, is_favorite, is_system_app, install_time, update_time, last_used, usage_count, \
     version_name, version_code) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

// Scan data wins for metadata; favorite and usage columns keep their stored values.
const UPSERT_PRESERVING_USAGE: &str = "INSERT INTO apps (package_name, name, class_name, \
     category, is_favorite, is_system_app, install_time, update_time, last_used, usage_count, \
     version_name, version_code) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
     ON CONFLICT(package_name) DO UPDATE SET \
         name = excluded.name, \
         class_name = excluded.class_name, \
         category = excluded.category, \
         is_system_app = excluded.is_system_app, \
         install_time = excluded.install_time, \
         update_time = excluded.update_time, \
         version_name = excluded.version_name, \
         version_code = excluded.version_code";

/// Handle to the persistent app table
///
/// Cloning is cheap; clones share the connection and the change notifier.
#[derive(Clone)]
pub struct AppStore {
    conn: Arc<Mutex<Connection>>,
    notifier: Arc<ChangeNotifier>,
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("subscribers", &self.notifier.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl AppStore {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!(path = ?path, "Opening app store");
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            notifier: Arc::new(ChangeNotifier::new()),
        })
    }

    /// Subscribe to row changes
    pub fn subscribe(&self) -> std::sync::mpsc::Receiver<()> {
        self.notifier.subscribe()
    }

    /// All apps ordered by name
    pub fn list_all(&self) -> Result<Vec<AppRecord>> {
        self.query(&format!("SELECT {COLUMNS} FROM apps ORDER BY name ASC"), [])
    }

    /// Favorite apps, most recently used first
    pub fn list_favorites(&self) -> Result<Vec<AppRecord>> {
        self.query(
            &format!("SELECT {COLUMNS} FROM apps WHERE is_favorite = 1 ORDER BY last_used DESC"),
            [],
        )
    }

    /// Apps launched at least once, most recent first, at most `limit` rows
    pub fn list_recent(&self, limit: usize) -> Result<Vec<AppRecord>> {
        self.query(
            &format!(
                "SELECT {COLUMNS} FROM apps WHERE last_used > 0 ORDER BY last_used DESC LIMIT ?1"
            ),
            [sql_limit(limit)],
        )
    }

    /// Apps in one category ordered by name
    pub fn list_by_category(&self, category: &str) -> Result<Vec<AppRecord>> {
        self.query(
            &format!("SELECT {COLUMNS} FROM apps WHERE category = ?1 ORDER BY name ASC"),
            [category],
        )
    }

    /// Apps with the highest launch count
    pub fn list_most_used(&self, limit: usize) -> Result<Vec<AppRecord>> {
        self.query(
            &format!("SELECT {COLUMNS} FROM apps ORDER BY usage_count DESC LIMIT ?1"),
            [sql_limit(limit)],
        )
    }

    /// Distinct category names in ascending order
    pub fn list_distinct_categories(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM apps ORDER BY category ASC")?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(categories)
    }

    /// Row count per category, ordered by category name
    pub fn category_counts(&self) -> Result<Vec<(String, usize)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*) FROM apps GROUP BY category ORDER BY category ASC",
        )?;
        let counts = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get(0)?, usize::try_from(count).unwrap_or_default()))
            })?
            .collect::<rusqlite::Result<Vec<(String, usize)>>>()?;
        Ok(counts)
    }

    /// Match `pattern` with LIKE against name or package name
    ///
    /// The caller supplies the wildcards. Backslash is the escape character.
    pub fn search(&self, pattern: &str) -> Result<Vec<AppRecord>> {
        self.query(
            &format!(
                "SELECT {COLUMNS} FROM apps \
                 WHERE name LIKE ?1 ESCAPE '\\' OR package_name LIKE ?1 ESCAPE '\\' \
                 ORDER BY name ASC"
            ),
            [pattern],
        )
    }

    /// Look up one app
    pub fn get(&self, package_id: &str) -> Result<Option<AppRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM apps WHERE package_name = ?1"),
                [package_id],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Number of rows
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM apps", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Insert or fully replace one row
    pub fn upsert(&self, record: &AppRecord) -> Result<()> {
        {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare_cached(INSERT_OR_REPLACE)?;
            execute_record(&mut stmt, record)?;
        }
        self.notifier.notify();
        Ok(())
    }

    /// Insert or fully replace many rows in one transaction
    pub fn upsert_all(&self, records: &[AppRecord]) -> Result<()> {
        self.write_batch(INSERT_OR_REPLACE, records)?;
        debug!("Replaced {} app rows", records.len());
        Ok(())
    }

    /// Insert new rows; for existing rows update metadata but keep favorite and usage fields
    pub fn upsert_all_preserving_usage(&self, records: &[AppRecord]) -> Result<()> {
        self.write_batch(UPSERT_PRESERVING_USAGE, records)?;
        debug!("Merged {} app rows", records.len());
        Ok(())
    }

    /// Overwrite every column of an existing row; returns whether a row matched
    pub fn update(&self, record: &AppRecord) -> Result<bool> {
        let changed = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare_cached(
                "UPDATE apps SET name = ?2, class_name = ?3, category = ?4, is_favorite = ?5, \
                 is_system_app = ?6, install_time = ?7, update_time = ?8, last_used = ?9, \
                 usage_count = ?10, version_name = ?11, version_code = ?12 \
                 WHERE package_name = ?1",
            )?;
            execute_record(&mut stmt, record)?
        };
        Ok(self.notify_if_changed(changed))
    }

    /// Set the favorite flag; returns whether a row matched
    pub fn set_favorite(&self, package_id: &str, is_favorite: bool) -> Result<bool> {
        let changed = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE apps SET is_favorite = ?2 WHERE package_name = ?1",
                params![package_id, is_favorite],
            )?
        };
        Ok(self.notify_if_changed(changed))
    }

    /// Flip the favorite flag in a single statement
    ///
    /// Returns the new value, or `None` if the package is not stored.
    pub fn toggle_favorite(&self, package_id: &str) -> Result<Option<bool>> {
        let value = {
            let conn = self.conn.lock();
            conn.query_row(
                "UPDATE apps SET is_favorite = NOT is_favorite WHERE package_name = ?1 \
                 RETURNING is_favorite",
                [package_id],
                |row| row.get::<_, bool>(0),
            )
            .optional()?
        };
        if value.is_some() {
            self.notifier.notify();
        }
        Ok(value)
    }

    /// Increment the usage counter and set the last-used time
    pub fn record_usage(&self, package_id: &str, timestamp: i64) -> Result<bool> {
        let changed = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE apps SET last_used = ?2, usage_count = usage_count + 1 \
                 WHERE package_name = ?1",
                params![package_id, timestamp],
            )?
        };
        Ok(self.notify_if_changed(changed))
    }

    /// Delete one row; returns whether it existed
    pub fn delete(&self, package_id: &str) -> Result<bool> {
        let changed = {
            let conn = self.conn.lock();
            conn.execute("DELETE FROM apps WHERE package_name = ?1", [package_id])?
        };
        Ok(self.notify_if_changed(changed))
    }

    /// Delete every system app; returns the number of rows removed
    pub fn delete_all_system_apps(&self) -> Result<usize> {
        let changed = {
            let conn = self.conn.lock();
            conn.execute("DELETE FROM apps WHERE is_system_app = 1", [])?
        };
        self.notify_if_changed(changed);
        Ok(changed)
    }

    /// Live view of [`Self::list_all`]
    pub fn watch_all(&self) -> LiveQuery<Vec<AppRecord>> {
        let store = self.clone();
        LiveQuery::new(self.subscribe(), move || store.list_all())
    }

    /// Live view of [`Self::list_favorites`]
    pub fn watch_favorites(&self) -> LiveQuery<Vec<AppRecord>> {
        let store = self.clone();
        LiveQuery::new(self.subscribe(), move || store.list_favorites())
    }

    /// Live view of [`Self::list_recent`]
    pub fn watch_recent(&self, limit: usize) -> LiveQuery<Vec<AppRecord>> {
        let store = self.clone();
        LiveQuery::new(self.subscribe(), move || store.list_recent(limit))
    }

    /// Live view of [`Self::list_by_category`]
    pub fn watch_by_category(&self, category: impl Into<String>) -> LiveQuery<Vec<AppRecord>> {
        let store = self.clone();
        let category = category.into();
        LiveQuery::new(self.subscribe(), move || store.list_by_category(&category))
    }

    /// Live view of [`Self::list_distinct_categories`]
    pub fn watch_distinct_categories(&self) -> LiveQuery<Vec<String>> {
        let store = self.clone();
        LiveQuery::new(self.subscribe(), move || store.list_distinct_categories())
    }

    /// Live view of [`Self::category_counts`]
    pub fn watch_category_counts(&self) -> LiveQuery<Vec<(String, usize)>> {
        let store = self.clone();
        LiveQuery::new(self.subscribe(), move || store.category_counts())
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<AppRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(sql)?;
        let records = stmt
            .query_map(params, row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn write_batch(&self, sql: &str, records: &[AppRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        {
            let mut conn = self.conn.lock();
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(sql)?;
                for record in records {
                    execute_record(&mut stmt, record)?;
                }
            }
            tx.commit()?;
        }
        self.notifier.notify();
        Ok(())
    }

    fn notify_if_changed(&self, changed: usize) -> bool {
        if changed > 0 {
            self.notifier.notify();
        }
        changed > 0
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn execute_record(stmt: &mut Statement<'_>, record: &AppRecord) -> rusqlite::Result<usize> {
    stmt.execute(params![
        record.package_id,
        record.display_name,
        record.entry_point_class,
        record.category,
        record.is_favorite,
        record.is_system_app,
        record.install_timestamp,
        record.update_timestamp,
        record.last_used_timestamp,
        record.usage_count,
        record.version_name,
        record.version_code,
    ])
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<AppRecord> {
    Ok(AppRecord {
        package_id: row.get("package_name")?,
        display_name: row.get("name")?,
        entry_point_class: row.get("class_name")?,
        category: row.get("category")?,
        is_favorite: row.get("is_favorite")?,
        is_system_app: row.get("is_system_app")?,
        install_timestamp: row.get("install_time")?,
        update_timestamp: row.get("update_time")?,
        last_used_timestamp: row.get("last_used")?,
        usage_count: row.get("usage_count")?,
        version_name: row.get("version_name")?,
        version_code: row.get("version_code")?,
    })
}

//! Durable preference store
//!
//! The whole bag lives in one JSON object file. Every edit is a
//! read-modify-write under the store mutex followed by an atomic replace of
//! the file (temp file in the same directory, then rename), so readers never
//! see a half-written file and concurrent edits never lose each other.

use crate::error::{LauncherError, Result};
use crate::observe::{ChangeNotifier, LiveQuery};
use crate::preferences::keys::Preferences;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

struct Inner {
    path: Option<PathBuf>,
    current: Mutex<Preferences>,
    notifier: ChangeNotifier,
}

/// Key-value store for user-facing settings
///
/// Cloning is cheap; clones share the same file, state, and subscribers.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Open the store backed by `path`
    ///
    /// A missing file is an empty bag. A corrupt file is logged and also read
    /// as an empty bag; it is overwritten by the next edit.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = Self::load(&path)?;
        info!(path = ?path, keys = current.len(), "Preference store opened");
        Ok(Self::build(Some(path), current))
    }

    /// Store that lives only in memory
    pub fn open_in_memory() -> Self {
        Self::build(None, Preferences::new())
    }

    fn build(path: Option<PathBuf>, current: Preferences) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                current: Mutex::new(current),
                notifier: ChangeNotifier::new(),
            }),
        }
    }

    fn load(path: &Path) -> Result<Preferences> {
        if !path.exists() {
            debug!("Preference file not found, starting empty");
            return Ok(Preferences::new());
        }

        let json = std::fs::read_to_string(path)?;
        match serde_json::from_str::<BTreeMap<String, Value>>(&json) {
            Ok(values) => Ok(Preferences::from_map(values)),
            Err(e) => {
                warn!("Failed to parse preferences, using defaults: {}", e);
                Ok(Preferences::new())
            }
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Preferences {
        self.inner.current.lock().clone()
    }

    /// Atomically apply `edit` and persist the result
    ///
    /// If persisting fails the in-memory state is left unchanged.
    pub fn edit<F>(&self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Preferences),
    {
        {
            let mut current = self.inner.current.lock();
            let mut next = current.clone();
            edit(&mut next);
            if next == *current {
                return Ok(());
            }
            if let Some(path) = &self.inner.path {
                persist(path, &next)?;
            }
            *current = next;
        }
        self.inner.notifier.notify();
        Ok(())
    }

    /// Live view of the whole bag, re-emitted after every effective edit
    pub fn watch(&self) -> LiveQuery<Preferences> {
        let store = self.clone();
        LiveQuery::new(self.inner.notifier.subscribe(), move || Ok(store.snapshot()))
    }
}

fn persist(path: &Path, prefs: &Preferences) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let json = serde_json::to_vec_pretty(prefs.as_map())?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| LauncherError::Preferences(Box::new(e)))?;
    Ok(())
}

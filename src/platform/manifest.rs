//! JSON manifest package catalog
//!
//! The parsed manifest is cached and re-read only when the file's
//! modification time changes, so edits show up on the next refresh. Icon
//! paths are resolved relative to the manifest's directory.
//!
//! ```json
//! {
//!   "packages": [
//!     {
//!       "package": "com.example.player",
//!       "label": "Player",
//!       "activity": "com.example.player.MainActivity",
//!       "system": false,
//!       "first_install_time": 1700000000000,
//!       "last_update_time": 1700000500000,
//!       "version_name": "2.1.0",
//!       "version_code": 210,
//!       "icon": "icons/player.png",
//!       "launch": ["/usr/bin/player", "--fullscreen"]
//!     }
//!   ]
//! }
//! ```

use crate::error::{LauncherError, Result, StringError};
use crate::platform::{Icon, LaunchableActivity, PackageCatalog, PackageInfo};
use image::ImageReader;
use image::imageops::FilterType;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Edge length icons are scaled to for the app card
pub const ICON_SIZE: u32 = 128;

/// One installed package as described in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Package identifier
    pub package: String,
    /// User-visible label
    pub label: String,
    /// Entry point class; entries with `launcher = false` are not launchable
    #[serde(default)]
    pub activity: Option<String>,
    /// Whether the package declares a launcher entry point
    #[serde(default = "default_true")]
    pub launcher: bool,
    /// Preinstalled system package
    #[serde(default)]
    pub system: bool,
    /// First install time, milliseconds since the Unix epoch
    #[serde(default)]
    pub first_install_time: Option<i64>,
    /// Last update time, milliseconds since the Unix epoch
    #[serde(default)]
    pub last_update_time: Option<i64>,
    /// Human-readable version
    #[serde(default)]
    pub version_name: Option<String>,
    /// Monotonic version number
    #[serde(default)]
    pub version_code: Option<i64>,
    /// Icon image path, relative to the manifest
    #[serde(default)]
    pub icon: Option<PathBuf>,
    /// Program and arguments that start the package
    #[serde(default)]
    pub launch: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Manifest file layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Installed packages
    #[serde(default)]
    pub packages: Vec<ManifestEntry>,
}

/// Parsed manifest, valid for one file modification time
#[derive(Debug)]
struct CachedManifest {
    modified: SystemTime,
    manifest: Arc<Manifest>,
}

/// Package catalog backed by a JSON manifest file
#[derive(Debug)]
pub struct ManifestCatalog {
    path: PathBuf,
    cache: Mutex<Option<CachedManifest>>,
}

impl ManifestCatalog {
    /// Catalog reading the manifest at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Manifest location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed manifest, re-read from disk only when the file has changed
    pub fn read_manifest(&self) -> Result<Arc<Manifest>> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| {
                warn!(path = ?self.path, "Failed to stat package manifest: {}", e);
                LauncherError::Platform(Box::new(e))
            })?;

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref()
            && cached.modified == modified
        {
            return Ok(Arc::clone(&cached.manifest));
        }

        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            warn!(path = ?self.path, "Failed to read package manifest: {}", e);
            LauncherError::Platform(Box::new(e))
        })?;
        let manifest: Arc<Manifest> = Arc::new(
            serde_json::from_str(&json).map_err(|e| LauncherError::Platform(Box::new(e)))?,
        );
        debug!(path = ?self.path, "Parsed package manifest");

        *cache = Some(CachedManifest {
            modified,
            manifest: Arc::clone(&manifest),
        });
        Ok(manifest)
    }

    fn entry(&self, package_id: &str) -> Result<ManifestEntry> {
        self.read_manifest()?
            .packages
            .iter()
            .find(|entry| entry.package == package_id)
            .cloned()
            .ok_or_else(|| LauncherError::PackageNotFound(package_id.to_string()))
    }

    fn resolve(&self, relative: &Path) -> PathBuf {
        match self.path.parent() {
            Some(dir) if relative.is_relative() => dir.join(relative),
            _ => relative.to_path_buf(),
        }
    }
}

impl PackageCatalog for ManifestCatalog {
    fn launchable_activities(&self) -> Result<Vec<LaunchableActivity>> {
        let manifest = self.read_manifest()?;
        let activities: Vec<_> = manifest
            .packages
            .iter()
            .filter(|entry| entry.launcher)
            .map(|entry| LaunchableActivity {
                package_id: entry.package.clone(),
                label: entry.label.clone(),
                class_name: entry.activity.clone(),
                is_system_app: entry.system,
            })
            .collect();
        debug!("Manifest lists {} launchable activities", activities.len());
        Ok(activities)
    }

    fn package_info(&self, package_id: &str) -> Result<PackageInfo> {
        let entry = self.entry(package_id)?;
        Ok(PackageInfo {
            first_install_time: entry.first_install_time,
            last_update_time: entry.last_update_time,
            version_name: entry.version_name,
            version_code: entry.version_code,
        })
    }

    fn load_icon(&self, package_id: &str) -> Result<Icon> {
        let entry = self.entry(package_id)?;
        let relative = entry.icon.ok_or_else(|| LauncherError::IconLoad {
            package: package_id.to_string(),
            source: StringError::new("no icon declared"),
        })?;
        decode_icon(package_id, &self.resolve(&relative))
    }

    fn launch(&self, package_id: &str) -> Result<()> {
        let entry = self.entry(package_id)?;
        let Some((program, args)) = entry.launch.split_first() else {
            return Err(LauncherError::LaunchFailed {
                package: package_id.to_string(),
                reason: "no launch command declared".to_string(),
            });
        };

        let child = Command::new(program)
            .args(args)
            .spawn()
            .map_err(|e| LauncherError::LaunchFailed {
                package: package_id.to_string(),
                reason: e.to_string(),
            })?;
        info!(package = package_id, pid = child.id(), "Launched package");
        reap(package_id, child);
        Ok(())
    }
}

/// Wait for a launched process on a detached thread so it never lingers as a zombie
fn reap(package_id: &str, mut child: Child) {
    let package = package_id.to_string();
    let spawned = std::thread::Builder::new()
        .name(format!("reap-{}", child.id()))
        .spawn(move || match child.wait() {
            Ok(status) => debug!(package = %package, %status, "Launched package exited"),
            Err(e) => warn!(package = %package, "Failed to wait for launched package: {}", e),
        });
    if let Err(e) = spawned {
        warn!(package = package_id, "Failed to start reaper thread: {}", e);
    }
}

/// Decode an image file and scale it to `ICON_SIZE` square RGBA
fn decode_icon(package_id: &str, path: &Path) -> Result<Icon> {
    let icon_error = |source: Box<dyn std::error::Error + Send + Sync>| LauncherError::IconLoad {
        package: package_id.to_string(),
        source,
    };

    let img = ImageReader::open(path)
        .map_err(|e| icon_error(Box::new(e)))?
        .with_guessed_format()
        .map_err(|e| icon_error(Box::new(e)))?
        .decode()
        .map_err(|e| icon_error(Box::new(e)))?;

    let rgba = img
        .resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Lanczos3)
        .to_rgba8();
    Ok(Icon {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

//! In-memory package catalog
//!
//! Holds installed packages in a map that can be changed at runtime. Each
//! query can be made to fail on its own, which is how fail-soft handling of
//! partial platform answers is exercised.

use crate::error::{LauncherError, Result, StringError};
use crate::platform::{Icon, LaunchableActivity, PackageCatalog, PackageInfo};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Package {
    activity: LaunchableActivity,
    info: Option<PackageInfo>,
    icon: Option<Icon>,
    launchable: bool,
}

/// Package catalog backed by a mutable in-memory map
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    packages: RwLock<BTreeMap<String, Package>>,
    listing_error: RwLock<Option<String>>,
    launches: Mutex<Vec<String>>,
}

impl MemoryCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a package with launcher entry point `activity`
    ///
    /// Metadata lookups for it fail until [`set_info`](Self::set_info) is called.
    pub fn install(&self, activity: LaunchableActivity) {
        let package = Package {
            activity,
            info: None,
            icon: None,
            launchable: true,
        };
        self.packages
            .write()
            .insert(package.activity.package_id.clone(), package);
    }

    /// Remove a package
    pub fn uninstall(&self, package_id: &str) -> bool {
        self.packages.write().remove(package_id).is_some()
    }

    /// Set the install metadata answer for a package
    pub fn set_info(&self, package_id: &str, info: PackageInfo) {
        if let Some(package) = self.packages.write().get_mut(package_id) {
            package.info = Some(info);
        }
    }

    /// Set the icon for a package
    pub fn set_icon(&self, package_id: &str, icon: Icon) {
        if let Some(package) = self.packages.write().get_mut(package_id) {
            package.icon = Some(icon);
        }
    }

    /// Make `launch` fail for a package
    pub fn set_launchable(&self, package_id: &str, launchable: bool) {
        if let Some(package) = self.packages.write().get_mut(package_id) {
            package.launchable = launchable;
        }
    }

    /// Make `launchable_activities` fail with `message`, or succeed again with `None`
    pub fn set_listing_error(&self, message: Option<&str>) {
        *self.listing_error.write() = message.map(str::to_string);
    }

    /// Packages launched so far, in order
    pub fn launches(&self) -> Vec<String> {
        self.launches.lock().clone()
    }

    fn with_package<T>(&self, package_id: &str, f: impl FnOnce(&Package) -> Result<T>) -> Result<T> {
        let packages = self.packages.read();
        let package = packages
            .get(package_id)
            .ok_or_else(|| LauncherError::PackageNotFound(package_id.to_string()))?;
        f(package)
    }
}

impl PackageCatalog for MemoryCatalog {
    fn launchable_activities(&self) -> Result<Vec<LaunchableActivity>> {
        if let Some(message) = self.listing_error.read().as_deref() {
            return Err(LauncherError::Platform(StringError::new(message)));
        }
        Ok(self
            .packages
            .read()
            .values()
            .map(|package| package.activity.clone())
            .collect())
    }

    fn package_info(&self, package_id: &str) -> Result<PackageInfo> {
        self.with_package(package_id, |package| {
            package.info.clone().ok_or_else(|| {
                LauncherError::Platform(StringError::new(format!(
                    "no package info for {package_id}"
                )))
            })
        })
    }

    fn load_icon(&self, package_id: &str) -> Result<Icon> {
        self.with_package(package_id, |package| {
            package.icon.clone().ok_or_else(|| LauncherError::IconLoad {
                package: package_id.to_string(),
                source: StringError::new("no icon"),
            })
        })
    }

    fn launch(&self, package_id: &str) -> Result<()> {
        self.with_package(package_id, |package| {
            if package.launchable {
                Ok(())
            } else {
                Err(LauncherError::LaunchFailed {
                    package: package_id.to_string(),
                    reason: "no launch intent".to_string(),
                })
            }
        })?;
        self.launches.lock().push(package_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(package_id: &str) -> LaunchableActivity {
        LaunchableActivity {
            package_id: package_id.to_string(),
            label: package_id.to_string(),
            class_name: None,
            is_system_app: false,
        }
    }

    #[test]
    fn installed_packages_are_listed() {
        let catalog = MemoryCatalog::new();
        catalog.install(activity("com.b"));
        catalog.install(activity("com.a"));
        let ids: Vec<_> = catalog
            .launchable_activities()
            .unwrap()
            .into_iter()
            .map(|a| a.package_id)
            .collect();
        assert_eq!(ids, ["com.a", "com.b"]);

        assert!(catalog.uninstall("com.a"));
        assert_eq!(catalog.launchable_activities().unwrap().len(), 1);
    }

    #[test]
    fn queries_fail_independently() {
        let catalog = MemoryCatalog::new();
        catalog.install(activity("com.a"));

        assert!(catalog.package_info("com.a").is_err());
        assert!(catalog.load_icon("com.a").is_err());
        assert!(catalog.launchable_activities().is_ok());

        catalog.set_listing_error(Some("registry offline"));
        assert!(matches!(
            catalog.launchable_activities(),
            Err(LauncherError::Platform(_))
        ));
        catalog.set_listing_error(None);
        assert!(catalog.launchable_activities().is_ok());
    }

    #[test]
    fn launches_are_recorded() {
        let catalog = MemoryCatalog::new();
        catalog.install(activity("com.a"));
        catalog.install(activity("com.b"));
        catalog.set_launchable("com.b", false);

        catalog.launch("com.a").unwrap();
        assert!(catalog.launch("com.b").is_err());
        assert!(matches!(
            catalog.launch("com.missing"),
            Err(LauncherError::PackageNotFound(_))
        ));
        assert_eq!(catalog.launches(), ["com.a"]);
    }
}

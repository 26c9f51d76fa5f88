//! Platform package registry
//!
//! The launcher never talks to the OS package manager directly. It goes
//! through [`PackageCatalog`], which answers four independently failable
//! questions: which apps advertise a launcher entry point, what the install
//! metadata of a package is, what its icon looks like, and how to start it.
//!
//! Two implementations ship with the crate: [`ManifestCatalog`] reads a JSON
//! manifest of installed packages and backs the binary, and
//! [`MemoryCatalog`] keeps packages in a map that can be changed at runtime.

pub mod manifest;
pub mod memory;

pub use manifest::ManifestCatalog;
pub use memory::MemoryCatalog;

use crate::error::Result;
use std::fmt;

/// An activity that declares itself a home-screen entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchableActivity {
    /// Package identifier
    pub package_id: String,
    /// User-visible label
    pub label: String,
    /// Entry point class name
    pub class_name: Option<String>,
    /// Preinstalled system package
    pub is_system_app: bool,
}

/// Install metadata for a package
///
/// Each field is optional on its own so a partial answer from the platform
/// still fills in what it can.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    /// First install time, milliseconds since the Unix epoch
    pub first_install_time: Option<i64>,
    /// Last update time, milliseconds since the Unix epoch
    pub last_update_time: Option<i64>,
    /// Human-readable version
    pub version_name: Option<String>,
    /// Monotonic version number
    pub version_code: Option<i64>,
}

/// Decoded launcher icon, RGBA8
#[derive(Clone, PartialEq, Eq)]
pub struct Icon {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA pixels, `width * height * 4` bytes
    pub rgba: Vec<u8>,
}

impl fmt::Debug for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Icon")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Read access to the installed-application registry plus the launch action
pub trait PackageCatalog: Send + Sync {
    /// Every activity that advertises a launcher entry point
    fn launchable_activities(&self) -> Result<Vec<LaunchableActivity>>;

    /// Install and version metadata for one package
    fn package_info(&self, package_id: &str) -> Result<PackageInfo>;

    /// Icon for one package
    fn load_icon(&self, package_id: &str) -> Result<Icon>;

    /// Start the package's launcher entry point
    fn launch(&self, package_id: &str) -> Result<()>;
}

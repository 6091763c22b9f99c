//! Default manifest locations.
//!
//! Both can be overridden through the environment so the tools work against
//! a pulled copy of `/data/system` on a development host.

use std::path::{Path, PathBuf};

/// Environment override for the markup manifest.
pub const PACKAGES_XML_ENV: &str = "PKGDB_PACKAGES_XML";

/// Environment override for the line manifest.
pub const PACKAGES_LIST_ENV: &str = "PKGDB_PACKAGES_LIST";

/// On-device markup manifest.
pub const DEFAULT_PACKAGES_XML: &str = "/data/system/packages.xml";

/// On-device line manifest.
pub const DEFAULT_PACKAGES_LIST: &str = "/data/system/packages.list";

/// Present on every Android system image; its absence means "off-device".
pub const ANDROID_BUILD_PROP: &str = "/system/build.prop";

fn from_env(var: &str, default: &str) -> PathBuf {
    match std::env::var_os(var) {
        Some(val) if !val.is_empty() => PathBuf::from(val),
        _ => PathBuf::from(default),
    }
}

/// Markup manifest path: `$PKGDB_PACKAGES_XML` or `/data/system/packages.xml`
pub fn packages_xml() -> PathBuf {
    from_env(PACKAGES_XML_ENV, DEFAULT_PACKAGES_XML)
}

/// Line manifest path: `$PKGDB_PACKAGES_LIST` or `/data/system/packages.list`
pub fn packages_list() -> PathBuf {
    from_env(PACKAGES_LIST_ENV, DEFAULT_PACKAGES_LIST)
}

/// The two manifest paths a [`PackageDb`](crate::PackageDb) reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// `packages.xml`
    pub markup: PathBuf,
    /// `packages.list`
    pub list: PathBuf,
}

impl SourcePaths {
    /// Pair up explicit paths.
    pub fn new(markup: impl Into<PathBuf>, list: impl Into<PathBuf>) -> Self {
        Self {
            markup: markup.into(),
            list: list.into(),
        }
    }

    /// Both manifests inside one directory, under their on-device file names.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("packages.xml"), dir.join("packages.list"))
    }
}

impl Default for SourcePaths {
    /// Environment overrides, falling back to the on-device locations.
    fn default() -> Self {
        Self::new(packages_xml(), packages_list())
    }
}

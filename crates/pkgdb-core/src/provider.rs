//! Synthetic "self" entries.
//!
//! Off-device there is usually no `packages.xml` describing the running
//! process, so a debug build of a tool would see an empty registry. A
//! [`SelfEntryProvider`] is consulted once per rebuild and may contribute one
//! extra record. On a device the provider contributes nothing.

use std::fmt::Debug;
use std::path::PathBuf;

use pkgdb_schema::{OwnerId, PackageRecord};

use crate::paths::ANDROID_BUILD_PROP;

/// Name prefix of records synthesized for the calling process.
pub const CALLER_PREFIX: &str = "caller-uid-";

/// Source of an optional extra record, consulted once per rebuild.
pub trait SelfEntryProvider: Send + Sync + Debug {
    /// The record to add, if any. Only `name` and `owner_id` are expected to
    /// be populated.
    fn self_entry(&self) -> Option<PackageRecord>;
}

/// Never contributes a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelfEntry;

impl SelfEntryProvider for NoSelfEntry {
    fn self_entry(&self) -> Option<PackageRecord> {
        None
    }
}

/// Contributes `caller-uid-<uid>` for the real uid of this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerEntry;

impl CallerEntry {
    fn record(uid: u32) -> PackageRecord {
        PackageRecord::new(format!("{CALLER_PREFIX}{uid}"), OwnerId::new(uid))
    }
}

impl SelfEntryProvider for CallerEntry {
    fn self_entry(&self) -> Option<PackageRecord> {
        caller_uid().map(Self::record)
    }
}

#[cfg(unix)]
fn caller_uid() -> Option<u32> {
    Some(nix::unistd::getuid().as_raw())
}

#[cfg(not(unix))]
fn caller_uid() -> Option<u32> {
    None
}

/// [`CallerEntry`] on development hosts, nothing on a device.
///
/// A device is recognized by the presence of a marker file, checked on every
/// rebuild.
#[derive(Debug, Clone)]
pub struct HostSelfEntry {
    marker: PathBuf,
}

impl HostSelfEntry {
    /// Use a custom marker file.
    pub fn with_marker(marker: impl Into<PathBuf>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for HostSelfEntry {
    fn default() -> Self {
        Self::with_marker(ANDROID_BUILD_PROP)
    }
}

impl SelfEntryProvider for HostSelfEntry {
    fn self_entry(&self) -> Option<PackageRecord> {
        if self.marker.exists() {
            return None;
        }
        CallerEntry.self_entry()
    }
}

/// Always contributes a clone of the given record.
#[derive(Debug, Clone)]
pub struct FixedEntry(pub PackageRecord);

impl SelfEntryProvider for FixedEntry {
    fn self_entry(&self) -> Option<PackageRecord> {
        Some(self.0.clone())
    }
}

/// The provider used when none is given explicitly.
#[must_use]
pub fn default_provider() -> Box<dyn SelfEntryProvider> {
    if cfg!(unix) {
        Box::new(HostSelfEntry::default())
    } else {
        Box::new(NoSelfEntry)
    }
}

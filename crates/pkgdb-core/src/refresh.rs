//! Staleness detection for the two manifests.

use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::paths::SourcePaths;

/// Result of a refresh check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Nothing changed since the current snapshot (or since the last attempt).
    Fresh,
    /// A new snapshot was built and published.
    Rebuilt,
    /// A manifest could not be stat'ed; the current snapshot was kept.
    Unknown,
}

/// Modification times of both manifests, as observed at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStamps {
    /// mtime of the markup manifest
    pub markup: SystemTime,
    /// mtime of the line manifest
    pub list: SystemTime,
}

impl SourceStamps {
    /// Stat both manifests.
    ///
    /// # Errors
    ///
    /// The first stat failure, together with the path that caused it.
    pub fn read(paths: &SourcePaths) -> Result<Self, (&Path, io::Error)> {
        let markup = mtime(&paths.markup).map_err(|e| (paths.markup.as_path(), e))?;
        let list = mtime(&paths.list).map_err(|e| (paths.list.as_path(), e))?;
        Ok(Self { markup, list })
    }

    /// True if either manifest was modified strictly after `built_at`.
    pub fn newer_than(&self, built_at: SystemTime) -> bool {
        self.markup > built_at || self.list > built_at
    }

    /// Whether a rebuild should be attempted.
    ///
    /// A snapshot is stale when a manifest is newer than it, unless this
    /// exact pair of stamps was already consumed by an earlier attempt.
    pub fn needs_rebuild(&self, built_at: SystemTime, last_attempt: Option<SourceStamps>) -> bool {
        self.newer_than(built_at) && last_attempt != Some(*self)
    }
}

fn mtime(path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

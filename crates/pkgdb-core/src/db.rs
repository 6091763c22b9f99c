//! The registry handle.
//!
//! [`PackageDb`] owns the current [`Snapshot`] behind an [`ArcSwap`] and
//! rebuilds it from the manifests when they change. Readers never block on a
//! rebuild: they see either the previous snapshot or the new one. A failed
//! rebuild publishes nothing, so the last good snapshot keeps serving.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use pkgdb_schema::{OwnerId, PackageRecord};
use tracing::{debug, warn};

use crate::error::DbError;
use crate::manifest::{load_packages_list, load_packages_xml};
use crate::merge::merge;
use crate::options::DbOptions;
use crate::paths::SourcePaths;
use crate::provider::{SelfEntryProvider, default_provider};
use crate::refresh::{RefreshOutcome, SourceStamps};
use crate::registry::Snapshot;

/// Bookkeeping guarded by the rebuild lock.
#[derive(Debug, Default)]
struct RebuildState {
    /// Stamps consumed by the latest build or parse failure.
    last_attempt: Option<SourceStamps>,
    generation: u64,
}

/// A refreshing, queryable view of the installed packages.
#[derive(Debug)]
pub struct PackageDb {
    paths: SourcePaths,
    options: DbOptions,
    provider: Box<dyn SelfEntryProvider>,
    current: ArcSwap<Snapshot>,
    rebuild: Mutex<RebuildState>,
    closed: AtomicBool,
}

impl PackageDb {
    /// Open the registry over `markup` (`packages.xml`) and `list`
    /// (`packages.list`) with default options and the default self-entry
    /// provider.
    ///
    /// # Errors
    ///
    /// The IO or parse error of the initial build.
    pub fn open(
        markup: impl Into<std::path::PathBuf>,
        list: impl Into<std::path::PathBuf>,
    ) -> Result<Self, DbError> {
        Self::open_with(
            SourcePaths::new(markup, list),
            DbOptions::default(),
            default_provider(),
        )
    }

    /// Open with explicit options and self-entry provider.
    ///
    /// # Errors
    ///
    /// The IO or parse error of the initial build.
    pub fn open_with(
        paths: SourcePaths,
        options: DbOptions,
        provider: Box<dyn SelfEntryProvider>,
    ) -> Result<Self, DbError> {
        let db = Self {
            paths,
            options,
            provider,
            current: ArcSwap::from_pointee(Snapshot::empty(SystemTime::UNIX_EPOCH, 0)),
            rebuild: Mutex::new(RebuildState::default()),
            closed: AtomicBool::new(false),
        };
        {
            let mut state = db.rebuild.lock();
            let stamps = SourceStamps::read(&db.paths).ok();
            db.rebuild_locked(&mut state, stamps)?;
        }
        Ok(db)
    }

    /// The manifests this handle reads.
    pub fn paths(&self) -> &SourcePaths {
        &self.paths
    }

    /// The options this handle was opened with.
    pub fn options(&self) -> DbOptions {
        self.options
    }

    /// Exact, case-sensitive lookup by package name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<PackageRecord>> {
        self.snapshot().get_by_name(name).cloned()
    }

    /// Every package running under `owner`, ordered by name.
    pub fn get_all_by_owner_id(&self, owner: OwnerId) -> Vec<Arc<PackageRecord>> {
        self.snapshot().get_all_by_owner_id(owner).to_vec()
    }

    /// The package with the smallest name among those running under `owner`.
    pub fn get_first_by_owner_id(&self, owner: OwnerId) -> Option<Arc<PackageRecord>> {
        self.snapshot().get_first_by_owner_id(owner).cloned()
    }

    /// When the current snapshot's manifests were read. Does not refresh.
    pub fn last_update(&self) -> SystemTime {
        self.current.load().built_at()
    }

    /// The current snapshot, refreshed first if the manifests changed.
    ///
    /// A failed refresh is logged and the previous snapshot is returned.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        if let Err(err) = self.refresh() {
            warn!(error = %err, "refresh failed, serving previous snapshot");
        }
        self.current.load_full()
    }

    /// Rebuild if either manifest changed since the current snapshot.
    ///
    /// Inaccessible manifests yield [`RefreshOutcome::Unknown`] and leave the
    /// snapshot alone. A pair of modification times that already failed to
    /// parse is not retried until one of the files changes again. A read
    /// failure is retried on the next call.
    ///
    /// # Errors
    ///
    /// The IO or parse error of a failed rebuild. The previous snapshot stays
    /// published.
    pub fn refresh(&self) -> Result<RefreshOutcome, DbError> {
        if self.is_closed() {
            return Ok(RefreshOutcome::Fresh);
        }
        let stamps = match SourceStamps::read(&self.paths) {
            Ok(stamps) => stamps,
            Err((path, err)) => {
                debug!(path = %path.display(), error = %err, "cannot stat manifest, keeping snapshot");
                return Ok(RefreshOutcome::Unknown);
            }
        };

        let mut state = self.rebuild.lock();
        // Re-check under the lock: another caller may have rebuilt meanwhile.
        if self.is_closed()
            || !stamps.needs_rebuild(self.current.load().built_at(), state.last_attempt)
        {
            return Ok(RefreshOutcome::Fresh);
        }
        self.rebuild_locked(&mut state, Some(stamps))?;
        Ok(RefreshOutcome::Rebuilt)
    }

    /// Rebuild unconditionally.
    ///
    /// # Errors
    ///
    /// The IO or parse error of the rebuild. The previous snapshot stays
    /// published. A closed handle is not rebuilt; its empty snapshot is
    /// returned instead.
    pub fn rebuild(&self) -> Result<Arc<Snapshot>, DbError> {
        let mut state = self.rebuild.lock();
        if self.is_closed() {
            return Ok(self.current.load_full());
        }
        let stamps = SourceStamps::read(&self.paths).ok();
        self.rebuild_locked(&mut state, stamps)
    }

    /// Drop the indices and stop refreshing. Idempotent.
    ///
    /// Lookups after close return nothing; [`last_update`](Self::last_update)
    /// keeps reporting the last build time.
    pub fn close(&self) {
        let _state = self.rebuild.lock();
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let cur = self.current.load();
        self.current
            .store(Arc::new(Snapshot::empty(cur.built_at(), cur.generation())));
        debug!("package db closed");
    }

    /// True after [`close`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn rebuild_locked(
        &self,
        state: &mut RebuildState,
        stamps: Option<SourceStamps>,
    ) -> Result<Arc<Snapshot>, DbError> {
        // Taken before reading so a write during the rebuild is seen as newer.
        let built_at = SystemTime::now();
        debug!(
            markup = %self.paths.markup.display(),
            list = %self.paths.list.display(),
            "rebuilding package db"
        );

        // A parse failure consumes the stamps; an I/O failure is retried.
        let merged = match self.load_merged() {
            Ok(merged) => merged,
            Err(e) => {
                if e.is_parse() {
                    state.last_attempt = stamps;
                }
                return Err(e);
            }
        };
        state.last_attempt = stamps;
        let self_entry = self.provider.self_entry();

        let generation = state.generation + 1;
        let snapshot = Arc::new(Snapshot::build(merged, self_entry, built_at, generation));
        self.current.store(Arc::clone(&snapshot));
        state.generation = generation;

        debug!(
            records = snapshot.len(),
            owners = snapshot.owners().count(),
            generation,
            "published package db snapshot"
        );
        Ok(snapshot)
    }

    fn load_merged(&self) -> Result<Vec<PackageRecord>, DbError> {
        let lines = load_packages_list(&self.paths.list)?;
        let markup = load_packages_xml(&self.paths.markup, self.options.certificates)?;
        Ok(merge(markup, lines, self.options.orphans))
    }
}

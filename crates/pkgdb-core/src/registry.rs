//! Immutable, dual-keyed registry snapshot.
//!
//! A [`Snapshot`] is built once from a merged record set and never mutated.
//! The handle in [`crate::db`] replaces it wholesale on every rebuild.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::SystemTime;

use pkgdb_schema::{OwnerId, PackageName, PackageRecord};
use tracing::warn;

/// One complete build of the registry indices.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// All records, ordered by name.
    records: Vec<Arc<PackageRecord>>,
    by_name: HashMap<PackageName, Arc<PackageRecord>>,
    by_owner: BTreeMap<OwnerId, Vec<Arc<PackageRecord>>>,
    built_at: SystemTime,
    generation: u64,
}

impl Snapshot {
    /// Index `records`, plus an optional synthetic self entry.
    ///
    /// Names must be unique; a later duplicate replaces the earlier record
    /// (the merger never produces one). A self entry whose name is already
    /// taken is dropped. Owner buckets are sorted by name.
    #[must_use]
    pub fn build(
        records: Vec<PackageRecord>,
        self_entry: Option<PackageRecord>,
        built_at: SystemTime,
        generation: u64,
    ) -> Self {
        let mut by_name: HashMap<PackageName, Arc<PackageRecord>> =
            HashMap::with_capacity(records.len() + 1);
        for record in records {
            by_name.insert(record.name.clone(), Arc::new(record));
        }

        if let Some(entry) = self_entry {
            if by_name.contains_key(&entry.name) {
                warn!(package = %entry.name, "self entry collides with a real package, dropping it");
            } else {
                by_name.insert(entry.name.clone(), Arc::new(entry));
            }
        }

        let mut records: Vec<Arc<PackageRecord>> = by_name.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        // Filled in name order, so every bucket is sorted by name.
        let mut by_owner: BTreeMap<OwnerId, Vec<Arc<PackageRecord>>> = BTreeMap::new();
        for record in &records {
            by_owner
                .entry(record.owner_id)
                .or_default()
                .push(Arc::clone(record));
        }

        Self {
            records,
            by_name,
            by_owner,
            built_at,
            generation,
        }
    }

    /// A snapshot with no records.
    #[must_use]
    pub fn empty(built_at: SystemTime, generation: u64) -> Self {
        Self {
            records: Vec::new(),
            by_name: HashMap::new(),
            by_owner: BTreeMap::new(),
            built_at,
            generation,
        }
    }

    /// Exact, case-sensitive name lookup.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<PackageRecord>> {
        self.by_name.get(name)
    }

    /// Every record sharing `owner`, ordered by name. Empty if none.
    #[must_use]
    pub fn get_all_by_owner_id(&self, owner: OwnerId) -> &[Arc<PackageRecord>] {
        self.by_owner.get(&owner).map(Vec::as_slice).unwrap_or_default()
    }

    /// The record with the smallest name among those sharing `owner`.
    #[must_use]
    pub fn get_first_by_owner_id(&self, owner: OwnerId) -> Option<&Arc<PackageRecord>> {
        self.get_all_by_owner_id(owner).first()
    }

    /// When the manifests behind this snapshot were read.
    #[must_use]
    pub fn built_at(&self) -> SystemTime {
        self.built_at
    }

    /// Publication counter, starting at 1 for the first build.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, ordered by name.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<PackageRecord>> {
        self.records.iter()
    }

    /// Owner-id buckets in ascending owner order.
    pub fn owners(&self) -> impl Iterator<Item = (OwnerId, &[Arc<PackageRecord>])> {
        self.by_owner.iter().map(|(id, bucket)| (*id, bucket.as_slice()))
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Arc<PackageRecord>;
    type IntoIter = std::slice::Iter<'a, Arc<PackageRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//! Reconcile the two manifests into one record per package.
//!
//! The markup manifest is canonical for identity and owner id. Line-manifest
//! entries only overlay the fields that manifest owns (data path, security
//! label, group ids) onto the markup record of the same name.

use std::collections::BTreeMap;

use pkgdb_schema::{PackageName, PackageRecord};
use tracing::{debug, warn};

use crate::options::OrphanPolicy;

/// Merge parsed markup and line records.
///
/// All markup records are indexed before any overlay happens, so the result
/// does not depend on line order (except that a name listed twice in the
/// line manifest keeps its last line). Line entries without a markup
/// identity follow `orphans`. The output is sorted by name.
pub fn merge(
    markup: Vec<PackageRecord>,
    lines: Vec<PackageRecord>,
    orphans: OrphanPolicy,
) -> Vec<PackageRecord> {
    let mut by_name: BTreeMap<PackageName, PackageRecord> = BTreeMap::new();

    for record in markup {
        if let Some(prev) = by_name.insert(record.name.clone(), record) {
            warn!(package = %prev.name, "duplicate markup record, keeping the later one");
        }
    }

    let mut admitted = 0usize;
    let mut skipped = 0usize;
    for line in lines {
        if let Some(existing) = by_name.get_mut(&line.name) {
            existing.data_path = line.data_path;
            existing.security_label = line.security_label;
            existing.group_ids = line.group_ids;
            continue;
        }
        match orphans {
            OrphanPolicy::Admit => {
                debug!(package = %line.name, "admitting line-only package");
                admitted += 1;
                by_name.insert(line.name.clone(), line);
            }
            OrphanPolicy::Skip => {
                warn!(package = %line.name, "skipping line-only package");
                skipped += 1;
            }
        }
    }

    debug!(total = by_name.len(), admitted, skipped, "merged manifests");
    by_name.into_values().collect()
}

//! Installed-package registry built from `packages.xml` and `packages.list`.
//!
//! The two manifests are parsed ([`manifest`]), reconciled ([`merge`]) and
//! indexed into an immutable [`Snapshot`] by name and by owner id. A
//! [`PackageDb`] keeps that snapshot current, rebuilding it when either file
//! changes and keeping the last good one when a rebuild fails.
//!
//! ```no_run
//! use pkgdb_core::{OwnerId, PackageDb};
//!
//! let db = PackageDb::open("/data/system/packages.xml", "/data/system/packages.list")?;
//! if let Some(pkg) = db.get_first_by_owner_id(OwnerId::new(10050)) {
//!     println!("{pkg}");
//! }
//! # Ok::<(), pkgdb_core::DbError>(())
//! ```

pub mod cert;
pub mod db;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod number;
pub mod options;
pub mod paths;
pub mod provider;
pub mod refresh;
pub mod registry;

pub use db::PackageDb;
pub use error::{CertificateError, DbError, ManifestError, ParseError};
pub use options::{CertificatePolicy, DbOptions, OrphanPolicy};
pub use paths::SourcePaths;
pub use provider::{
    CallerEntry, FixedEntry, HostSelfEntry, NoSelfEntry, SelfEntryProvider, default_provider,
};
pub use refresh::RefreshOutcome;
pub use registry::Snapshot;

pub use pkgdb_schema::{CertFingerprint, OwnerId, PackageName, PackageRecord, SigningCertificate};

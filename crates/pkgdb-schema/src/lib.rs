//! Shared record types for the installed-package registry.
//!
//! These are the values the core hands out to callers: package names,
//! owner ids, certificate fingerprints and the merged [`PackageRecord`].

pub mod hash;
pub mod record;
pub mod types;

// Re-exports
pub use hash::*;
pub use record::{PackageRecord, SigningCertificate};
pub use types::*;

/// Re-exported so callers can inspect certificates without naming the crate.
pub use x509_cert::Certificate;

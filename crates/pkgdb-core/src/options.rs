//! Policies that decide how the registry treats imperfect manifests.
//!
//! The defaults reproduce the historical behavior: line-only entries are
//! admitted and a single bad certificate fails the whole rebuild.

/// What to do with a line-manifest entry that has no markup-manifest identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanPolicy {
    /// Insert it as an independent record without install path or certificate.
    #[default]
    Admit,
    /// Drop it and log a warning.
    Skip,
}

/// What to do when a package's signing certificate cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificatePolicy {
    /// Fail the markup parse, aborting the rebuild.
    #[default]
    Strict,
    /// Keep the package with its certificate absent and log a warning.
    Lenient,
}

/// Knobs for a [`PackageDb`](crate::PackageDb).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DbOptions {
    /// Handling of line-only entries during the merge.
    pub orphans: OrphanPolicy,
    /// Handling of undecodable certificates.
    pub certificates: CertificatePolicy,
}

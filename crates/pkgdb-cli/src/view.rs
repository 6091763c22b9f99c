//! JSON shapes for `--json` output.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use pkgdb_core::Snapshot;
use pkgdb_schema::{PackageRecord, SigningCertificate};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PackageView<'a> {
    pub name: &'a str,
    pub uid: u32,
    pub gids: &'a [u32],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seinfo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateView>,
}

#[derive(Debug, Serialize)]
pub struct CertificateView {
    pub sha1: String,
    pub sha256: String,
    pub subject: String,
    pub issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    pub serial: String,
    pub not_before: String,
    pub not_after: String,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub packages_xml: String,
    pub packages_list: String,
    pub generation: u64,
    pub last_update: String,
    pub packages: usize,
    pub uids: usize,
}

pub fn timestamp(t: SystemTime) -> String {
    DateTime::<Utc>::from(t).to_rfc3339()
}

impl<'a> From<&'a PackageRecord> for PackageView<'a> {
    fn from(r: &'a PackageRecord) -> Self {
        Self {
            name: r.name.as_str(),
            uid: r.owner_id.get(),
            gids: &r.group_ids,
            data_path: r.data_path.as_ref().map(|p| p.display().to_string()),
            install_path: r.install_path.as_ref().map(|p| p.display().to_string()),
            seinfo: r.security_label.as_deref(),
            certificate: r.signer.as_ref().map(CertificateView::from),
        }
    }
}

impl From<&SigningCertificate> for CertificateView {
    fn from(c: &SigningCertificate) -> Self {
        Self {
            sha1: c.fingerprint().to_hex(),
            sha256: c.sha256().to_string(),
            subject: c.subject(),
            issuer: c.issuer(),
            common_name: c.common_name(),
            serial: c.serial_hex(),
            not_before: timestamp(c.not_before()),
            not_after: timestamp(c.not_after()),
        }
    }
}

impl StatusView {
    pub fn new(paths: &pkgdb_core::SourcePaths, snap: &Snapshot) -> Self {
        Self {
            packages_xml: paths.markup.display().to_string(),
            packages_list: paths.list.display().to_string(),
            generation: snap.generation(),
            last_update: timestamp(snap.built_at()),
            packages: snap.len(),
            uids: snap.owners().count(),
        }
    }
}

/// Serialize `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Package records as served by the registry.

use std::path::PathBuf;
use std::time::SystemTime;

use x509_cert::Certificate;
use x509_cert::der::Decode;
use x509_cert::der::Any;
use x509_cert::der::asn1::{Ia5StringRef, PrintableStringRef, TeletexStringRef, Utf8StringRef};
use x509_cert::der::oid::db::rfc4519::CN;

use crate::hash::{CertFingerprint, Sha256Digest};
use crate::types::{OwnerId, PackageName};

/// A decoded X.509 signing certificate together with its raw DER bytes and
/// the fingerprint of those bytes.
///
/// The only way to build one is [`SigningCertificate::from_der`], so a
/// certificate can never exist without its fingerprint (or the other way
/// round).
#[derive(Clone, PartialEq, Eq)]
pub struct SigningCertificate {
    certificate: Certificate,
    der: Vec<u8>,
    fingerprint: CertFingerprint,
}

impl SigningCertificate {
    /// Decode a DER-encoded certificate and fingerprint its bytes.
    ///
    /// # Errors
    ///
    /// Returns the DER error if `der` is not exactly one well-formed
    /// X.509 certificate (trailing bytes are rejected).
    pub fn from_der(der: Vec<u8>) -> Result<Self, x509_cert::der::Error> {
        let certificate = Certificate::from_der(&der)?;
        let fingerprint = CertFingerprint::compute(&der);
        Ok(Self {
            certificate,
            der,
            fingerprint,
        })
    }

    /// The decoded certificate.
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Raw DER bytes as found in the manifest.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// SHA-1 fingerprint of the raw DER bytes.
    pub fn fingerprint(&self) -> CertFingerprint {
        self.fingerprint
    }

    /// SHA-256 digest of the raw DER bytes.
    pub fn sha256(&self) -> Sha256Digest {
        Sha256Digest::compute(&self.der)
    }

    /// Subject distinguished name in RFC 4514 form.
    pub fn subject(&self) -> String {
        self.certificate.tbs_certificate.subject.to_string()
    }

    /// Issuer distinguished name in RFC 4514 form.
    pub fn issuer(&self) -> String {
        self.certificate.tbs_certificate.issuer.to_string()
    }

    /// First common name (CN) attribute of the subject, if it is a string.
    pub fn common_name(&self) -> Option<String> {
        self.certificate
            .tbs_certificate
            .subject
            .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .filter(|atv| atv.oid == CN)
            .find_map(|atv| directory_string(&atv.value))
    }

    /// Serial number as big-endian hex (leading zeros stripped).
    pub fn serial_hex(&self) -> String {
        hex::encode(self.certificate.tbs_certificate.serial_number.as_bytes())
    }

    /// Start of the validity window.
    pub fn not_before(&self) -> SystemTime {
        self.certificate
            .tbs_certificate
            .validity
            .not_before
            .to_system_time()
    }

    /// End of the validity window.
    pub fn not_after(&self) -> SystemTime {
        self.certificate
            .tbs_certificate
            .validity
            .not_after
            .to_system_time()
    }
}

impl std::fmt::Debug for SigningCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCertificate")
            .field("subject", &self.subject())
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// One installed package, merged from both manifests.
///
/// Fields that only one manifest carries are `None` (or empty) when that
/// manifest had no entry for the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Unique package name.
    pub name: PackageName,
    /// Owner id the package runs under (own or shared).
    pub owner_id: OwnerId,
    /// Supplementary group ids, in manifest order. Line manifest only.
    pub group_ids: Vec<u32>,
    /// Private data directory. Line manifest only.
    pub data_path: Option<PathBuf>,
    /// Install location of the code. Markup manifest only.
    pub install_path: Option<PathBuf>,
    /// Security label (seinfo). Line manifest only.
    pub security_label: Option<String>,
    /// Signing certificate, when the markup manifest carried one.
    pub signer: Option<SigningCertificate>,
}

impl PackageRecord {
    /// A record with only identity fields populated.
    pub fn new(name: impl Into<PackageName>, owner_id: OwnerId) -> Self {
        Self {
            name: name.into(),
            owner_id,
            group_ids: Vec::new(),
            data_path: None,
            install_path: None,
            security_label: None,
            signer: None,
        }
    }

    /// The decoded signing certificate, if any.
    pub fn certificate(&self) -> Option<&Certificate> {
        self.signer.as_ref().map(SigningCertificate::certificate)
    }

    /// Fingerprint of the signing certificate; present iff
    /// [`certificate`](Self::certificate) is.
    pub fn certificate_fingerprint(&self) -> Option<CertFingerprint> {
        self.signer.as_ref().map(SigningCertificate::fingerprint)
    }
}

impl std::fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.owner_id)?;
        if let Some(signer) = &self.signer {
            write!(
                f,
                " [SN/{}: hash/{}]",
                signer.common_name().unwrap_or_default(),
                signer.fingerprint()
            )?;
        }
        Ok(())
    }
}

/// Text of a CN value in any of the string types platform certificates use.
fn directory_string(value: &Any) -> Option<String> {
    if let Ok(s) = Utf8StringRef::try_from(value) {
        return Some(s.as_str().to_string());
    }
    if let Ok(s) = PrintableStringRef::try_from(value) {
        return Some(s.as_str().to_string());
    }
    if let Ok(s) = Ia5StringRef::try_from(value) {
        return Some(s.as_str().to_string());
    }
    TeletexStringRef::try_from(value)
        .ok()
        .map(|s| s.as_str().to_string())
}

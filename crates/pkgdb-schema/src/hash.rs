//! Certificate fingerprints and content digests.

use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};
use sha2::Sha256;

/// Length in bytes of a [`CertFingerprint`].
pub const FINGERPRINT_LEN: usize = 20;

/// SHA-1 digest over the raw DER bytes of a signing certificate.
///
/// This is the identity used to compare signers across packages without
/// re-parsing the certificate. Formats as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertFingerprint([u8; FINGERPRINT_LEN]);

/// Errors that can occur when parsing a [`CertFingerprint`] from text.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FingerprintError {
    /// The input is not exactly 40 hex characters.
    #[error("Invalid fingerprint: expected 40 hex chars, got {0}")]
    InvalidLength(usize),

    /// The input contains non-hex characters.
    #[error("Invalid fingerprint: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl CertFingerprint {
    /// Compute the fingerprint of raw certificate bytes.
    pub fn compute(data: &[u8]) -> Self {
        Self(Sha1::digest(data).into())
    }

    /// Wrap an already computed digest.
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::str::FromStr for CertFingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_LEN * 2 {
            return Err(FingerprintError::InvalidLength(s.len()));
        }
        let mut out = [0u8; FINGERPRINT_LEN];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Self(out))
    }
}

impl std::fmt::LowerHex for CertFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl std::fmt::Display for CertFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:x}")
    }
}

impl std::fmt::Debug for CertFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CertFingerprint({self:x})")
    }
}

impl Serialize for CertFingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A SHA256 digest (64 lowercase hex characters).
///
/// Shown next to the SHA-1 fingerprint because that is what signing tools
/// print for APK signers nowadays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Compute the SHA256 digest of data.
    pub fn compute(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

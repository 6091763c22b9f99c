//! Hex-encoded signing certificates.
//!
//! The markup manifest stores each signer as the DER encoding of an X.509
//! certificate, hexified. Getting the certificate back is unhex, then un-DER;
//! the fingerprint is taken over the raw DER bytes.

use pkgdb_schema::SigningCertificate;

use crate::error::CertificateError;

/// Decode a hex string into a signing certificate.
///
/// Returns `Ok(None)` when there is no key material at all (empty string).
/// Hex digits are accepted in either case; the fingerprint only depends on
/// the decoded bytes.
///
/// # Errors
///
/// [`CertificateError::Hex`] for odd-length or non-hex input,
/// [`CertificateError::Der`] when the bytes are not exactly one X.509
/// certificate.
pub fn decode_certificate(hex_str: &str) -> Result<Option<SigningCertificate>, CertificateError> {
    if hex_str.is_empty() {
        return Ok(None);
    }
    let der = hex::decode(hex_str)?;
    if der.is_empty() {
        return Ok(None);
    }
    Ok(Some(SigningCertificate::from_der(der)?))
}

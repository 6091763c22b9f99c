//! Unsigned 32-bit literals as they appear in both manifests.

use std::num::ParseIntError;

/// Parse an unsigned 32-bit integer literal.
///
/// The radix follows the prefix: `0x` hex, `0o` octal, `0b` binary, a bare
/// leading `0` octal, anything else decimal.
///
/// # Errors
///
/// Returns a [`ParseIntError`] for empty digits, a sign, stray characters
/// or values that overflow `u32`.
///
/// # Example
///
/// ```
/// use pkgdb_core::number::parse_u32;
///
/// assert_eq!(parse_u32("10050").unwrap(), 10050);
/// assert_eq!(parse_u32("0x2742").unwrap(), 10050);
/// assert!(parse_u32("-1").is_err());
/// ```
pub fn parse_u32(s: &str) -> Result<u32, ParseIntError> {
    let (digits, radix) = split_radix(s);
    // `from_str_radix` takes a leading sign; the manifests never carry one.
    if digits.starts_with(['+', '-']) {
        return u32::from_str_radix("", radix);
    }
    u32::from_str_radix(digits, radix)
}

fn split_radix(s: &str) -> (&str, u32) {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (&s[2..], 16),
            b'o' | b'O' => return (&s[2..], 8),
            b'b' | b'B' => return (&s[2..], 2),
            _ => return (&s[1..], 8),
        }
    }
    (s, 10)
}
